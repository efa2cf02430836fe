//! olivine-core
//!
//! Crystal-structure data model for the olivine featurization crates:
//! - [`Lattice`], [`Site`] and [`Structure`] types with JSON (de)serialization.
//! - Periodic neighbor search within a cutoff radius, the geometry source
//!   consumed by the site featurizers.
//!
mod element;
mod lattice;
mod structure;

pub use element::{Element, ELEMENT_LIST};
pub use lattice::Lattice;
pub use structure::{Neighbor, Site, SpeciesOccupancy, Structure};
