//! olivine-featurizers
//!
//! Site-level feature generators for materials-informatics machine learning:
//! - Gaussian symmetry functions (radial G2 + angular G4) after Behler.
//! - Angular Fourier Series over pluggable distance-binning kernels.
//! - The [`SiteFeaturizer`] contract shared by both, plus a CLI to run them
//!   over structure files.
//!
mod afs;
mod featurizer;
mod grdf;
mod symmfunc;

pub use afs::AngularFourierSeries;
pub use featurizer::{featurize_structure, SiteFeaturizer};
pub use grdf::{BinPreset, Gaussian, Histogram, RadialBin};
pub use symmfunc::{cosine_cutoff, g2, g4, GaussianSymmFunc};
