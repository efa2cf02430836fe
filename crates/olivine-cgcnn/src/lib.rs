//! olivine-cgcnn
//!
//! Training glue for a crystal-graph convolutional network (CGCNN) over
//! olivine structures:
//! - graph construction from neighbor lists, with Gaussian distance
//!   expansion of bond lengths and per-element embedding vectors,
//! - a gated graph-convolution model built on candle-nn,
//! - train/validate loops with target normalization and running meters.
//!
mod data;
mod model;
mod training;

pub use data::{
    collate, AtomInitializer, CrystalGraph, CrystalGraphDataset, DatasetConfig, GaussianDistance,
};
pub use model::{CrystalGraphConvNet, CrystalGraphConvNetConfig};
pub use training::{mae, train, validate, AverageMeter, Normalizer};
