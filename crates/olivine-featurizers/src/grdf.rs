//! Distance-binning kernels for grid-based radial features.
//!
//! A binning function maps an array of pair distances to an array of weights
//! and carries a stable name used for feature labeling. Two kernel shapes are
//! provided: Gaussians and rectangular histogram windows, each centered or
//! started on a configurable grid point.
use ndarray::Array1;
use strum::{Display, EnumString};

/// A parameterized scalar-to-scalar distance kernel.
pub trait RadialBin {
    /// Map an array of pair distances to an array of weights.
    fn evaluate(&self, distances: &Array1<f64>) -> Array1<f64>;

    /// Stable label used for feature naming.
    fn name(&self) -> String;
}

/// Gaussian kernel `exp(-(d - center)^2 / width^2)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Gaussian {
    width: f64,
    center: f64,
}

impl Gaussian {
    pub fn new(width: f64, center: f64) -> Self {
        Gaussian { width, center }
    }
}

impl RadialBin for Gaussian {
    fn evaluate(&self, distances: &Array1<f64>) -> Array1<f64> {
        distances.mapv(|d| (-(d - self.center).powi(2) / self.width.powi(2)).exp())
    }
    fn name(&self) -> String {
        format!("Gaussian center={} width={}", self.center, self.width)
    }
}

/// Rectangular window: 1 on `[start, start + width)`, 0 elsewhere.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    start: f64,
    width: f64,
}

impl Histogram {
    pub fn new(start: f64, width: f64) -> Self {
        Histogram { start, width }
    }
}

impl RadialBin for Histogram {
    fn evaluate(&self, distances: &Array1<f64>) -> Array1<f64> {
        distances.mapv(|d| {
            if d >= self.start && d < self.start + self.width {
                1.0
            } else {
                0.0
            }
        })
    }
    fn name(&self) -> String {
        format!("Histogram start={} width={}", self.start, self.width)
    }
}

/// Kernel shapes available through `AngularFourierSeries::from_preset`.
#[derive(Debug, Clone, Copy, PartialEq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum BinPreset {
    Gaussian,
    Histogram,
}
