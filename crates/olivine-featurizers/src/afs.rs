//! Angular Fourier Series site feature.
//!
//! The AFS combines a pairwise distance kernel evaluated on two neighbors
//! (sharing the central site) with the cosine of the angle between them. It
//! is a 2D feature grid, one entry per ordered pair of binning functions,
//! flattened row-major into the output vector.
use crate::grdf::{BinPreset, Gaussian, Histogram, RadialBin};
use crate::SiteFeaturizer;
use anyhow::{anyhow, bail, Result};
use itertools::Itertools;
use ndarray::Array1;
use olivine_core::Structure;

/// Angular Fourier Series generator over a list of binning functions.
///
/// Every ordered pair of distinct neighbors contributes to every ordered
/// pair of binning functions, so the cost per site is
/// O(neighbors^2 * bins^2): large cutoffs over dense neighbor shells degrade
/// quickly. That is documented behavior, not a bug.
pub struct AngularFourierSeries {
    bins: Vec<Box<dyn RadialBin>>,
    cutoff: f64,
}

impl std::fmt::Debug for AngularFourierSeries {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AngularFourierSeries")
            .field("bins", &self.bins.iter().map(|b| b.name()).collect::<Vec<_>>())
            .field("cutoff", &self.cutoff)
            .finish()
    }
}

impl AngularFourierSeries {
    pub fn new(bins: Vec<Box<dyn RadialBin>>, cutoff: f64) -> Self {
        AngularFourierSeries { bins, cutoff }
    }

    /// Build the bin list from a preset shape: kernels of the given `width`
    /// placed on an evenly spaced grid from 0 (inclusive) to `cutoff`
    /// (exclusive) with step `spacing`.
    ///
    /// Fails for unrecognized preset names; no featurizer is constructed.
    pub fn from_preset(preset: &str, width: f64, spacing: f64, cutoff: f64) -> Result<Self> {
        let preset: BinPreset = preset
            .parse()
            .map_err(|_| anyhow!("'{preset}' is not a valid preset condition"))?;

        let mut bins: Vec<Box<dyn RadialBin>> = Vec::new();
        let mut grid = 0.0;
        while grid < cutoff {
            match preset {
                BinPreset::Gaussian => bins.push(Box::new(Gaussian::new(width, grid))),
                BinPreset::Histogram => bins.push(Box::new(Histogram::new(grid, width))),
            }
            grid += spacing;
        }
        Ok(AngularFourierSeries { bins, cutoff })
    }

    pub fn num_bins(&self) -> usize {
        self.bins.len()
    }
}

impl SiteFeaturizer for AngularFourierSeries {
    /// Requires a fully ordered structure; fails before any numeric work
    /// otherwise. Fewer than two neighbors yields an all-zero vector.
    fn featurize(&self, structure: &Structure, idx: usize) -> Result<Vec<f64>> {
        if !structure.is_ordered() {
            bail!("disordered structures are not supported");
        }

        let center = structure.site(idx).coords;
        let neighbors = structure.get_neighbors(idx, self.cutoff);
        let neighbor_collection: Vec<([f64; 3], f64)> = neighbors
            .iter()
            .map(|n| {
                (
                    [
                        n.coords[0] - center[0],
                        n.coords[1] - center[1],
                        n.coords[2] - center[2],
                    ],
                    n.distance,
                )
            })
            .collect();

        // All ordered pairs of distinct neighbors. The bin-function pair
        // (g, g') below is ordered too, so permutation semantics are
        // required here, not combinations.
        let mut cos_angles = Vec::new();
        let mut dist1 = Vec::new();
        let mut dist2 = Vec::new();
        for pair in neighbor_collection.iter().permutations(2) {
            let (v1, d1) = pair[0];
            let (v2, d2) = pair[1];
            let cos_theta = (dot(v1, v2) / (norm(v1) * norm(v2))).clamp(-1.0, 1.0);
            cos_angles.push(cos_theta);
            dist1.push(*d1);
            dist2.push(*d2);
        }
        let cos_angles = Array1::from(cos_angles);
        let dist1 = Array1::from(dist1);
        let dist2 = Array1::from(dist2);

        let mut features = Vec::with_capacity(self.bins.len() * self.bins.len());
        for bin in &self.bins {
            for bin_prime in &self.bins {
                let weights = bin.evaluate(&dist1) * bin_prime.evaluate(&dist2) * &cos_angles;
                features.push(weights.sum());
            }
        }
        Ok(features)
    }

    fn feature_labels(&self) -> Vec<String> {
        self.bins
            .iter()
            .cartesian_product(self.bins.iter())
            .map(|(bin, bin_prime)| format!("AFS ({}, {})", bin.name(), bin_prime.name()))
            .collect()
    }

    fn citations(&self) -> Vec<String> {
        vec![
            "@article{PhysRevB.95.144110, title = {Representation of compounds \
             for machine-learning prediction of physical properties}, \
             author = {Seko, Atsuto and Hayashi, Hiroyuki and Nakayama, Keita \
             and Takahashi, Akira and Tanaka, Isao}, \
             journal = {Phys. Rev. B}, volume = {95}, issue = {14}, \
             pages = {144110}, year = {2017}, publisher = {American Physical \
             Society}, doi = {10.1103/PhysRevB.95.144110}}"
                .to_string(),
        ]
    }

    fn implementors(&self) -> Vec<String> {
        vec!["Maxwell Dylla".to_string(), "Logan Williams".to_string()]
    }
}

fn dot(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn norm(a: &[f64; 3]) -> f64 {
    dot(a, a).sqrt()
}
