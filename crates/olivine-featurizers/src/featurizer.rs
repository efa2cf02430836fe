use anyhow::Result;
use olivine_core::Structure;

/// Contract every site-level feature generator exposes to downstream
/// featurization pipelines.
///
/// Implementations are pure: for a fixed configuration and fixed neighbor
/// geometry the output is deterministic, and independent `featurize` calls
/// share no state, so callers may fan sites out across workers freely.
pub trait SiteFeaturizer {
    /// Compute the feature vector of the site at `idx`.
    fn featurize(&self, structure: &Structure, idx: usize) -> Result<Vec<f64>>;

    /// Feature names, index-aligned with the output of [`Self::featurize`].
    ///
    /// A pure function of the configuration; does not require a prior
    /// `featurize` call.
    fn feature_labels(&self) -> Vec<String>;

    /// Bibliographic references for the feature definition.
    fn citations(&self) -> Vec<String>;

    fn implementors(&self) -> Vec<String>;
}

/// Featurize every site of a structure; rows are index-aligned with
/// [`Structure::sites`].
pub fn featurize_structure<F: SiteFeaturizer + ?Sized>(
    featurizer: &F,
    structure: &Structure,
) -> Result<Vec<Vec<f64>>> {
    (0..structure.num_sites())
        .map(|idx| featurizer.featurize(structure, idx))
        .collect()
}
