use anyhow::{anyhow, Context, Result};
use candle_core::{Device, Tensor};
use olivine_core::Structure;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;

/// Expands a distance tensor onto a grid of Gaussian filters.
#[derive(Debug, Clone)]
pub struct GaussianDistance {
    filter: Vec<f32>,
    var: f64,
}

impl GaussianDistance {
    /// Filters are centered on `dmin, dmin + step, ... <= dmax`; `var`
    /// defaults to `step`.
    pub fn new(dmin: f64, dmax: f64, step: f64, var: Option<f64>) -> Self {
        let mut filter = Vec::new();
        let mut x = dmin;
        while x <= dmax + 1e-8 {
            filter.push(x as f32);
            x += step;
        }
        GaussianDistance {
            filter,
            var: var.unwrap_or(step),
        }
    }

    pub fn num_features(&self) -> usize {
        self.filter.len()
    }

    /// `[n, m]` distances -> `[n, m, num_features]` expanded features.
    pub fn expand(&self, distances: &Tensor) -> Result<Tensor> {
        let device = distances.device();
        let filter = Tensor::from_vec(self.filter.clone(), (1, 1, self.filter.len()), device)?;
        let diff = distances.unsqueeze(2)?.broadcast_sub(&filter)?;
        let expanded = (diff.sqr()? / (self.var * self.var))?.neg()?.exp()?;
        Ok(expanded)
    }
}

/// Per-element embedding vectors keyed by atomic number, loaded from JSON.
#[derive(Debug, Clone)]
pub struct AtomInitializer {
    embeddings: HashMap<usize, Vec<f32>>,
    fea_len: usize,
}

impl AtomInitializer {
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: HashMap<String, Vec<f32>> =
            serde_json::from_str(json).context("failed to parse atom embedding JSON")?;
        let mut embeddings = HashMap::new();
        let mut fea_len = 0;
        for (key, value) in raw {
            let z: usize = key
                .parse()
                .with_context(|| format!("'{key}' is not an atomic number"))?;
            if fea_len == 0 {
                fea_len = value.len();
            } else if value.len() != fea_len {
                return Err(anyhow!(
                    "inconsistent embedding lengths: expected {fea_len}, got {} for element {z}",
                    value.len()
                ));
            }
            embeddings.insert(z, value);
        }
        Ok(AtomInitializer {
            embeddings,
            fea_len,
        })
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("failed to read {}", path.as_ref().display()))?;
        Self::from_json(&json)
    }

    pub fn fea_len(&self) -> usize {
        self.fea_len
    }

    pub fn get_atom_features(&self, atomic_number: usize) -> Result<&[f32]> {
        self.embeddings
            .get(&atomic_number)
            .map(|v| v.as_slice())
            .ok_or_else(|| anyhow!("no embedding for atomic number {atomic_number}"))
    }
}

/// One sample of the graph dataset.
#[derive(Debug, Clone)]
pub struct CrystalGraph {
    /// `[n_atoms, orig_fea_len]`
    pub atom_features: Tensor,
    /// `[n_atoms, max_num_nbr, n_filters]`
    pub neighbor_features: Tensor,
    /// `[n_atoms, max_num_nbr]`, u32
    pub neighbor_indices: Tensor,
    /// `[1]`
    pub target: Tensor,
}

#[derive(Debug, Clone)]
pub struct DatasetConfig {
    pub radius: f64,
    pub max_num_nbr: usize,
    pub dmin: f64,
    pub step: f64,
    pub random_seed: u64,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        DatasetConfig {
            radius: 8.0,
            max_num_nbr: 12,
            dmin: 0.0,
            step: 0.2,
            random_seed: 123,
        }
    }
}

/// Structures plus regression targets, served as crystal graphs.
///
/// Samples are shuffled once at construction with an explicitly seeded RNG,
/// and each constructed graph is memoized in a table keyed by sample index
/// that lives as long as the dataset.
pub struct CrystalGraphDataset {
    structures: Vec<Structure>,
    target_data: Vec<(usize, f64)>,
    initializer: AtomInitializer,
    gdf: GaussianDistance,
    config: DatasetConfig,
    cache: RefCell<HashMap<usize, CrystalGraph>>,
    device: Device,
}

impl CrystalGraphDataset {
    pub fn new(
        structures: Vec<Structure>,
        targets: Vec<f64>,
        initializer: AtomInitializer,
        config: DatasetConfig,
        device: Device,
    ) -> Self {
        let mut target_data: Vec<(usize, f64)> = targets.into_iter().enumerate().collect();
        let mut rng = StdRng::seed_from_u64(config.random_seed);
        target_data.shuffle(&mut rng);

        let gdf = GaussianDistance::new(config.dmin, config.radius, config.step, None);
        CrystalGraphDataset {
            structures,
            target_data,
            initializer,
            gdf,
            config,
            cache: RefCell::new(HashMap::new()),
            device,
        }
    }

    pub fn len(&self) -> usize {
        self.target_data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.target_data.is_empty()
    }

    /// Bond-feature length after Gaussian expansion.
    pub fn nbr_fea_len(&self) -> usize {
        self.gdf.num_features()
    }

    pub fn orig_atom_fea_len(&self) -> usize {
        self.initializer.fea_len()
    }

    /// The graph for sample `idx`, built on first access and memoized.
    pub fn get(&self, idx: usize) -> Result<CrystalGraph> {
        if let Some(graph) = self.cache.borrow().get(&idx) {
            return Ok(graph.clone());
        }
        let graph = self.build_graph(idx)?;
        self.cache.borrow_mut().insert(idx, graph.clone());
        Ok(graph)
    }

    fn build_graph(&self, idx: usize) -> Result<CrystalGraph> {
        let (strc_idx, target) = self.target_data[idx];
        let structure = &self.structures[strc_idx];
        let n = structure.num_sites();
        let max_num_nbr = self.config.max_num_nbr;

        let mut atom_fea = Vec::with_capacity(n * self.initializer.fea_len());
        for site in structure.sites() {
            let element = site
                .element()
                .ok_or_else(|| anyhow!("graph construction requires an ordered structure"))?;
            let z = element
                .atomic_number()
                .ok_or_else(|| anyhow!("unknown element '{element}'"))?;
            atom_fea.extend_from_slice(self.initializer.get_atom_features(z)?);
        }
        let atom_features =
            Tensor::from_vec(atom_fea, (n, self.initializer.fea_len()), &self.device)?;

        let mut all_nbrs = structure.get_all_neighbors(self.config.radius);
        for nbrs in &mut all_nbrs {
            nbrs.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        }

        let mut nbr_idx: Vec<u32> = Vec::with_capacity(n * max_num_nbr);
        let mut nbr_dist: Vec<f32> = Vec::with_capacity(n * max_num_nbr);
        for (site_idx, nbrs) in all_nbrs.iter().enumerate() {
            if nbrs.len() < max_num_nbr {
                eprintln!(
                    "site {site_idx} of structure {strc_idx} did not find enough neighbors \
                     to build the graph; consider increasing the radius"
                );
                for nbr in nbrs {
                    nbr_idx.push(nbr.index as u32);
                    nbr_dist.push(nbr.distance as f32);
                }
                for _ in nbrs.len()..max_num_nbr {
                    nbr_idx.push(0);
                    nbr_dist.push((self.config.radius + 1.0) as f32);
                }
            } else {
                for nbr in &nbrs[..max_num_nbr] {
                    nbr_idx.push(nbr.index as u32);
                    nbr_dist.push(nbr.distance as f32);
                }
            }
        }
        let neighbor_indices = Tensor::from_vec(nbr_idx, (n, max_num_nbr), &self.device)?;
        let distances = Tensor::from_vec(nbr_dist, (n, max_num_nbr), &self.device)?;
        let neighbor_features = self.gdf.expand(&distances)?;
        let target = Tensor::from_vec(vec![target as f32], (1,), &self.device)?;

        Ok(CrystalGraph {
            atom_features,
            neighbor_features,
            neighbor_indices,
            target,
        })
    }
}

/// Merge a batch of graphs into one atom list, offsetting neighbor indices.
///
/// Returns `(atom_features, neighbor_features, neighbor_indices,
/// crystal_atom_idx, targets)` where `crystal_atom_idx` maps each crystal to
/// its atom rows and `targets` is `[batch, 1]`.
pub fn collate(batch: &[CrystalGraph]) -> Result<(Tensor, Tensor, Tensor, Vec<Tensor>, Tensor)> {
    let mut atom_feas = Vec::with_capacity(batch.len());
    let mut nbr_feas = Vec::with_capacity(batch.len());
    let mut nbr_idxs = Vec::with_capacity(batch.len());
    let mut crystal_atom_idx = Vec::with_capacity(batch.len());
    let mut targets = Vec::with_capacity(batch.len());

    let mut base = 0usize;
    for graph in batch {
        let n = graph.atom_features.dim(0)?;
        let device = graph.atom_features.device();
        let offset = Tensor::new(base as u32, device)?;
        atom_feas.push(graph.atom_features.clone());
        nbr_feas.push(graph.neighbor_features.clone());
        nbr_idxs.push(graph.neighbor_indices.broadcast_add(&offset)?);
        crystal_atom_idx.push(Tensor::arange(base as u32, (base + n) as u32, device)?);
        targets.push(graph.target.clone());
        base += n;
    }

    let atom_features = Tensor::cat(&atom_feas, 0)?;
    let neighbor_features = Tensor::cat(&nbr_feas, 0)?;
    let neighbor_indices = Tensor::cat(&nbr_idxs, 0)?;
    let target = Tensor::cat(&targets, 0)?.unsqueeze(1)?;
    Ok((
        atom_features,
        neighbor_features,
        neighbor_indices,
        crystal_atom_idx,
        target,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use olivine_test_data::TestFile;

    fn nacl() -> Structure {
        let (path, _temp) = TestFile::structure_nacl().create_temp().unwrap();
        Structure::from_json_file(&path).unwrap()
    }

    fn initializer() -> AtomInitializer {
        let (path, _temp) = TestFile::atom_init().create_temp().unwrap();
        AtomInitializer::from_json_file(&path).unwrap()
    }

    #[test]
    fn test_gaussian_distance_grid() {
        let gdf = GaussianDistance::new(0.0, 8.0, 0.2, None);
        assert_eq!(gdf.num_features(), 41);
    }

    #[test]
    fn test_gaussian_distance_expand() {
        let gdf = GaussianDistance::new(0.0, 2.0, 1.0, None);
        assert_eq!(gdf.num_features(), 3);
        let distances = Tensor::from_vec(vec![1.0f32, 2.0], (1, 2), &Device::Cpu).unwrap();
        let expanded = gdf.expand(&distances).unwrap();
        assert_eq!(expanded.dims(), &[1, 2, 3]);
        // A distance sitting exactly on a filter center expands to 1 there.
        let row: Vec<f32> = expanded.flatten_all().unwrap().to_vec1().unwrap();
        assert!((row[1] - 1.0).abs() < 1e-6);
        assert!((row[5] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_atom_initializer() {
        let ari = initializer();
        assert_eq!(ari.fea_len(), 8);
        assert_eq!(ari.get_atom_features(11).unwrap().len(), 8);
        assert!(ari.get_atom_features(3).is_err());
    }

    #[test]
    fn test_atom_initializer_rejects_ragged_embeddings() {
        let json = r#"{"1": [1.0, 0.0], "2": [1.0]}"#;
        assert!(AtomInitializer::from_json(json).is_err());
    }

    #[test]
    fn test_dataset_shuffle_is_deterministic() {
        let structures = vec![nacl(); 5];
        let targets = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let a = CrystalGraphDataset::new(
            structures.clone(),
            targets.clone(),
            initializer(),
            DatasetConfig::default(),
            Device::Cpu,
        );
        let b = CrystalGraphDataset::new(
            structures,
            targets,
            initializer(),
            DatasetConfig::default(),
            Device::Cpu,
        );
        assert_eq!(a.target_data, b.target_data);
        assert_eq!(a.len(), 5);
    }

    #[test]
    fn test_graph_construction_and_memoization() {
        let dataset = CrystalGraphDataset::new(
            vec![nacl()],
            vec![5.0],
            initializer(),
            DatasetConfig::default(),
            Device::Cpu,
        );
        let graph = dataset.get(0).unwrap();
        assert_eq!(graph.atom_features.dims(), &[8, 8]);
        assert_eq!(graph.neighbor_indices.dims(), &[8, 12]);
        assert_eq!(
            graph.neighbor_features.dims(),
            &[8, 12, dataset.nbr_fea_len()]
        );

        let again = dataset.get(0).unwrap();
        assert_eq!(dataset.cache.borrow().len(), 1);
        let first: Vec<f32> = graph.atom_features.flatten_all().unwrap().to_vec1().unwrap();
        let second: Vec<f32> = again.atom_features.flatten_all().unwrap().to_vec1().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_collate_offsets_indices() {
        let dataset = CrystalGraphDataset::new(
            vec![nacl(), nacl()],
            vec![5.0, 6.0],
            initializer(),
            DatasetConfig::default(),
            Device::Cpu,
        );
        let batch = vec![dataset.get(0).unwrap(), dataset.get(1).unwrap()];
        let (atom_fea, nbr_fea, nbr_idx, crystal_atom_idx, target) = collate(&batch).unwrap();
        assert_eq!(atom_fea.dims(), &[16, 8]);
        assert_eq!(nbr_fea.dims()[0], 16);
        assert_eq!(nbr_idx.dims(), &[16, 12]);
        assert_eq!(target.dims(), &[2, 1]);
        assert_eq!(crystal_atom_idx.len(), 2);

        // Second crystal's neighbor indices point at its own atom rows.
        let second_rows: Vec<u32> = nbr_idx
            .narrow(0, 8, 8)
            .unwrap()
            .flatten_all()
            .unwrap()
            .to_vec1()
            .unwrap();
        assert!(second_rows.iter().all(|&i| (8..16).contains(&i)));
    }
}
