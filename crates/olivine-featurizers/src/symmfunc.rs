//! Gaussian symmetry functions after Behler, as used in the fitting of
//! machine-learning interatomic potentials. The radial (G2) and angular (G4)
//! functions reduce a site's neighbor geometry to fixed-length descriptors,
//! smoothly truncated at a cutoff radius by a cosine window.
use crate::SiteFeaturizer;
use anyhow::Result;
use ndarray::Array1;
use olivine_core::Structure;
use std::f64::consts::PI;

fn fc(r: f64, cutoff: f64) -> f64 {
    if r > cutoff {
        0.0
    } else {
        0.5 * ((PI * r / cutoff).cos() + 1.0)
    }
}

/// Polynomial cutoff window applied elementwise to a distance array.
///
/// `0.5*(cos(pi*r/c)+1)` for `r <= c`, exactly `0` beyond, so contributions
/// vanish continuously at the cutoff boundary.
pub fn cosine_cutoff(rs: &Array1<f64>, cutoff: f64) -> Array1<f64> {
    rs.mapv(|r| fc(r, cutoff))
}

/// Radial symmetry function of the center atom for one eta parameter.
///
/// Sums `exp(-eta * r^2 / c^2) * fc(r)` over the neighbor distances; larger
/// eta sharpens the radial shell being probed.
pub fn g2(eta: f64, rs: &Array1<f64>, cutoff: f64) -> f64 {
    let ridge =
        rs.mapv(|r| (-eta * r.powi(2) / cutoff.powi(2)).exp()) * cosine_cutoff(rs, cutoff);
    ridge.sum()
}

/// Angular symmetry function of the center atom for all combinations of the
/// eta, zeta and gamma parameters.
///
/// `neigh_coords` are neighbor positions relative to the central atom,
/// index-aligned with `neigh_dist`. Each unordered neighbor pair (j, k)
/// contributes once; the `2^(1-zeta)` factor restores the conventional
/// ordered-pair normalization. The cosine term is used as computed, without
/// clamping to [-1, 1].
///
/// The output is flat, ordered eta-outermost, then zeta, then gamma. With
/// fewer than two neighbors every entry is zero.
pub fn g4(
    etas: &[f64],
    zetas: &[f64],
    gammas: &[f64],
    neigh_dist: &Array1<f64>,
    neigh_coords: &[[f64; 3]],
    cutoff: f64,
) -> Vec<f64> {
    let mut output = vec![0.0; etas.len() * zetas.len() * gammas.len()];

    for j in 0..neigh_coords.len() {
        let r_ij = neigh_dist[j];
        for k in (j + 1)..neigh_coords.len() {
            let r_ik = neigh_dist[k];
            let d_jk = [
                neigh_coords[k][0] - neigh_coords[j][0],
                neigh_coords[k][1] - neigh_coords[j][1],
                neigh_coords[k][2] - neigh_coords[j][2],
            ];
            let r_jk = (d_jk[0].powi(2) + d_jk[1].powi(2) + d_jk[2].powi(2)).sqrt();

            let cos_theta = (neigh_coords[j][0] * neigh_coords[k][0]
                + neigh_coords[j][1] * neigh_coords[k][1]
                + neigh_coords[j][2] * neigh_coords[k][2])
                / (r_ij * r_ik);

            let cutoff_fun = fc(r_ij, cutoff) * fc(r_ik, cutoff) * fc(r_jk, cutoff);

            let mut ind = 0;
            for &eta in etas {
                let eta_term = (-eta * (r_ij.powi(2) + r_ik.powi(2) + r_jk.powi(2))
                    / cutoff.powi(2))
                .exp()
                    * cutoff_fun;
                for &zeta in zetas {
                    for &gamma in gammas {
                        output[ind] += (1.0 + gamma * cos_theta).powf(zeta)
                            * eta_term
                            * 2f64.powf(1.0 - zeta);
                        ind += 1;
                    }
                }
            }
        }
    }
    output
}

/// Gaussian symmetry function features of a site, after Behler.
///
/// The feature vector is the radial block (one G2 value per `etas_g2` entry)
/// followed by the angular block (one G4 value per (eta, zeta, gamma)
/// combination), in the order reported by `feature_labels`.
#[derive(Debug, Clone)]
pub struct GaussianSymmFunc {
    etas_g2: Vec<f64>,
    etas_g4: Vec<f64>,
    zetas_g4: Vec<f64>,
    gammas_g4: Vec<f64>,
    cutoff: f64,
}

impl GaussianSymmFunc {
    pub fn new(
        etas_g2: Vec<f64>,
        etas_g4: Vec<f64>,
        zetas_g4: Vec<f64>,
        gammas_g4: Vec<f64>,
        cutoff: f64,
    ) -> Self {
        GaussianSymmFunc {
            etas_g2,
            etas_g4,
            zetas_g4,
            gammas_g4,
            cutoff,
        }
    }

    fn g4_len(&self) -> usize {
        self.etas_g4.len() * self.zetas_g4.len() * self.gammas_g4.len()
    }
}

impl Default for GaussianSymmFunc {
    fn default() -> Self {
        GaussianSymmFunc::new(
            vec![0.05, 4.0, 20.0, 80.0],
            vec![0.005],
            vec![1.0, 4.0],
            vec![1.0, -1.0],
            6.5,
        )
    }
}

impl SiteFeaturizer for GaussianSymmFunc {
    /// A site with no neighbors inside the cutoff yields an all-zero vector;
    /// that is valid output, not an error.
    fn featurize(&self, structure: &Structure, idx: usize) -> Result<Vec<f64>> {
        let center = structure.site(idx).coords;
        let neighbors = structure.get_neighbors(idx, self.cutoff);

        let neigh_coords: Vec<[f64; 3]> = neighbors
            .iter()
            .map(|n| {
                [
                    n.coords[0] - center[0],
                    n.coords[1] - center[1],
                    n.coords[2] - center[2],
                ]
            })
            .collect();
        let neigh_dists = Array1::from_iter(neighbors.iter().map(|n| n.distance));

        let mut features =
            Vec::with_capacity(self.etas_g2.len() + self.g4_len());
        for &eta in &self.etas_g2 {
            features.push(g2(eta, &neigh_dists, self.cutoff));
        }
        features.extend(g4(
            &self.etas_g4,
            &self.zetas_g4,
            &self.gammas_g4,
            &neigh_dists,
            &neigh_coords,
            self.cutoff,
        ));
        Ok(features)
    }

    fn feature_labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = self
            .etas_g2
            .iter()
            .map(|eta| format!("G2_{}", eta))
            .collect();
        for eta in &self.etas_g4 {
            for zeta in &self.zetas_g4 {
                for gamma in &self.gammas_g4 {
                    labels.push(format!("G4_{}_{}_{}", eta, zeta, gamma));
                }
            }
        }
        labels
    }

    fn citations(&self) -> Vec<String> {
        vec![
            "@Article{Behler2011, author = {J\u{f6}rg Behler}, \
             title = {Atom-centered symmetry functions for constructing \
             high-dimensional neural network potentials}, \
             journal = {The Journal of Chemical Physics}, year = {2011}, \
             volume = {134}, number = {7}, pages = {074106}, \
             doi = {10.1063/1.3553717}}"
                .to_string(),
            "@Article{Khorshidi2016, \
             author = {Alireza Khorshidi and Andrew A. Peterson}, \
             title = {Amp : A modular approach to machine learning in \
             atomistic simulations}, \
             journal = {Computer Physics Communications}, year = {2016}, \
             volume = {207}, pages = {310--324}, \
             doi = {10.1016/j.cpc.2016.05.010}}"
                .to_string(),
        ]
    }

    fn implementors(&self) -> Vec<String> {
        vec!["Qi Wang".to_string()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use olivine_core::{Element, Lattice};

    // Structures in a 100 A box so periodic images stay out of range.
    fn isolated_sites(frac_coords: Vec<[f64; 3]>) -> Structure {
        let fe = Element::new("Fe").unwrap();
        let species = vec![fe; frac_coords.len()];
        Structure::from_frac_coords(Lattice::cubic(100.0), species, frac_coords)
    }

    #[test]
    fn test_cutoff_boundary_is_zero() {
        let rs = Array1::from(vec![6.5, 7.0, 100.0]);
        let values = cosine_cutoff(&rs, 6.5);
        // cos(pi) + 1 = 0 exactly at the boundary, hard zero beyond it.
        assert_eq!(values[0], 0.0);
        assert_eq!(values[1], 0.0);
        assert_eq!(values[2], 0.0);
    }

    #[test]
    fn test_cutoff_interior() {
        let rs = Array1::from(vec![0.0, 3.25]);
        let values = cosine_cutoff(&rs, 6.5);
        assert!((values[0] - 1.0).abs() < 1e-12);
        assert!((values[1] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_g2_empty_neighbors() {
        let rs = Array1::<f64>::from(vec![]);
        for eta in [0.05, 4.0, 20.0, 80.0] {
            assert_eq!(g2(eta, &rs, 6.5), 0.0);
        }
    }

    #[test]
    fn test_g4_fewer_than_two_neighbors() {
        let etas = [0.005];
        let zetas = [1.0, 4.0];
        let gammas = [1.0, -1.0];
        let empty = g4(&etas, &zetas, &gammas, &Array1::<f64>::from(vec![]), &[], 6.5);
        assert_eq!(empty, vec![0.0; 4]);

        let single = g4(
            &etas,
            &zetas,
            &gammas,
            &Array1::from(vec![3.0]),
            &[[3.0, 0.0, 0.0]],
            6.5,
        );
        assert_eq!(single, vec![0.0; 4]);
    }

    #[test]
    fn test_single_neighbor_g2_hand_computed() {
        // One neighbor at 3.0 along +x, cutoff 6.5, eta 0.05:
        // G2 = exp(-0.05 * 9 / 6.5^2) * 0.5 * (cos(pi * 3 / 6.5) + 1)
        let structure = isolated_sites(vec![[0.0, 0.0, 0.0], [0.03, 0.0, 0.0]]);
        let gsf = GaussianSymmFunc::new(vec![0.05], vec![0.005], vec![1.0], vec![1.0], 6.5);
        let features = gsf.featurize(&structure, 0).unwrap();

        let expected = (-0.05 * 9.0 / 42.25f64).exp() * 0.5 * ((PI * 3.0 / 6.5).cos() + 1.0);
        assert!((features[0] - expected).abs() < 1e-12);
        assert!((features[0] - 0.5543327).abs() < 1e-6);
        // One neighbor: the whole angular block is zero.
        assert_eq!(features[1], 0.0);
    }

    #[test]
    fn test_orthogonal_pair_g4_closed_form() {
        // Neighbors at 2.0 along +x and 3.0 along +y: cos(theta) = 0, so the
        // (1 + gamma*cos)^zeta term is 1 and G4 reduces to
        // exp(-eta*(4+9+13)/c^2) * fc(2)*fc(3)*fc(sqrt(13)) * 2^(1-zeta).
        let structure =
            isolated_sites(vec![[0.0, 0.0, 0.0], [0.02, 0.0, 0.0], [0.0, 0.03, 0.0]]);
        let gsf = GaussianSymmFunc::new(
            vec![],
            vec![0.005],
            vec![1.0, 4.0],
            vec![1.0, -1.0],
            6.5,
        );
        let features = gsf.featurize(&structure, 0).unwrap();
        assert_eq!(features.len(), 4);

        let r_jk = 13f64.sqrt();
        let base = (-0.005 * (4.0 + 9.0 + 13.0) / 42.25f64).exp()
            * fc(2.0, 6.5)
            * fc(3.0, 6.5)
            * fc(r_jk, 6.5);
        // gamma has no effect at cos(theta) = 0.
        assert!((features[0] - base).abs() < 1e-12);
        assert!((features[1] - base).abs() < 1e-12);
        // zeta = 4 picks up 2^(1-4) = 1/8.
        assert!((features[2] - base / 8.0).abs() < 1e-12);
        assert!((features[3] - base / 8.0).abs() < 1e-12);
    }

    #[test]
    fn test_featurize_is_deterministic() {
        let structure = isolated_sites(vec![
            [0.0, 0.0, 0.0],
            [0.021, 0.007, 0.0],
            [0.0, 0.03, 0.011],
            [0.015, 0.0, 0.025],
        ]);
        let gsf = GaussianSymmFunc::default();
        let first = gsf.featurize(&structure, 0).unwrap();
        let second = gsf.featurize(&structure, 0).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_labels_align_with_output() {
        let structure = isolated_sites(vec![[0.0, 0.0, 0.0], [0.03, 0.0, 0.0]]);
        let gsf = GaussianSymmFunc::default();
        let features = gsf.featurize(&structure, 0).unwrap();
        let labels = gsf.feature_labels();
        assert_eq!(features.len(), labels.len());
        assert_eq!(
            labels,
            vec![
                "G2_0.05",
                "G2_4",
                "G2_20",
                "G2_80",
                "G4_0.005_1_1",
                "G4_0.005_1_-1",
                "G4_0.005_4_1",
                "G4_0.005_4_-1",
            ]
        );
    }

    #[test]
    fn test_zero_neighbors_is_valid_output() {
        let structure = isolated_sites(vec![[0.0, 0.0, 0.0]]);
        let gsf = GaussianSymmFunc::default();
        let features = gsf.featurize(&structure, 0).unwrap();
        assert_eq!(features, vec![0.0; 8]);
    }
}
