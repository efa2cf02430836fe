use crate::{Element, Lattice};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One species occupying a site, with its fractional occupancy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesOccupancy {
    pub element: Element,
    pub occu: f64,
}

/// A position in the structure plus the species occupying it.
///
/// `coords` are cartesian. A site is *ordered* when it holds exactly one
/// species with full occupancy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    pub species: Vec<SpeciesOccupancy>,
    pub coords: [f64; 3],
}

impl Site {
    pub fn ordered(element: Element, coords: [f64; 3]) -> Self {
        Site {
            species: vec![SpeciesOccupancy { element, occu: 1.0 }],
            coords,
        }
    }
    pub fn is_ordered(&self) -> bool {
        self.species.len() == 1 && (self.species[0].occu - 1.0).abs() < 1e-8
    }
    /// The single element occupying an ordered site.
    pub fn element(&self) -> Option<&Element> {
        self.is_ordered().then(|| &self.species[0].element)
    }
}

/// A neighbor returned by [`Structure::get_neighbors`].
///
/// `coords` are the absolute cartesian coordinates of the neighbor, which may
/// be a periodic image of the site at `index`.
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbor {
    pub coords: [f64; 3],
    pub distance: f64,
    pub index: usize,
}

/// A periodic crystal structure: a lattice plus the sites in one unit cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Structure {
    lattice: Lattice,
    sites: Vec<Site>,
}

impl Structure {
    pub fn new(lattice: Lattice, sites: Vec<Site>) -> Self {
        Structure { lattice, sites }
    }

    /// Build a structure of fully ordered sites from fractional coordinates.
    pub fn from_frac_coords(
        lattice: Lattice,
        species: Vec<Element>,
        frac_coords: Vec<[f64; 3]>,
    ) -> Self {
        let sites = species
            .into_iter()
            .zip(frac_coords)
            .map(|(element, frac)| Site::ordered(element, lattice.cart_coords(frac)))
            .collect();
        Structure { lattice, sites }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("failed to parse structure JSON")
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("failed to read {}", path.as_ref().display()))?;
        Self::from_json(&json)
    }

    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }
    pub fn sites(&self) -> &[Site] {
        &self.sites
    }
    pub fn site(&self, idx: usize) -> &Site {
        &self.sites[idx]
    }
    pub fn num_sites(&self) -> usize {
        self.sites.len()
    }
    /// Whether every lattice site is occupied by exactly one defined species.
    pub fn is_ordered(&self) -> bool {
        self.sites.iter().all(|site| site.is_ordered())
    }

    /// All sites (including periodic images) within `cutoff` of site `idx`.
    ///
    /// The central site itself is excluded, but its own periodic images are
    /// legitimate neighbors. No ordering is guaranteed.
    pub fn get_neighbors(&self, idx: usize, cutoff: f64) -> Vec<Neighbor> {
        let center = self.sites[idx].coords;
        let m = self.lattice.matrix();
        let spacings = self.lattice.plane_spacings();
        let range: Vec<i64> = spacings
            .iter()
            .map(|d| (cutoff / d).ceil() as i64)
            .collect();

        let mut neighbors = Vec::new();
        for (j, site) in self.sites.iter().enumerate() {
            for ia in -range[0]..=range[0] {
                for ib in -range[1]..=range[1] {
                    for ic in -range[2]..=range[2] {
                        let fa = ia as f64;
                        let fb = ib as f64;
                        let fc = ic as f64;
                        let coords = [
                            site.coords[0] + fa * m[0][0] + fb * m[1][0] + fc * m[2][0],
                            site.coords[1] + fa * m[0][1] + fb * m[1][1] + fc * m[2][1],
                            site.coords[2] + fa * m[0][2] + fb * m[1][2] + fc * m[2][2],
                        ];
                        let distance = dist(coords, center);
                        if distance <= cutoff && distance > 1e-8 {
                            neighbors.push(Neighbor {
                                coords,
                                distance,
                                index: j,
                            });
                        }
                    }
                }
            }
        }
        neighbors
    }

    /// Neighbor lists for every site; index-aligned with [`Structure::sites`].
    pub fn get_all_neighbors(&self, cutoff: f64) -> Vec<Vec<Neighbor>> {
        (0..self.sites.len())
            .map(|idx| self.get_neighbors(idx, cutoff))
            .collect()
    }
}

fn dist(a: [f64; 3], b: [f64; 3]) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    let dz = a[2] - b[2];
    (dx * dx + dy * dy + dz * dz).sqrt()
}
