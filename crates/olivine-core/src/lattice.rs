use serde::{Deserialize, Serialize};

/// A 3D crystal lattice defined by three row vectors a, b, c.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lattice {
    matrix: [[f64; 3]; 3],
}

impl Lattice {
    pub fn new(matrix: [[f64; 3]; 3]) -> Self {
        Lattice { matrix }
    }
    pub fn cubic(a: f64) -> Self {
        Lattice::orthorhombic(a, a, a)
    }
    pub fn orthorhombic(a: f64, b: f64, c: f64) -> Self {
        Lattice {
            matrix: [[a, 0.0, 0.0], [0.0, b, 0.0], [0.0, 0.0, c]],
        }
    }
    pub fn matrix(&self) -> &[[f64; 3]; 3] {
        &self.matrix
    }
    /// Convert fractional coordinates to cartesian.
    pub fn cart_coords(&self, frac: [f64; 3]) -> [f64; 3] {
        let m = &self.matrix;
        [
            frac[0] * m[0][0] + frac[1] * m[1][0] + frac[2] * m[2][0],
            frac[0] * m[0][1] + frac[1] * m[1][1] + frac[2] * m[2][1],
            frac[0] * m[0][2] + frac[1] * m[1][2] + frac[2] * m[2][2],
        ]
    }
    pub fn lengths(&self) -> [f64; 3] {
        let m = &self.matrix;
        [norm(m[0]), norm(m[1]), norm(m[2])]
    }
    pub fn volume(&self) -> f64 {
        let m = &self.matrix;
        dot(m[0], cross(m[1], m[2])).abs()
    }
    /// Spacing between lattice planes perpendicular to each axis.
    ///
    /// Used to bound the periodic-image search: an image further than
    /// `ceil(cutoff / spacing)` cells away along an axis cannot fall within
    /// the cutoff sphere.
    pub(crate) fn plane_spacings(&self) -> [f64; 3] {
        let m = &self.matrix;
        let v = self.volume();
        [
            v / norm(cross(m[1], m[2])),
            v / norm(cross(m[2], m[0])),
            v / norm(cross(m[0], m[1])),
        ]
    }
}

fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn cross(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn norm(a: [f64; 3]) -> f64 {
    dot(a, a).sqrt()
}
