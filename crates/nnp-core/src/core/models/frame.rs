use crate::core::autodiff::scalar::{Scalar, Vec3};
use nalgebra::{Matrix3, Point3};

/// A single structure: atomic positions plus the simulation cell they live in.
///
/// The rows of `cell` are the three lattice vectors. `pbc` flags, per lattice
/// direction, whether the structure is periodic along it.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub coordinates: Vec<Point3<f64>>,
    pub cell: Matrix3<f64>,
    pub pbc: [bool; 3],
}

impl Frame {
    pub fn new(coordinates: Vec<Point3<f64>>, cell: Matrix3<f64>, pbc: [bool; 3]) -> Self {
        Self {
            coordinates,
            cell,
            pbc,
        }
    }

    /// An isolated molecule: zero cell, no periodic direction.
    pub fn molecule(coordinates: Vec<Point3<f64>>) -> Self {
        Self::new(coordinates, Matrix3::zeros(), [false; 3])
    }

    pub fn len(&self) -> usize {
        self.coordinates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coordinates.is_empty()
    }

    pub fn pbc_enabled(&self) -> bool {
        self.pbc.iter().any(|&p| p)
    }

    pub fn volume(&self) -> f64 {
        self.cell.determinant().abs()
    }
}

/// Lattice vectors (as rows) in the scalar type a potential is evaluated with.
#[derive(Debug, Clone, Copy)]
pub struct Lattice<S> {
    pub vectors: [Vec3<S>; 3],
    pub pbc: [bool; 3],
}

impl<S: Scalar> Lattice<S> {
    /// Signed volume `a · (b × c)`.
    pub fn volume(&self) -> S {
        let [a, b, c] = &self.vectors;
        let cross = [
            b[1] * c[2] - b[2] * c[1],
            b[2] * c[0] - b[0] * c[2],
            b[0] * c[1] - b[1] * c[0],
        ];
        a[0] * cross[0] + a[1] * cross[1] + a[2] * cross[2]
    }
}

impl Lattice<f64> {
    pub fn from_cell(cell: &Matrix3<f64>, pbc: [bool; 3]) -> Self {
        Self {
            vectors: std::array::from_fn(|i| [cell[(i, 0)], cell[(i, 1)], cell[(i, 2)]]),
            pbc,
        }
    }
}
