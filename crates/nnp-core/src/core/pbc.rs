//! Periodic boundary conditions.
//!
//! All functions take the cell as a matrix whose rows are the three lattice vectors
//!
//! ```text
//! [[x1, y1, z1],
//!  [x2, y2, z2],
//!  [x3, y3, z3]]
//! ```
//!
//! and a periodicity flag for each of those lattice directions.

use nalgebra::{Matrix3, Point3, Vector3};
use rayon::prelude::*;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PbcError {
    #[error("Cell matrix is singular and cannot be inverted")]
    SingularCell,

    #[error("Cutoff must be finite and non-negative, got {0}")]
    InvalidCutoff(f64),
}

fn invert(cell: &Matrix3<f64>) -> Result<Matrix3<f64>, PbcError> {
    cell.try_inverse().ok_or(PbcError::SingularCell)
}

/// Number of cell repeats needed along each lattice vector so that the central cell and
/// its repeats contain every neighbor within `cutoff` of every atom in the central cell.
///
/// Per direction this is `ceil(cutoff * |b_i|)` where `b_i` are the rows of the transposed
/// inverse cell (reciprocal vectors without the 2π). Non-periodic directions get zero.
pub fn num_repeats(
    cell: &Matrix3<f64>,
    pbc: [bool; 3],
    cutoff: f64,
) -> Result<[usize; 3], PbcError> {
    if !cutoff.is_finite() || cutoff < 0.0 {
        return Err(PbcError::InvalidCutoff(cutoff));
    }
    let reciprocal = invert(cell)?.transpose();
    Ok(std::array::from_fn(|i| {
        if pbc[i] {
            (cutoff * reciprocal.row(i).norm()).ceil() as usize
        } else {
            0
        }
    }))
}

/// Maps atoms outside the unit cell back into it.
///
/// Along periodic directions the fractional coordinates of the result lie in `[0, 1)`;
/// along non-periodic directions the fractional coordinates are untouched.
pub fn map_to_central(
    cell: &Matrix3<f64>,
    coordinates: &[Point3<f64>],
    pbc: [bool; 3],
) -> Result<Vec<Point3<f64>>, PbcError> {
    let inv_cell = invert(cell)?;
    Ok(coordinates
        .iter()
        .map(|r| wrap(cell, &inv_cell, r, pbc))
        .collect())
}

/// [`map_to_central`] for a batch of structures sharing one cell.
pub fn map_to_central_batch(
    cell: &Matrix3<f64>,
    batch: &[Vec<Point3<f64>>],
    pbc: [bool; 3],
) -> Result<Vec<Vec<Point3<f64>>>, PbcError> {
    let inv_cell = invert(cell)?;
    Ok(batch
        .par_iter()
        .map(|coordinates| {
            coordinates
                .iter()
                .map(|r| wrap(cell, &inv_cell, r, pbc))
                .collect::<Vec<_>>()
        })
        .collect())
}

#[inline]
fn wrap(
    cell: &Matrix3<f64>,
    inv_cell: &Matrix3<f64>,
    r: &Point3<f64>,
    pbc: [bool; 3],
) -> Point3<f64> {
    // Row-vector convention: f = r · C⁻¹, so as a column f = C⁻ᵀ r.
    let fractional = inv_cell.transpose() * r.coords;
    let shift = Vector3::from_fn(|i, _| if pbc[i] { fractional[i].floor() } else { 0.0 });
    r - cell.transpose() * shift
}
