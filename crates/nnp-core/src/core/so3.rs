//! SO(3) rotations through the Lie-algebra exponential map.
//!
//! For an infinitesimal rotation about the unit axis `n`, `dr/dθ = n × r`, that is
//! `dr_i/dθ = ε_ijk n_j r_k`. Writing `W_ik = ε_ijk n_j` turns this into the linear equation
//! `dr/dθ = W r` whose solution is `r(θ) = exp(θW) r(0)`. `W` is skew-symmetric, so
//! `exp(θW)` is always a proper rotation.

use nalgebra::{Matrix3, Point3, Rotation3, Vector3};

/// The Levi-Civita symbol `ε_ijk` over indices `0..3`.
#[inline]
pub fn levi_civita(i: usize, j: usize, k: usize) -> f64 {
    match (i, j, k) {
        (0, 1, 2) | (1, 2, 0) | (2, 0, 1) => 1.0,
        (0, 2, 1) | (2, 1, 0) | (1, 0, 2) => -1.0,
        _ => 0.0,
    }
}

/// Skew-symmetric generator `W_ik = Σ_j ε_ijk v_j`, so that `W r = v × r`.
pub fn generator(axis: &Vector3<f64>) -> Matrix3<f64> {
    Matrix3::from_fn(|i, k| (0..3).map(|j| levi_civita(i, j, k) * axis[j]).sum())
}

/// Rotation about an axis through the origin.
///
/// The direction of `axis` is the rotation axis and its length is the angle in radians;
/// rotation is counter-clockwise when looking down the axis towards the origin. Returns
/// `exp(W)` with `W` the [`generator`] of `axis`.
pub fn rotate_along(axis: &Vector3<f64>) -> Rotation3<f64> {
    Rotation3::from_matrix_unchecked(generator(axis).exp())
}

pub fn rotate_points(rotation: &Rotation3<f64>, points: &[Point3<f64>]) -> Vec<Point3<f64>> {
    points.iter().map(|p| rotation * p).collect()
}
