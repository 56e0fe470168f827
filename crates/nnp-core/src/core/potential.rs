use crate::core::autodiff::scalar::{self, Scalar, Vec3};
use crate::core::models::frame::Lattice;
use nalgebra::{Rotation3, Vector3};

/// An energy function of atomic positions.
///
/// Implementations are written once, generically over [`Scalar`], and can then be
/// evaluated with plain `f64` or on a differentiation tape. An empty structure has zero
/// energy.
pub trait Potential {
    fn energy<S: Scalar>(&self, coordinates: &[Vec3<S>], lattice: Option<&Lattice<S>>) -> S;
}

#[inline]
pub fn harmonic<S: Scalar>(displacement: S, force_constant: f64) -> S {
    displacement * displacement * (0.5 * force_constant)
}

/// 12-6 Lennard-Jones in its `r_min` form, taking the squared distance.
#[inline]
pub fn lennard_jones_12_6<S: Scalar>(dist_squared: S, r_min: f64, well_depth: f64) -> S {
    let rho2 = dist_squared.lift(r_min * r_min) / dist_squared;
    let rho6 = rho2.powi(3);
    (rho6 * rho6 - rho6 * 2.0) * well_depth
}

/// Every atom sits in its own anisotropic quadratic well centered at the origin.
///
/// The well's principal axes are the columns of `orientation`; along them the force
/// constants are `force_constants`. Atoms do not interact.
#[derive(Debug, Clone, PartialEq)]
pub struct HarmonicWell {
    pub force_constants: Vector3<f64>,
    pub orientation: Rotation3<f64>,
}

impl HarmonicWell {
    pub fn new(force_constants: Vector3<f64>) -> Self {
        Self {
            force_constants,
            orientation: Rotation3::identity(),
        }
    }

    pub fn with_orientation(mut self, orientation: Rotation3<f64>) -> Self {
        self.orientation = orientation;
        self
    }
}

impl Potential for HarmonicWell {
    fn energy<S: Scalar>(&self, coordinates: &[Vec3<S>], _lattice: Option<&Lattice<S>>) -> S {
        let to_local = self.orientation.inverse().into_inner();
        coordinates.iter().fold(S::constant(0.0), |energy, r| {
            let local = scalar::matrix_times_column(&to_local, r);
            (0..3).fold(energy, |e, d| e + harmonic(local[d], self.force_constants[d]))
        })
    }
}

/// Pairwise 12-6 Lennard-Jones cluster. The lattice is ignored (no periodic images).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LennardJones {
    pub r_min: f64,
    pub well_depth: f64,
}

impl Potential for LennardJones {
    fn energy<S: Scalar>(&self, coordinates: &[Vec3<S>], _lattice: Option<&Lattice<S>>) -> S {
        let mut energy = S::constant(0.0);
        for (i, ri) in coordinates.iter().enumerate() {
            for rj in &coordinates[i + 1..] {
                let d2 = scalar::norm_squared(&scalar::difference(ri, rj));
                energy = energy + lennard_jones_12_6(d2, self.r_min, self.well_depth);
            }
        }
        energy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::autodiff::Var;
    use nalgebra::Unit;
    use std::f64::consts::FRAC_PI_4;

    const TOLERANCE: f64 = 1e-12;

    fn approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < TOLERANCE
    }

    #[test]
    fn lennard_jones_at_minimum_distance_returns_negative_well_depth() {
        let energy = lennard_jones_12_6(4.0, 2.0, 10.0);
        assert!(approx_equal(energy, -10.0));
    }

    #[test]
    fn lennard_jones_is_repulsive_inside_zero_crossing() {
        let sigma = 2.0 / 2f64.powf(1.0 / 6.0);
        assert!(lennard_jones_12_6(0.8 * sigma * 0.8 * sigma, 2.0, 1.0) > 0.0);
        assert!(approx_equal(lennard_jones_12_6(sigma * sigma, 2.0, 1.0), 0.0));
    }

    #[test]
    fn harmonic_returns_half_k_x_squared() {
        assert!(approx_equal(harmonic(3.0, 2.0), 9.0));
    }

    #[test]
    fn harmonic_well_sums_independent_atoms() {
        let well = HarmonicWell::new(Vector3::new(0.5, 1.0, 2.0));
        let coords = [[1.0, 0.0, 0.0], [0.0, 1.0, 1.0]];
        assert!(approx_equal(well.energy(&coords, None), 0.25 + 0.5 + 1.0));
    }

    #[test]
    fn rotated_harmonic_well_follows_its_principal_axes() {
        let orientation = Rotation3::from_axis_angle(&Unit::new_normalize(Vector3::z()), FRAC_PI_4);
        let well = HarmonicWell::new(Vector3::new(0.5, 1.0, 2.0)).with_orientation(orientation);
        let s = FRAC_PI_4.cos();
        let along_first_axis = [[s, s, 0.0]];
        let along_second_axis = [[-s, s, 0.0]];
        assert!(approx_equal(well.energy(&along_first_axis, None), 0.25));
        assert!(approx_equal(well.energy(&along_second_axis, None), 0.5));
    }

    #[test]
    fn lennard_jones_cluster_of_one_atom_has_zero_energy() {
        let lj = LennardJones {
            r_min: 1.0,
            well_depth: 1.0,
        };
        assert_eq!(lj.energy(&[[0.0, 0.0, 0.0]], None), 0.0);
    }

    #[test]
    fn empty_structure_has_zero_energy() {
        let well = HarmonicWell::new(Vector3::repeat(1.0));
        let lj = LennardJones {
            r_min: 1.0,
            well_depth: 1.0,
        };
        let empty: [Vec3<f64>; 0] = [];
        assert_eq!(well.energy(&empty, None), 0.0);
        assert_eq!(lj.energy(&empty, None), 0.0);

        let none: Vec<Vec3<Var>> = Vec::new();
        assert!(!well.energy(&none, None).is_tracked());
        assert_eq!(lj.energy(&none, None).value(), 0.0);
    }

    #[test]
    fn lennard_jones_cluster_counts_each_pair_once() {
        let lj = LennardJones {
            r_min: 1.0,
            well_depth: 1.0,
        };
        let coords = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0]];
        let expected = -2.0 + lennard_jones_12_6(4.0, 1.0, 1.0);
        assert!(approx_equal(lj.energy(&coords, None), expected));
    }
}
