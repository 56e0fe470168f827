use nalgebra::DMatrix;
use nnp::core::autodiff::{Scalar, Vec3};
use nnp::core::models::frame::{Frame, Lattice};
use nnp::core::potential::{HarmonicWell, LennardJones, Potential};
use nnp::core::vib::EigenSettings;

/// A system file after validation and merging with defaults and CLI overrides.
#[derive(Debug, Clone)]
pub struct SystemConfig {
    pub frame: Frame,
    pub masses: Option<Vec<f64>>,
    pub hessian: Option<DMatrix<f64>>,
    pub eigen: EigenSettings,
    pub potential: Option<ConfiguredPotential>,
}

/// The potentials a system file can select.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfiguredPotential {
    Harmonic(HarmonicWell),
    LennardJones(LennardJones),
}

impl Potential for ConfiguredPotential {
    fn energy<S: Scalar>(&self, coordinates: &[Vec3<S>], lattice: Option<&Lattice<S>>) -> S {
        match self {
            Self::Harmonic(well) => well.energy(coordinates, lattice),
            Self::LennardJones(lj) => lj.energy(coordinates, lattice),
        }
    }
}
