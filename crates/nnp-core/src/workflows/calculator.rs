use super::error::CalculatorError;
use crate::core::autodiff::{Scalar, Tape, Var, Vec3};
use crate::core::models::frame::{Frame, Lattice};
use crate::core::pbc::map_to_central;
use crate::core::potential::Potential;
use nalgebra::{Matrix3, Vector3};
use tracing::{debug, instrument};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    Energy,
    Forces,
    Stress,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CalculationResults {
    pub energy: f64,
    /// Identical to `energy`; the potential carries no electronic entropy term.
    pub free_energy: f64,
    pub forces: Option<Vec<Vector3<f64>>>,
    pub stress: Option<Matrix3<f64>>,
}

/// Evaluates a [`Potential`] on single frames.
#[derive(Debug, Clone)]
pub struct Calculator<P> {
    potential: P,
    overwrite: bool,
}

impl<P: Potential> Calculator<P> {
    pub fn new(potential: P) -> Self {
        Self {
            potential,
            overwrite: false,
        }
    }

    /// When enabled, coordinates wrapped into the central cell are written back to the frame.
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn potential(&self) -> &P {
        &self.potential
    }

    /// Computes the energy and any of forces and stress requested in `properties`.
    ///
    /// Frames with any periodic direction are wrapped into the central cell first. The
    /// potential always receives the cell and pbc flags, periodic or not. Stress is
    /// `∂E/∂ε / V`, where the strain `ε` scales coordinates and cell vectors alike and is
    /// differentiated at the identity.
    #[instrument(skip_all, name = "calculator", fields(atoms = frame.len()))]
    pub fn calculate(
        &self,
        frame: &mut Frame,
        properties: &[Property],
    ) -> Result<CalculationResults, CalculatorError> {
        if frame.is_empty() {
            return Err(CalculatorError::EmptySystem);
        }
        let want_forces = properties.contains(&Property::Forces);
        let want_stress = properties.contains(&Property::Stress);
        let volume = frame.volume();
        if want_stress && volume == 0.0 {
            return Err(CalculatorError::ZeroVolume);
        }

        let positions = if frame.pbc_enabled() {
            let wrapped = map_to_central(&frame.cell, &frame.coordinates, frame.pbc)?;
            if self.overwrite {
                debug!("Writing wrapped coordinates back to the frame.");
                frame.coordinates = wrapped.clone();
            }
            wrapped
        } else {
            frame.coordinates.clone()
        };

        let tape = Tape::new();
        let coordinates = tape.points(&positions);
        let cell_rows: [Vec3<Var>; 3] = std::array::from_fn(|i| {
            [
                tape.constant(frame.cell[(i, 0)]),
                tape.constant(frame.cell[(i, 1)]),
                tape.constant(frame.cell[(i, 2)]),
            ]
        });

        let strain: Option<[Vec3<Var>; 3]> = want_stress.then(|| {
            std::array::from_fn(|j| {
                std::array::from_fn(|k| tape.variable(if j == k { 1.0 } else { 0.0 }))
            })
        });

        let (strained_coordinates, lattice_vectors): (Vec<Vec3<Var>>, [Vec3<Var>; 3]) =
            match &strain {
                Some(strain) => (
                    coordinates.iter().map(|r| strained(r, strain)).collect(),
                    cell_rows.map(|row| strained(&row, strain)),
                ),
                None => (coordinates.clone(), cell_rows),
            };
        let lattice = Lattice {
            vectors: lattice_vectors,
            pbc: frame.pbc,
        };

        let energy = self
            .potential
            .energy(&strained_coordinates, Some(&lattice));

        let forces: Option<Vec<Vector3<f64>>> = want_forces.then(|| {
            let flat: Vec<Var> = coordinates.iter().flatten().copied().collect();
            tape.gradient_values(energy, &flat)
                .chunks(3)
                .map(|g| -Vector3::new(g[0], g[1], g[2]))
                .collect()
        });

        let stress = strain.map(|strain| {
            let flat: Vec<Var> = strain.iter().flatten().copied().collect();
            Matrix3::from_row_slice(&tape.gradient_values(energy, &flat)) / volume
        });

        debug!(energy = energy.value(), "Frame evaluated.");
        Ok(CalculationResults {
            energy: energy.value(),
            free_energy: energy.value(),
            forces,
            stress,
        })
    }
}

/// Row vector times strain, `r · ε`.
fn strained<S: Scalar>(r: &Vec3<S>, strain: &[Vec3<S>; 3]) -> Vec3<S> {
    std::array::from_fn(|k| r[0] * strain[0][k] + r[1] * strain[1][k] + r[2] * strain[2][k])
}
