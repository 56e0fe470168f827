use super::error::WorkflowError;
use crate::core::autodiff::Tape;
use crate::core::potential::Potential;
use crate::core::vib::{EigenSettings, FreqsModes, hessian, vibrational_analysis};
use nalgebra::{DMatrix, Point3};
use tracing::{info, instrument};

#[derive(Debug, Clone, PartialEq)]
pub struct VibrationResult {
    pub hessian: DMatrix<f64>,
    pub freqs_modes: FreqsModes,
}

/// Harmonic normal modes of an isolated structure at `coordinates`.
#[instrument(skip_all, name = "vibrations_workflow", fields(atoms = coordinates.len()))]
pub fn run<P: Potential>(
    potential: &P,
    coordinates: &[Point3<f64>],
    masses: &[f64],
    settings: &EigenSettings,
) -> Result<VibrationResult, WorkflowError> {
    if coordinates.is_empty() {
        return Err(WorkflowError::EmptySystem);
    }

    let tape = Tape::new();
    let positions = tape.points(coordinates);
    let energy = potential.energy(&positions, None);
    info!(energy = energy.value(), "Computing analytical Hessian.");
    let hessian = hessian(&positions, Some(energy), None)?;

    let freqs_modes = vibrational_analysis(masses, &hessian, settings)?;
    info!(
        "Workflow complete. Found {} mode(s), {} imaginary.",
        freqs_modes.len(),
        freqs_modes.imaginary_modes().len()
    );
    Ok(VibrationResult {
        hessian,
        freqs_modes,
    })
}
