use crate::core::autodiff::{Var, Vec3};
use nalgebra::DMatrix;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HessianError {
    #[error("Energy or forces must be specified")]
    MissingSource,

    #[error("Energy and forces cannot be specified at the same time")]
    ConflictingSources,

    #[error("Forces cover {forces} atoms but coordinates cover {coordinates}")]
    ShapeMismatch { coordinates: usize, forces: usize },

    #[error("Batch of {coordinates} structures paired with {sources} energy/force entries")]
    BatchMismatch { coordinates: usize, sources: usize },

    #[error("Coordinates and energy/forces were not recorded on the same tape")]
    TapeMismatch,
}

enum Source<E, F> {
    Energy(E),
    Forces(F),
}

fn exactly_one<E, F>(energy: Option<E>, forces: Option<F>) -> Result<Source<E, F>, HessianError> {
    match (energy, forces) {
        (Some(energy), None) => Ok(Source::Energy(energy)),
        (None, Some(forces)) => Ok(Source::Forces(forces)),
        (None, None) => Err(HessianError::MissingSource),
        (Some(_), Some(_)) => Err(HessianError::ConflictingSources),
    }
}

/// Analytical Hessian of one structure from its energy graph or force graph.
///
/// Exactly one of `energy` and `forces` must be given, and it must have been computed from
/// `coordinates` on the same tape. With an energy, forces are first obtained as `-∇E` with
/// the backward pass recorded so that they stay differentiable. Each force component is
/// then differentiated once more and stored as a column:
///
/// ```text
/// H[j, i] = -∂F_i/∂x_j
/// ```
///
/// The result is `(3 * atoms) x (3 * atoms)`.
pub fn hessian<'t>(
    coordinates: &[Vec3<Var<'t>>],
    energy: Option<Var<'t>>,
    forces: Option<&[Vec3<Var<'t>>]>,
) -> Result<DMatrix<f64>, HessianError> {
    let source = exactly_one(energy, forces)?;
    assemble(coordinates, source)
}

/// [`hessian`] for a batch of structures, one energy (or one force set) per structure.
pub fn hessian_batch<'t>(
    coordinates: &[Vec<Vec3<Var<'t>>>],
    energies: Option<&[Var<'t>]>,
    forces: Option<&[Vec<Vec3<Var<'t>>>]>,
) -> Result<Vec<DMatrix<f64>>, HessianError> {
    let check_batch = |sources: usize| {
        if sources == coordinates.len() {
            Ok(())
        } else {
            Err(HessianError::BatchMismatch {
                coordinates: coordinates.len(),
                sources,
            })
        }
    };

    match exactly_one(energies, forces)? {
        Source::Energy(energies) => {
            check_batch(energies.len())?;
            coordinates
                .iter()
                .zip(energies)
                .map(|(coords, energy)| assemble(coords, Source::Energy(*energy)))
                .collect()
        }
        Source::Forces(forces) => {
            check_batch(forces.len())?;
            coordinates
                .iter()
                .zip(forces)
                .map(|(coords, f)| assemble(coords, Source::Forces(f.as_slice())))
                .collect()
        }
    }
}

fn assemble<'t>(
    coordinates: &[Vec3<Var<'t>>],
    source: Source<Var<'t>, &[Vec3<Var<'t>>]>,
) -> Result<DMatrix<f64>, HessianError> {
    if let Source::Forces(forces) = &source {
        if forces.len() != coordinates.len() {
            return Err(HessianError::ShapeMismatch {
                coordinates: coordinates.len(),
                forces: forces.len(),
            });
        }
    }

    let flat_coordinates: Vec<Var<'t>> = coordinates.iter().flatten().copied().collect();
    let Some(first) = flat_coordinates.first() else {
        return Ok(DMatrix::zeros(0, 0));
    };
    let tape = first.tape().ok_or(HessianError::TapeMismatch)?;
    if !flat_coordinates.iter().all(|x| x.is_on(tape)) {
        return Err(HessianError::TapeMismatch);
    }
    // Untracked constants carry no dependence on any tape and differentiate to zero.
    let compatible = |v: &Var<'t>| !v.is_tracked() || v.is_on(tape);
    let sources_compatible = match &source {
        Source::Energy(energy) => compatible(energy),
        Source::Forces(forces) => forces.iter().flatten().all(compatible),
    };
    if !sources_compatible {
        return Err(HessianError::TapeMismatch);
    }

    let flat_forces: Vec<Var<'t>> = match source {
        Source::Energy(energy) => tape
            .gradient(energy, &flat_coordinates)
            .into_iter()
            .map(|g| -g)
            .collect(),
        Source::Forces(forces) => forces.iter().flatten().copied().collect(),
    };

    let n = flat_coordinates.len();
    debug!(components = n, "Assembling Hessian column by column.");

    let mut hessian = DMatrix::zeros(n, n);
    for (column, force) in flat_forces.iter().enumerate() {
        let derivatives = tape.gradient_values(*force, &flat_coordinates);
        for (row, derivative) in derivatives.into_iter().enumerate() {
            hessian[(row, column)] = -derivative;
        }
    }
    Ok(hessian)
}
