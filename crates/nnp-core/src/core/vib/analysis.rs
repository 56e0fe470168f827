use super::config::EigenSettings;
use nalgebra::{DMatrix, DVector, SymmetricEigen, Vector3};
use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum VibrationError {
    #[error(
        "Hessian of shape {rows}x{cols} does not match {atoms} atoms (expected {expected}x{expected})"
    )]
    ShapeMismatch {
        atoms: usize,
        rows: usize,
        cols: usize,
        expected: usize,
    },

    #[error("Batch of {hessians} Hessians paired with {masses} mass vectors")]
    BatchMismatch { hessians: usize, masses: usize },

    #[error("Mass of atom {index} must be positive and finite, got {mass}")]
    InvalidMass { index: usize, mass: f64 },

    #[error("Eigensolver did not converge within {max_iterations} iterations")]
    EigenNotConverged { max_iterations: usize },
}

/// Masses for a batch of structures.
#[derive(Debug, Clone, Copy)]
pub enum Masses<'a> {
    /// One mass vector used for every structure of an isomeric batch.
    Shared(&'a [f64]),
    /// One mass vector per structure.
    PerMolecule(&'a [Vec<f64>]),
}

impl<'a> Masses<'a> {
    fn broadcast(self, batch: usize) -> Result<Vec<&'a [f64]>, VibrationError> {
        match self {
            Masses::Shared(masses) => Ok(vec![masses; batch]),
            Masses::PerMolecule(per_molecule) if per_molecule.len() == batch => {
                Ok(per_molecule.iter().map(Vec::as_slice).collect())
            }
            Masses::PerMolecule(per_molecule) => Err(VibrationError::BatchMismatch {
                hessians: batch,
                masses: per_molecule.len(),
            }),
        }
    }
}

/// Normal modes of one structure, ordered by ascending eigenvalue.
#[derive(Debug, Clone, PartialEq)]
pub struct FreqsModes {
    /// `sqrt(λ)` for each eigenvalue; NaN where `λ < 0`.
    pub angular_frequencies: Vec<f64>,
    /// One displacement per atom for each mode, normalized so that `Σ m |u|² = 1`.
    pub modes: Vec<Vec<Vector3<f64>>>,
    pub eigenvalues: Vec<f64>,
}

impl FreqsModes {
    pub fn len(&self) -> usize {
        self.angular_frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.angular_frequencies.is_empty()
    }

    /// Indices of modes whose eigenvalue is negative.
    pub fn imaginary_modes(&self) -> Vec<usize> {
        self.eigenvalues
            .iter()
            .enumerate()
            .filter(|(_, lambda)| **lambda < 0.0)
            .map(|(i, _)| i)
            .collect()
    }
}

/// Solves `H u = ω² M u` for one structure.
///
/// With `s = 1/sqrt(m)` repeated for the three components of every atom, the generalized
/// problem becomes the standard symmetric one `(S H S) v = λ v` with `u = S v`.
pub fn vibrational_analysis(
    masses: &[f64],
    hessian: &DMatrix<f64>,
    settings: &EigenSettings,
) -> Result<FreqsModes, VibrationError> {
    let n = 3 * masses.len();
    if hessian.nrows() != n || hessian.ncols() != n {
        return Err(VibrationError::ShapeMismatch {
            atoms: masses.len(),
            rows: hessian.nrows(),
            cols: hessian.ncols(),
            expected: n,
        });
    }
    if let Some((index, &mass)) = masses
        .iter()
        .enumerate()
        .find(|(_, m)| !(m.is_finite() && **m > 0.0))
    {
        return Err(VibrationError::InvalidMass { index, mass });
    }
    if n == 0 {
        return Ok(FreqsModes {
            angular_frequencies: Vec::new(),
            modes: Vec::new(),
            eigenvalues: Vec::new(),
        });
    }

    let inv_sqrt_mass = DVector::from_fn(n, |i, _| masses[i / 3].sqrt().recip());
    let scaled = DMatrix::from_fn(n, n, |i, j| {
        hessian[(i, j)] * inv_sqrt_mass[i] * inv_sqrt_mass[j]
    });

    let eigen = SymmetricEigen::try_new(scaled, settings.tolerance, settings.max_iterations)
        .ok_or(VibrationError::EigenNotConverged {
            max_iterations: settings.max_iterations,
        })?;

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| eigen.eigenvalues[a].total_cmp(&eigen.eigenvalues[b]));

    let eigenvalues: Vec<f64> = order.iter().map(|&k| eigen.eigenvalues[k]).collect();
    let angular_frequencies: Vec<f64> = eigenvalues.iter().map(|lambda| lambda.sqrt()).collect();
    let modes = order
        .iter()
        .map(|&k| {
            let column = eigen.eigenvectors.column(k);
            (0..masses.len())
                .map(|atom| {
                    Vector3::from_fn(|d, _| column[3 * atom + d] * inv_sqrt_mass[3 * atom + d])
                })
                .collect()
        })
        .collect();

    let imaginary = eigenvalues.iter().filter(|lambda| **lambda < 0.0).count();
    if imaginary > 0 {
        warn!(
            count = imaginary,
            "Hessian has negative eigenvalues; their angular frequencies are NaN."
        );
    }
    debug!(modes = n, "Vibrational analysis complete.");

    Ok(FreqsModes {
        angular_frequencies,
        modes,
        eigenvalues,
    })
}

/// [`vibrational_analysis`] for a batch of Hessians, evaluated in parallel.
pub fn vibrational_analysis_batch(
    masses: Masses<'_>,
    hessians: &[DMatrix<f64>],
    settings: &EigenSettings,
) -> Result<Vec<FreqsModes>, VibrationError> {
    let masses = masses.broadcast(hessians.len())?;
    hessians
        .par_iter()
        .zip(masses.par_iter())
        .map(|(hessian, masses)| vibrational_analysis(masses, hessian, settings))
        .collect()
}
