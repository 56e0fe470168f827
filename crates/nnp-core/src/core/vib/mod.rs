//! Harmonic vibrational analysis.
//!
//! [`hessian`] differentiates an energy (or force) graph twice to get the force-constant
//! matrix; [`analysis`] turns that matrix and the atomic masses into angular frequencies
//! and normal modes.

pub mod analysis;
pub mod config;
pub mod hessian;

pub use analysis::{
    FreqsModes, Masses, VibrationError, vibrational_analysis, vibrational_analysis_batch,
};
pub use config::{ConfigError, EigenSettings, EigenSettingsBuilder};
pub use hessian::{HessianError, hessian, hessian_batch};
