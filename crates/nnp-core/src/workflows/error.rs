use crate::core::pbc::PbcError;
use crate::core::vib::{HessianError, VibrationError};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CalculatorError {
    #[error("Periodic wrapping failed: {source}")]
    Pbc {
        #[from]
        source: PbcError,
    },

    #[error("Stress requires a cell with non-zero volume")]
    ZeroVolume,

    #[error("Frame contains no atoms")]
    EmptySystem,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum WorkflowError {
    #[error("Hessian evaluation failed: {source}")]
    Hessian {
        #[from]
        source: HessianError,
    },

    #[error("Vibrational analysis failed: {source}")]
    Vibration {
        #[from]
        source: VibrationError,
    },

    #[error("Structure contains no atoms")]
    EmptySystem,
}
