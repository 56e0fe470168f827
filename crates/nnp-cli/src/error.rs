use nnp::core::pbc::PbcError;
use nnp::core::vib::{ConfigError, VibrationError};
use nnp::workflows::error::WorkflowError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Pbc(#[from] PbcError),

    #[error(transparent)]
    Vibration(#[from] VibrationError),

    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    #[error("Invalid settings: {0}")]
    Settings(#[from] ConfigError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse file '{path}': {source}", path = path.display())]
    FileParsing {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid argument: {0}")]
    Argument(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
