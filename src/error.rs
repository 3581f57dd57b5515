//! Error type shared by the calculation modules.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalibError {
    /// Input the calculation cannot be defined for (empty sample set, value
    /// out of range for the fixed-point routines, ...).
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, CalibError>;
