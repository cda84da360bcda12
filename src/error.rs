use thiserror::Error;

use crate::solver::SolverError;

/// Errors raised while preparing, solving or exporting a dispatch run
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Invalid horizon: {0}")]
    InvalidHorizon(String),

    #[error("Invalid battery parameters: {0}")]
    InvalidBattery(String),

    #[error("Invalid dispatch constraints: {0}")]
    InvalidConstraints(String),

    #[error("Series `{name}` has {actual} values, expected {expected}")]
    SeriesLength {
        name: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Solver error: {0}")]
    Solver(#[from] SolverError),

    #[error("No feasible solution found")]
    NoFeasibleSolution,

    #[error("Export error: {0}")]
    Export(String),
}

impl From<csv::Error> for DispatchError {
    fn from(err: csv::Error) -> Self {
        DispatchError::Export(err.to_string())
    }
}

impl From<std::io::Error> for DispatchError {
    fn from(err: std::io::Error) -> Self {
        DispatchError::Export(err.to_string())
    }
}

impl From<serde_json::Error> for DispatchError {
    fn from(err: serde_json::Error) -> Self {
        DispatchError::Export(err.to_string())
    }
}

pub type DispatchResult<T> = Result<T, DispatchError>;
