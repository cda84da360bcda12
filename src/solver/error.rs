use thiserror::Error;

use super::SolverKind;

/// Failures at the solver boundary that leave no status to report
#[derive(Debug, Error)]
pub enum SolverError {
    #[error("Solver {solver} is not installed: `{binary}` was not found on PATH")]
    NotInstalled { solver: SolverKind, binary: String },

    #[error("Solver {solver} is not available in this build (enable the `{feature}` feature)")]
    NotCompiled { solver: SolverKind, feature: &'static str },

    #[error("Failed to start solver process: {0}")]
    ProcessStart(#[source] std::io::Error),

    #[error("Solver process failed with exit code {exit_code:?}: {message}")]
    ProcessFailed { exit_code: Option<i32>, message: String },

    #[error("Solver {solver} wrote no solution file")]
    MissingSolution { solver: SolverKind },

    #[error("Malformed solution output: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SolverResult<T> = Result<T, SolverError>;
