use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Terminal status reported by a solver backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolutionStatus {
    Optimal,
    Infeasible,
    Unbounded,
    /// Stopped on a time or iteration limit
    Timeout,
    Error,
    Unknown,
}

impl SolutionStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, SolutionStatus::Optimal)
    }
}

impl std::fmt::Display for SolutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolutionStatus::Optimal => write!(f, "optimal"),
            SolutionStatus::Infeasible => write!(f, "infeasible"),
            SolutionStatus::Unbounded => write!(f, "unbounded"),
            SolutionStatus::Timeout => write!(f, "timeout"),
            SolutionStatus::Error => write!(f, "error"),
            SolutionStatus::Unknown => write!(f, "unknown"),
        }
    }
}

/// What a backend hands back for one model
#[derive(Debug, Clone)]
pub struct SolveOutcome {
    pub status: SolutionStatus,
    /// Objective value including the model's constant term; `None` unless optimal
    pub objective: Option<f64>,
    /// One value per model variable, in declaration order
    pub values: Vec<f64>,
    /// Raw solver output kept for diagnostics
    pub log: String,
    pub elapsed: Duration,
}

impl SolveOutcome {
    /// An outcome without a usable solution
    pub fn without_solution(
        status: SolutionStatus,
        log: impl Into<String>,
        elapsed: Duration,
    ) -> Self {
        Self {
            status,
            objective: None,
            values: Vec::new(),
            log: log.into(),
            elapsed,
        }
    }

    pub fn is_optimal(&self) -> bool {
        self.status.is_success()
    }
}
