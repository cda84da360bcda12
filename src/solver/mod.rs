//! Solver boundary
//!
//! Every backend takes a [`LinearModel`] and hands back a [`SolveOutcome`]:
//! a parsed [`SolutionStatus`], the objective, one value per variable and the
//! raw solver log. External solvers (CBC, GLPK, SCIP) are spawned as processes
//! on an LP file; `microlp` runs in-process through `good_lp`.

pub mod command;
pub mod error;
pub mod lp_format;
#[cfg(feature = "optimization")]
pub mod microlp;
pub mod parse;
pub mod status;

pub use command::CommandSolver;
pub use error::{SolverError, SolverResult};
pub use lp_format::{to_lp_string, write_lp, write_lp_file};
#[cfg(feature = "optimization")]
pub use microlp::MicrolpSolver;
pub use status::{SolutionStatus, SolveOutcome};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::optimizer::model::LinearModel;

/// Available solver backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SolverKind {
    /// Pure-Rust simplex and branch-and-bound, runs in-process
    Microlp,
    /// COIN-OR CBC (default)
    Cbc,
    /// GNU Linear Programming Kit (`glpsol`)
    Glpk,
    Scip,
}

impl SolverKind {
    /// Executable looked up on `PATH` for process backends
    pub fn binary_name(&self) -> Option<&'static str> {
        match self {
            SolverKind::Microlp => None,
            SolverKind::Cbc => Some("cbc"),
            SolverKind::Glpk => Some("glpsol"),
            SolverKind::Scip => Some("scip"),
        }
    }
}

/// One solver backend
#[cfg_attr(test, mockall::automock)]
pub trait Solver {
    fn name(&self) -> String;

    fn solve(&self, model: &LinearModel) -> SolverResult<SolveOutcome>;
}

/// Backend options shared by every solver
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SolverSettings {
    /// Forwarded to solvers with a native time limit
    pub time_limit_seconds: Option<u64>,
    /// Forward solver output at info level instead of debug
    pub echo_log: bool,
    /// Keep the LP and solution files after the solve
    pub keep_files: bool,
}

/// Instantiate the backend for `kind`
///
/// Process backends fail here with [`SolverError::NotInstalled`] when their
/// executable is not on `PATH`.
pub fn create_solver(kind: SolverKind, settings: &SolverSettings) -> SolverResult<Box<dyn Solver>> {
    match kind {
        #[cfg(feature = "optimization")]
        SolverKind::Microlp => Ok(Box::new(MicrolpSolver::new())),
        #[cfg(not(feature = "optimization"))]
        SolverKind::Microlp => Err(SolverError::NotCompiled {
            solver: kind,
            feature: "optimization",
        }),
        SolverKind::Cbc | SolverKind::Glpk | SolverKind::Scip => {
            Ok(Box::new(CommandSolver::locate(kind, settings.clone())?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::str::FromStr;

    #[rstest]
    #[case("cbc", SolverKind::Cbc)]
    #[case("GLPK", SolverKind::Glpk)]
    #[case("scip", SolverKind::Scip)]
    #[case("microlp", SolverKind::Microlp)]
    fn test_kind_from_str(#[case] raw: &str, #[case] expected: SolverKind) {
        assert_eq!(SolverKind::from_str(raw).unwrap(), expected);
    }

    #[test]
    fn test_kind_display_matches_serde() {
        assert_eq!(SolverKind::Glpk.to_string(), "glpk");
        assert_eq!(serde_json::to_string(&SolverKind::Glpk).unwrap(), "\"glpk\"");
        assert!(SolverKind::from_str("gurobi").is_err());
    }

    #[test]
    fn test_binary_names() {
        assert_eq!(SolverKind::Glpk.binary_name(), Some("glpsol"));
        assert_eq!(SolverKind::Microlp.binary_name(), None);
    }

    #[cfg(feature = "optimization")]
    #[test]
    fn test_microlp_needs_no_binary() {
        let solver = create_solver(SolverKind::Microlp, &SolverSettings::default()).unwrap();
        assert_eq!(solver.name(), "microlp");
    }
}
