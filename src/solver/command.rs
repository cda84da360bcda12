//! External solver processes (CBC, GLPK, SCIP)
//!
//! Each solve writes the model to `model.lp` in a fresh temporary directory,
//! runs the solver executable to completion and reads its solution file back.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Instant;

use tracing::{debug, info, warn};

use super::error::{SolverError, SolverResult};
use super::lp_format::write_lp_file;
use super::parse::{parse_cbc, parse_glpk, parse_scip, ParsedSolution};
use super::status::SolveOutcome;
use super::{Solver, SolverKind, SolverSettings};
use crate::optimizer::model::LinearModel;

const MODEL_FILE: &str = "model.lp";
const SOLUTION_FILE: &str = "solution.txt";

pub struct CommandSolver {
    kind: SolverKind,
    binary: PathBuf,
    settings: SolverSettings,
}

impl CommandSolver {
    /// Find the executable for `kind` on `PATH`
    pub fn locate(kind: SolverKind, settings: SolverSettings) -> SolverResult<Self> {
        let binary_name = kind.binary_name().ok_or(SolverError::NotCompiled {
            solver: kind,
            feature: "optimization",
        })?;
        let binary = which::which(binary_name).map_err(|_| SolverError::NotInstalled {
            solver: kind,
            binary: binary_name.to_string(),
        })?;
        debug!(solver = %kind, binary = %binary.display(), "Located solver executable");
        Ok(Self::with_binary(kind, binary, settings))
    }

    /// Use an explicit executable path
    pub fn with_binary(
        kind: SolverKind,
        binary: impl Into<PathBuf>,
        settings: SolverSettings,
    ) -> Self {
        Self {
            kind,
            binary: binary.into(),
            settings,
        }
    }

    /// Command line for one solve
    pub fn arguments(&self, model_path: &Path, solution_path: &Path) -> Vec<String> {
        let model = model_path.display().to_string();
        let solution = solution_path.display().to_string();
        let limit = self.settings.time_limit_seconds;

        match self.kind {
            SolverKind::Cbc => {
                let mut args = vec![model];
                if let Some(seconds) = limit {
                    args.push("sec".to_string());
                    args.push(seconds.to_string());
                }
                args.extend(["solve".to_string(), "solu".to_string(), solution]);
                args
            }
            SolverKind::Glpk => {
                let mut args = vec!["--lp".to_string(), model, "-o".to_string(), solution];
                if let Some(seconds) = limit {
                    args.push("--tmlim".to_string());
                    args.push(seconds.to_string());
                }
                args
            }
            SolverKind::Scip => {
                let mut args = vec!["-c".to_string(), format!("read \"{model}\"")];
                if let Some(seconds) = limit {
                    args.push("-c".to_string());
                    args.push(format!("set limits time {seconds}"));
                }
                args.extend([
                    "-c".to_string(),
                    "optimize".to_string(),
                    "-c".to_string(),
                    format!("write solution \"{solution}\""),
                    "-c".to_string(),
                    "quit".to_string(),
                ]);
                args
            }
            SolverKind::Microlp => Vec::new(),
        }
    }

    fn parse(&self, text: &str, model: &LinearModel) -> SolverResult<ParsedSolution> {
        match self.kind {
            SolverKind::Cbc => parse_cbc(text, model),
            SolverKind::Glpk => parse_glpk(text, model),
            SolverKind::Scip => parse_scip(text, model),
            SolverKind::Microlp => {
                Err(SolverError::Parse("microlp has no solution file".to_string()))
            }
        }
    }

    fn forward_log(&self, log: &str) {
        for line in log.lines().filter(|l| !l.trim().is_empty()) {
            if self.settings.echo_log {
                info!(solver = %self.kind, "{}", line);
            } else {
                debug!(solver = %self.kind, "{}", line);
            }
        }
    }
}

impl Solver for CommandSolver {
    fn name(&self) -> String {
        self.kind.to_string()
    }

    fn solve(&self, model: &LinearModel) -> SolverResult<SolveOutcome> {
        let start = Instant::now();
        let workdir = tempfile::Builder::new().prefix("bess-dispatch-").tempdir()?;
        let model_path = workdir.path().join(MODEL_FILE);
        let solution_path = workdir.path().join(SOLUTION_FILE);

        write_lp_file(model, &model_path)?;

        let args = self.arguments(&model_path, &solution_path);
        debug!(solver = %self.kind, ?args, "Starting solver process");

        let output = Command::new(&self.binary)
            .args(&args)
            .current_dir(workdir.path())
            .output()
            .map_err(SolverError::ProcessStart)?;

        let mut log = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            log.push_str(&stderr);
        }
        self.forward_log(&log);

        if self.settings.keep_files {
            let kept = workdir.keep();
            info!(solver = %self.kind, dir = %kept.display(), "Keeping solver files");
            let solution_path = kept.join(SOLUTION_FILE);
            return self.finish(model, &solution_path, output.status.code(), log, start);
        }
        self.finish(model, &solution_path, output.status.code(), log, start)
    }
}

impl CommandSolver {
    fn finish(
        &self,
        model: &LinearModel,
        solution_path: &Path,
        exit_code: Option<i32>,
        log: String,
        start: Instant,
    ) -> SolverResult<SolveOutcome> {
        if exit_code != Some(0) {
            let message = log
                .lines()
                .rev()
                .find(|l| !l.trim().is_empty())
                .unwrap_or("")
                .to_string();
            return Err(SolverError::ProcessFailed { exit_code, message });
        }

        if !solution_path.exists() {
            return Err(SolverError::MissingSolution { solver: self.kind });
        }
        let text = std::fs::read_to_string(solution_path)?;
        let parsed = self.parse(&text, model)?;
        let elapsed = start.elapsed();

        if !parsed.status.is_success() {
            warn!(
                solver = %self.kind,
                status = %parsed.status,
                "Solver finished without an optimal solution"
            );
            return Ok(SolveOutcome::without_solution(parsed.status, log, elapsed));
        }

        let objective = model.objective_value(&parsed.values);
        debug!(
            solver = %self.kind,
            objective,
            elapsed_ms = elapsed.as_millis() as u64,
            "Solver finished"
        );
        Ok(SolveOutcome {
            status: parsed.status,
            objective: Some(objective),
            values: parsed.values,
            log,
            elapsed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimizer::model::{Direction, LinearExpr, Sense};

    fn settings(limit: Option<u64>) -> SolverSettings {
        SolverSettings {
            time_limit_seconds: limit,
            ..Default::default()
        }
    }

    fn paths() -> (PathBuf, PathBuf) {
        (PathBuf::from("/tmp/m.lp"), PathBuf::from("/tmp/s.txt"))
    }

    #[test]
    fn test_cbc_arguments() {
        let (m, s) = paths();
        let solver = CommandSolver::with_binary(SolverKind::Cbc, "cbc", settings(Some(30)));
        assert_eq!(
            solver.arguments(&m, &s),
            vec!["/tmp/m.lp", "sec", "30", "solve", "solu", "/tmp/s.txt"]
        );
    }

    #[test]
    fn test_glpk_arguments() {
        let (m, s) = paths();
        let solver = CommandSolver::with_binary(SolverKind::Glpk, "glpsol", settings(None));
        assert_eq!(solver.arguments(&m, &s), vec!["--lp", "/tmp/m.lp", "-o", "/tmp/s.txt"]);
    }

    #[test]
    fn test_scip_arguments() {
        let (m, s) = paths();
        let solver = CommandSolver::with_binary(SolverKind::Scip, "scip", settings(Some(5)));
        assert_eq!(
            solver.arguments(&m, &s),
            vec![
                "-c",
                "read \"/tmp/m.lp\"",
                "-c",
                "set limits time 5",
                "-c",
                "optimize",
                "-c",
                "write solution \"/tmp/s.txt\"",
                "-c",
                "quit"
            ]
        );
    }

    #[test]
    fn test_missing_executable_fails_to_start() {
        let mut model = LinearModel::new("m", Direction::Minimize);
        let x = model.add_variable("x", 0.0, 1.0);
        model.add_constraint("c", LinearExpr::new().term(x, 1.0), Sense::Le, 1.0);

        let solver = CommandSolver::with_binary(
            SolverKind::Cbc,
            "/nonexistent/bess-dispatch/cbc",
            SolverSettings::default(),
        );
        let err = solver.solve(&model).unwrap_err();
        assert!(matches!(err, SolverError::ProcessStart(_)));
    }

    #[test]
    fn test_finish_rejects_nonzero_exit() {
        let model = LinearModel::new("m", Direction::Minimize);
        let solver =
            CommandSolver::with_binary(SolverKind::Glpk, "glpsol", SolverSettings::default());
        let log = "bad input\n".to_string();
        let err = solver
            .finish(&model, Path::new("/nonexistent"), Some(1), log, Instant::now())
            .unwrap_err();
        match err {
            SolverError::ProcessFailed { exit_code, message } => {
                assert_eq!(exit_code, Some(1));
                assert_eq!(message, "bad input");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_finish_reads_solution_file() {
        let mut model = LinearModel::new("m", Direction::Minimize);
        let x = model.add_variable("x", 0.0, 1.0);
        model.set_objective(LinearExpr::constant(2.0).term(x, 3.0));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("solution.txt");
        std::fs::write(&path, "Optimal - objective value 1.5\n      0 x  0.5  0\n").unwrap();

        let solver = CommandSolver::with_binary(SolverKind::Cbc, "cbc", SolverSettings::default());
        let outcome = solver
            .finish(&model, &path, Some(0), String::new(), Instant::now())
            .unwrap();
        assert!(outcome.is_optimal());
        assert_eq!(outcome.values, vec![0.5]);
        // The constant is added back on top of the solver's objective
        assert_eq!(outcome.objective, Some(3.5));
    }

    #[test]
    fn test_finish_without_solution_file() {
        let model = LinearModel::new("m", Direction::Minimize);
        let solver =
            CommandSolver::with_binary(SolverKind::Scip, "scip", SolverSettings::default());
        let missing = Path::new("/nonexistent/solution.txt");
        let err = solver
            .finish(&model, missing, Some(0), String::new(), Instant::now())
            .unwrap_err();
        assert!(matches!(err, SolverError::MissingSolution { solver: SolverKind::Scip }));
    }

    /// Executable shell script standing in for a solver binary
    #[cfg(unix)]
    fn stub_solver(dir: &Path, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("fake-cbc");
        std::fs::write(&path, format!("#!/bin/sh\n{body}")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    #[test]
    fn test_solve_runs_executable_and_reads_solution() {
        let mut model = LinearModel::new("m", Direction::Minimize);
        let x = model.add_variable("x", 0.0, 1.0);
        model.set_objective(LinearExpr::constant(1.0).term(x, 2.0));

        // Fails unless the model file exists, then writes a CBC solution to
        // the last argument
        let dir = tempfile::tempdir().unwrap();
        let binary = stub_solver(
            dir.path(),
            concat!(
                "[ -f \"$1\" ] || exit 3\n",
                "for last; do :; done\n",
                "printf 'Optimal - objective value 0.5\\n      0 x  0.25  0\\n' > \"$last\"\n",
                "echo done\n",
            ),
        );

        let solver = CommandSolver::with_binary(SolverKind::Cbc, binary, SolverSettings::default());
        let outcome = solver.solve(&model).unwrap();
        assert!(outcome.is_optimal());
        assert_eq!(outcome.values, vec![0.25]);
        assert_eq!(outcome.objective, Some(1.5));
        assert!(outcome.log.contains("done"));
    }

    #[cfg(unix)]
    #[test]
    fn test_solve_reports_failed_process() {
        let mut model = LinearModel::new("m", Direction::Minimize);
        model.add_variable("x", 0.0, 1.0);

        let dir = tempfile::tempdir().unwrap();
        let binary = stub_solver(dir.path(), "echo 'license expired' >&2\nexit 2\n");

        let solver = CommandSolver::with_binary(SolverKind::Cbc, binary, SolverSettings::default());
        match solver.solve(&model).unwrap_err() {
            SolverError::ProcessFailed { exit_code, message } => {
                assert_eq!(exit_code, Some(2));
                assert_eq!(message, "license expired");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}
