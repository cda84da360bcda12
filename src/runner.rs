//! One dispatch run end to end: synthesize inputs, build, solve with every
//! configured backend, export the best schedule.

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::config::Config;
use crate::error::DispatchError;
use crate::export::{export_csv, write_summary, RunSummary};
use crate::forecast::synthesize_inputs;
use crate::optimizer::{DispatchOutcome, MilpOptimizer};
use crate::solver::{create_solver, write_lp_file, Solver};

#[derive(Debug, Clone)]
pub struct RunReport {
    pub summary: RunSummary,
    pub best: DispatchOutcome,
}

pub fn run(cfg: &Config) -> Result<RunReport> {
    let settings = cfg.solver.settings();
    let solvers = cfg
        .solver
        .backends
        .iter()
        .map(|kind| create_solver(*kind, &settings))
        .collect::<Result<Vec<Box<dyn Solver>>, _>>()
        .map_err(DispatchError::from)?;
    run_with(cfg, &solvers)
}

/// Run with explicit solver instances instead of the configured backends
pub fn run_with(cfg: &Config, solvers: &[Box<dyn Solver>]) -> Result<RunReport> {
    cfg.validate().context("Invalid configuration")?;

    let inputs = synthesize_inputs(&cfg.synthesis, &cfg.horizon);
    let optimizer = MilpOptimizer::new(cfg.battery, cfg.horizon, cfg.dispatch);

    if let Some(path) = &cfg.output.lp_path {
        let built = optimizer.build(&inputs)?;
        write_lp_file(&built.model, path)
            .with_context(|| format!("Failed to write LP file {}", path.display()))?;
        info!(path = %path.display(), "Wrote LP model");
    }

    info!(
        n_steps = inputs.len(),
        solvers = solvers.len(),
        "Starting dispatch optimization"
    );
    let comparison = optimizer.compare(&inputs, solvers)?;

    for outcome in &comparison.outcomes {
        info!(
            solver = %outcome.solver,
            status = %outcome.status,
            objective = ?outcome.objective,
            solve_time_ms = outcome.elapsed.as_millis() as u64,
            "Solver result"
        );
    }

    let summary = RunSummary::new(inputs.len(), inputs.base_cost(), &comparison);
    if let Some(path) = &cfg.output.summary_path {
        write_summary(&summary, path)
            .with_context(|| format!("Failed to write summary {}", path.display()))?;
    }

    let Some(best) = comparison.into_best() else {
        warn!("No feasible solution found");
        return Err(DispatchError::NoFeasibleSolution.into());
    };

    if let Some(schedule) = &best.schedule {
        let path = &cfg.output.results_path;
        export_csv(schedule, path)
            .with_context(|| format!("Failed to export results to {}", path.display()))?;
        info!(path = %path.display(), rows = schedule.len(), "Exported schedule");
    }

    info!(
        solver = %best.solver,
        base_cost = best.base_cost,
        cost = ?best.objective,
        savings = ?best.savings(),
        "Dispatch optimization finished"
    );

    Ok(RunReport { summary, best })
}

#[cfg(all(test, feature = "optimization"))]
mod tests {
    use super::*;
    use crate::domain::Horizon;
    use crate::solver::{MicrolpSolver, MockSolver, SolutionStatus, SolveOutcome};
    use std::time::Duration;

    fn small_config(dir: &std::path::Path) -> Config {
        let mut cfg = Config::default();
        cfg.horizon = Horizon::new(60, 240, 60);
        cfg.synthesis.price_block_intervals = 2;
        cfg.dispatch.ramp_limit_kw = 0.8;
        cfg.output.results_path = dir.join("results.csv");
        cfg.output.summary_path = Some(dir.join("summary.json"));
        cfg.output.lp_path = Some(dir.join("model.lp"));
        cfg
    }

    #[test]
    fn test_run_writes_every_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = small_config(dir.path());
        let solvers: Vec<Box<dyn Solver>> = vec![Box::new(MicrolpSolver::new())];

        let report = run_with(&cfg, &solvers).unwrap();
        assert_eq!(report.best.solver, "microlp");
        assert_eq!(report.summary.best_solver.as_deref(), Some("microlp"));
        assert!(report.best.savings().unwrap() >= -1e-6);

        let csv = std::fs::read_to_string(&cfg.output.results_path).unwrap();
        assert_eq!(csv.lines().count(), 5);
        assert!(std::fs::read_to_string(dir.path().join("model.lp")).unwrap().contains("Binaries"));
        assert!(dir.path().join("summary.json").exists());
    }

    #[test]
    fn test_run_without_feasible_solution() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = small_config(dir.path());

        let mut solver = MockSolver::new();
        solver.expect_name().return_const("mock".to_string());
        solver.expect_solve().returning(|_| {
            Ok(SolveOutcome::without_solution(
                SolutionStatus::Infeasible,
                "",
                Duration::ZERO,
            ))
        });
        let solvers: Vec<Box<dyn Solver>> = vec![Box::new(solver)];

        let err = run_with(&cfg, &solvers).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DispatchError>(),
            Some(DispatchError::NoFeasibleSolution)
        ));
        assert!(!cfg.output.results_path.exists());
    }
}
