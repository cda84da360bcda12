//! MILP (Mixed-Integer Linear Programming) Optimizer
//!
//! Builds the battery dispatch model, hands it to one or more solver
//! backends and turns optimal solutions back into a [`DispatchSchedule`].
//!
//! The formulation considers:
//! - Energy prices and net load per control step
//! - Battery SoC bounds (min/max) and the SoC recurrence with efficiency losses
//! - Charge/discharge power limits and per-step ramp limits
//! - Mutually exclusive charge and discharge modes (binary per step)

use tracing::{info, warn};

use super::builder::{build_dispatch_model, DispatchModel};
use super::checks::check_schedule;
use super::constraints::DispatchConstraints;
use super::types::{DispatchOutcome, DispatchSchedule, DispatchStep, SolverComparison};
use crate::domain::{BatteryParams, DispatchInputs, Horizon};
use crate::error::DispatchResult;
use crate::solver::{SolutionStatus, Solver};

/// Tolerance for post-solve invariant checks
pub const DEFAULT_CHECK_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone)]
pub struct MilpOptimizer {
    battery: BatteryParams,
    horizon: Horizon,
    constraints: DispatchConstraints,
    tolerance: f64,
}

impl MilpOptimizer {
    pub fn new(
        battery: BatteryParams,
        horizon: Horizon,
        constraints: DispatchConstraints,
    ) -> Self {
        Self {
            battery,
            horizon,
            constraints,
            tolerance: DEFAULT_CHECK_TOLERANCE,
        }
    }

    pub fn build(&self, inputs: &DispatchInputs) -> DispatchResult<DispatchModel> {
        build_dispatch_model(inputs, &self.battery, &self.horizon, &self.constraints)
    }

    /// Build the model and solve it with `solver`
    pub fn optimize(
        &self,
        inputs: &DispatchInputs,
        solver: &dyn Solver,
    ) -> DispatchResult<DispatchOutcome> {
        let built = self.build(inputs)?;
        self.solve_built(&built, inputs, solver)
    }

    /// Solve the same model with every backend in `solvers`
    ///
    /// Non-optimal backends stay in the comparison with their status; solver
    /// errors (missing executable, crashed process) abort the comparison.
    pub fn compare(
        &self,
        inputs: &DispatchInputs,
        solvers: &[Box<dyn Solver>],
    ) -> DispatchResult<SolverComparison> {
        let built = self.build(inputs)?;
        let mut comparison = SolverComparison::default();
        for solver in solvers {
            comparison.outcomes.push(self.solve_built(&built, inputs, solver.as_ref())?);
        }

        match comparison.best() {
            Some(best) => info!(solver = %best.solver, objective = ?best.objective, "Best solver"),
            None => warn!("No solver found a feasible solution"),
        }
        Ok(comparison)
    }

    pub fn solve_built(
        &self,
        built: &DispatchModel,
        inputs: &DispatchInputs,
        solver: &dyn Solver,
    ) -> DispatchResult<DispatchOutcome> {
        let name = solver.name();
        let solved = solver.solve(&built.model)?;
        let base_cost = inputs.base_cost();

        info!(
            solver = %name,
            status = %solved.status,
            objective = ?solved.objective,
            elapsed_ms = solved.elapsed.as_millis() as u64,
            "Solve finished"
        );

        let expected = built.model.variables().len();
        if !solved.is_optimal() || solved.values.len() != expected {
            // An optimal status without a full solution vector is a backend fault
            let status = if solved.is_optimal() {
                warn!(
                    solver = %name,
                    expected,
                    actual = solved.values.len(),
                    "Solution vector does not match the model"
                );
                SolutionStatus::Error
            } else {
                warn!(solver = %name, status = %solved.status, "No feasible solution found");
                solved.status
            };
            return Ok(DispatchOutcome {
                solver: name,
                status,
                objective: None,
                base_cost,
                schedule: None,
                elapsed: solved.elapsed,
                log: solved.log,
            });
        }

        let schedule = extract_schedule(built, inputs, &solved.values);
        let violations = check_schedule(
            &schedule,
            &self.battery,
            &self.horizon,
            &self.constraints,
            self.tolerance,
        );
        if let Some(first) = violations.first() {
            warn!(
                solver = %name,
                count = violations.len(),
                first = ?first,
                "Schedule violates dispatch invariants"
            );
        }

        Ok(DispatchOutcome {
            solver: name,
            status: solved.status,
            objective: solved.objective,
            base_cost,
            schedule: Some(schedule),
            elapsed: solved.elapsed,
            log: solved.log,
        })
    }
}

/// Read the per-step schedule out of a solution vector
pub fn extract_schedule(
    built: &DispatchModel,
    inputs: &DispatchInputs,
    values: &[f64],
) -> DispatchSchedule {
    let vars = &built.vars;
    let steps = (0..built.n_steps())
        .map(|i| DispatchStep {
            step: i,
            user_load_kw: inputs.user_load[i],
            user_generation_kw: inputs.user_generation[i],
            net_load_kw: inputs.net_load(i),
            price: inputs.price[i],
            charge_kw: values[vars.charge[i].index()],
            discharge_kw: values[vars.discharge[i].index()],
            soc: values[vars.soc[i].index()],
        })
        .collect();
    DispatchSchedule { steps }
}
