//! In-process backend: `good_lp` with the pure-Rust `microlp` solver

use std::time::Instant;

use good_lp::{variable, Expression, ProblemVariables, ResolutionError, Solution, SolverModel};
use tracing::debug;

use super::error::SolverResult;
use super::status::{SolutionStatus, SolveOutcome};
use super::Solver;
use crate::optimizer::model::{Direction, LinearExpr, LinearModel, Sense, VarKind};

#[derive(Debug, Clone, Copy, Default)]
pub struct MicrolpSolver;

impl MicrolpSolver {
    pub fn new() -> Self {
        Self
    }
}

fn to_expression(expr: &LinearExpr, vars: &[good_lp::Variable]) -> Expression {
    let mut out = Expression::from(expr.constant);
    for (var, coef) in &expr.terms {
        out += *coef * vars[var.index()];
    }
    out
}

impl Solver for MicrolpSolver {
    fn name(&self) -> String {
        "microlp".to_string()
    }

    fn solve(&self, model: &LinearModel) -> SolverResult<SolveOutcome> {
        let start = Instant::now();

        let mut problem = ProblemVariables::new();
        let vars: Vec<good_lp::Variable> = model
            .variables()
            .iter()
            .map(|v| match v.kind {
                VarKind::Binary => problem.add(variable().binary()),
                VarKind::Continuous => problem.add(variable().min(v.lower).max(v.upper)),
            })
            .collect();

        let objective = to_expression(model.objective(), &vars);
        let mut lp = match model.direction() {
            Direction::Minimize => problem.minimise(objective).using(good_lp::microlp),
            Direction::Maximize => problem.maximise(objective).using(good_lp::microlp),
        };

        for c in model.constraints() {
            let lhs = to_expression(&c.expr, &vars);
            let constraint = match c.sense {
                Sense::Le => lhs.leq(c.rhs),
                Sense::Ge => lhs.geq(c.rhs),
                Sense::Eq => lhs.eq(c.rhs),
            };
            lp.add_constraint(constraint);
        }

        debug!(
            variables = vars.len(),
            constraints = model.constraints().len(),
            "Solving with microlp"
        );

        let outcome = match lp.solve() {
            Ok(solution) => {
                let values: Vec<f64> = vars.iter().map(|v| solution.value(*v)).collect();
                let objective = model.objective_value(&values);
                SolveOutcome {
                    status: SolutionStatus::Optimal,
                    objective: Some(objective),
                    values,
                    log: format!("microlp: optimal, objective {objective}"),
                    elapsed: start.elapsed(),
                }
            }
            Err(ResolutionError::Infeasible) => SolveOutcome::without_solution(
                SolutionStatus::Infeasible,
                "microlp: infeasible",
                start.elapsed(),
            ),
            Err(ResolutionError::Unbounded) => SolveOutcome::without_solution(
                SolutionStatus::Unbounded,
                "microlp: unbounded",
                start.elapsed(),
            ),
            Err(other) => SolveOutcome::without_solution(
                SolutionStatus::Error,
                format!("microlp: {other}"),
                start.elapsed(),
            ),
        };
        Ok(outcome)
    }
}
