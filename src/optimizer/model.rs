//! Solver-neutral linear model.
//!
//! The dispatch builder writes into a [`LinearModel`]; every solver backend
//! reads from it. Constraints are normalized to `sum(coef * var) <sense> rhs`
//! with all constants on the right-hand side.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VarId(usize);

impl VarId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VarKind {
    Continuous,
    Binary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    pub lower: f64,
    pub upper: f64,
    pub kind: VarKind,
}

/// `sum(coef * var) + constant`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinearExpr {
    pub terms: Vec<(VarId, f64)>,
    pub constant: f64,
}

impl LinearExpr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn constant(value: f64) -> Self {
        Self {
            terms: Vec::new(),
            constant: value,
        }
    }

    pub fn term(mut self, var: VarId, coef: f64) -> Self {
        self.add_term(var, coef);
        self
    }

    pub fn add_term(&mut self, var: VarId, coef: f64) {
        if coef != 0.0 {
            self.terms.push((var, coef));
        }
    }

    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.terms
            .iter()
            .map(|(var, coef)| coef * values.get(var.index()).copied().unwrap_or(0.0))
            .sum::<f64>()
            + self.constant
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sense {
    Le,
    Ge,
    Eq,
}

impl fmt::Display for Sense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sense::Le => write!(f, "<="),
            Sense::Ge => write!(f, ">="),
            Sense::Eq => write!(f, "="),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    pub name: String,
    pub expr: LinearExpr,
    pub sense: Sense,
    pub rhs: f64,
}

impl Constraint {
    /// How far `values` fall outside this constraint (0 when satisfied)
    pub fn violation(&self, values: &[f64]) -> f64 {
        let lhs = self.expr.evaluate(values);
        match self.sense {
            Sense::Le => (lhs - self.rhs).max(0.0),
            Sense::Ge => (self.rhs - lhs).max(0.0),
            Sense::Eq => (lhs - self.rhs).abs(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Minimize,
    Maximize,
}

/// A constraint or bound broken by a candidate solution
#[derive(Debug, Clone, PartialEq)]
pub struct ModelViolation {
    pub name: String,
    pub amount: f64,
}

#[derive(Debug, Clone)]
pub struct LinearModel {
    name: String,
    direction: Direction,
    variables: Vec<Variable>,
    constraints: Vec<Constraint>,
    objective: LinearExpr,
    by_name: HashMap<String, VarId>,
}

impl LinearModel {
    pub fn new(name: impl Into<String>, direction: Direction) -> Self {
        Self {
            name: name.into(),
            direction,
            variables: Vec::new(),
            constraints: Vec::new(),
            objective: LinearExpr::new(),
            by_name: HashMap::new(),
        }
    }

    pub fn add_variable(&mut self, name: impl Into<String>, lower: f64, upper: f64) -> VarId {
        self.push_variable(name.into(), lower, upper, VarKind::Continuous)
    }

    pub fn add_binary(&mut self, name: impl Into<String>) -> VarId {
        self.push_variable(name.into(), 0.0, 1.0, VarKind::Binary)
    }

    fn push_variable(&mut self, name: String, lower: f64, upper: f64, kind: VarKind) -> VarId {
        let id = VarId(self.variables.len());
        self.by_name.insert(name.clone(), id);
        self.variables.push(Variable {
            name,
            lower,
            upper,
            kind,
        });
        id
    }

    /// Add `expr <sense> rhs`, folding the constant of `expr` into `rhs`
    pub fn add_constraint(
        &mut self,
        name: impl Into<String>,
        mut expr: LinearExpr,
        sense: Sense,
        rhs: f64,
    ) {
        let rhs = rhs - expr.constant;
        expr.constant = 0.0;
        self.constraints.push(Constraint {
            name: name.into(),
            expr,
            sense,
            rhs,
        });
    }

    pub fn set_objective(&mut self, objective: LinearExpr) {
        self.objective = objective;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn variable(&self, id: VarId) -> &Variable {
        &self.variables[id.index()]
    }

    pub fn find_variable(&self, name: &str) -> Option<VarId> {
        self.by_name.get(name).copied()
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn objective(&self) -> &LinearExpr {
        &self.objective
    }

    pub fn n_binaries(&self) -> usize {
        self.variables.iter().filter(|v| v.kind == VarKind::Binary).count()
    }

    pub fn objective_value(&self, values: &[f64]) -> f64 {
        self.objective.evaluate(values)
    }

    /// Every bound, integrality requirement and constraint that `values`
    /// break by more than `tolerance`
    pub fn violations(&self, values: &[f64], tolerance: f64) -> Vec<ModelViolation> {
        let mut out = Vec::new();

        for (i, var) in self.variables.iter().enumerate() {
            let value = values.get(i).copied().unwrap_or(0.0);
            let outside = (var.lower - value).max(value - var.upper).max(0.0);
            if outside > tolerance {
                out.push(ModelViolation {
                    name: format!("bound:{}", var.name),
                    amount: outside,
                });
            }
            if var.kind == VarKind::Binary {
                let fractional = (value - value.round()).abs();
                if fractional > tolerance {
                    out.push(ModelViolation {
                        name: format!("integrality:{}", var.name),
                        amount: fractional,
                    });
                }
            }
        }

        for constraint in &self.constraints {
            let amount = constraint.violation(values);
            if amount > tolerance {
                out.push(ModelViolation {
                    name: constraint.name.clone(),
                    amount,
                });
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_var_model() -> (LinearModel, VarId, VarId) {
        let mut model = LinearModel::new("test", Direction::Minimize);
        let x = model.add_variable("x", 0.0, 2.0);
        let b = model.add_binary("b");
        (model, x, b)
    }

    #[test]
    fn test_constraint_constant_moves_to_rhs() {
        let (mut model, x, _) = two_var_model();
        model.add_constraint("c", LinearExpr::constant(1.5).term(x, 2.0), Sense::Le, 3.0);

        let c = &model.constraints()[0];
        assert_eq!(c.rhs, 1.5);
        assert_eq!(c.expr.constant, 0.0);
        assert_eq!(c.expr.terms, vec![(x, 2.0)]);
    }

    #[test]
    fn test_zero_coefficients_are_dropped() {
        let (_, x, b) = two_var_model();
        let expr = LinearExpr::new().term(x, 0.0).term(b, 1.0);
        assert_eq!(expr.terms.len(), 1);
    }

    #[test]
    fn test_violations_cover_bounds_integrality_and_rows() {
        let (mut model, x, b) = two_var_model();
        model.add_constraint("sum", LinearExpr::new().term(x, 1.0).term(b, 1.0), Sense::Eq, 1.0);

        assert!(model.violations(&[1.0, 0.0], 1e-9).is_empty());

        let names: Vec<String> = model
            .violations(&[3.0, 0.5], 1e-9)
            .into_iter()
            .map(|v| v.name)
            .collect();
        assert_eq!(names, vec!["bound:x", "integrality:b", "sum"]);
    }

    #[test]
    fn test_lookup_by_name() {
        let (model, x, b) = two_var_model();
        assert_eq!(model.find_variable("x"), Some(x));
        assert_eq!(model.find_variable("b"), Some(b));
        assert_eq!(model.find_variable("y"), None);
        assert_eq!(model.n_binaries(), 1);
    }
}
