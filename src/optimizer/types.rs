use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::solver::SolutionStatus;

/// One control step of an optimized schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchStep {
    pub step: usize,
    pub user_load_kw: f64,
    pub user_generation_kw: f64,
    pub net_load_kw: f64,
    pub price: f64,
    pub charge_kw: f64,
    pub discharge_kw: f64,
    pub soc: f64,
}

impl DispatchStep {
    /// Power drawn from the grid at this step
    pub fn grid_kw(&self) -> f64 {
        self.net_load_kw + self.charge_kw + self.discharge_kw
    }

    pub fn cost(&self) -> f64 {
        self.grid_kw() * self.price
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DispatchSchedule {
    pub steps: Vec<DispatchStep>,
}

impl DispatchSchedule {
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn total_cost(&self) -> f64 {
        self.steps.iter().map(DispatchStep::cost).sum()
    }

    pub fn charge(&self) -> Vec<f64> {
        self.steps.iter().map(|s| s.charge_kw).collect()
    }

    pub fn discharge(&self) -> Vec<f64> {
        self.steps.iter().map(|s| s.discharge_kw).collect()
    }

    pub fn soc(&self) -> Vec<f64> {
        self.steps.iter().map(|s| s.soc).collect()
    }
}

/// Result of one solve of the dispatch model with one backend
#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    pub solver: String,
    pub status: SolutionStatus,
    /// Total cost with storage, set only on optimal status
    pub objective: Option<f64>,
    /// Total cost without storage
    pub base_cost: f64,
    pub schedule: Option<DispatchSchedule>,
    pub elapsed: Duration,
    pub log: String,
}

impl DispatchOutcome {
    pub fn is_optimal(&self) -> bool {
        self.status.is_success() && self.schedule.is_some()
    }

    /// Cost reduction compared with running without storage
    pub fn savings(&self) -> Option<f64> {
        self.objective.map(|objective| self.base_cost - objective)
    }
}

/// Outcomes of the same model solved by several backends
#[derive(Debug, Clone, Default)]
pub struct SolverComparison {
    pub outcomes: Vec<DispatchOutcome>,
}

impl SolverComparison {
    /// Lowest-cost optimal outcome
    pub fn best(&self) -> Option<&DispatchOutcome> {
        self.outcomes
            .iter()
            .filter(|o| o.is_optimal())
            .filter_map(|o| o.objective.map(|obj| (ordered_float::OrderedFloat(obj), o)))
            .min_by_key(|(obj, _)| *obj)
            .map(|(_, o)| o)
    }

    pub fn into_best(self) -> Option<DispatchOutcome> {
        let best_index = self
            .outcomes
            .iter()
            .enumerate()
            .filter(|(_, o)| o.is_optimal())
            .filter_map(|(i, o)| o.objective.map(|obj| (ordered_float::OrderedFloat(obj), i)))
            .min_by_key(|(obj, _)| *obj)
            .map(|(_, i)| i)?;
        self.outcomes.into_iter().nth(best_index)
    }
}
