//! Result export: per-step CSV table and JSON run summary.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DispatchResult;
use crate::optimizer::{DispatchOutcome, DispatchSchedule, SolverComparison};
use crate::solver::SolutionStatus;

/// Column order of the results table
pub const CSV_HEADER: [&str; 8] = [
    "step",
    "user_load_kw",
    "user_generation_kw",
    "net_load_kw",
    "price",
    "charge_kw",
    "discharge_kw",
    "soc",
];

pub fn export_csv(schedule: &DispatchSchedule, path: &Path) -> DispatchResult<()> {
    let file = File::create(path)?;
    write_csv(schedule, BufWriter::new(file))
}

/// One row per control step; the header comes from
/// [`DispatchStep`](crate::optimizer::DispatchStep) field names
pub fn write_csv(schedule: &DispatchSchedule, writer: impl Write) -> DispatchResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for step in &schedule.steps {
        wtr.serialize(step)?;
    }
    if schedule.is_empty() {
        wtr.write_record(CSV_HEADER)?;
    }
    wtr.flush()?;
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverSummary {
    pub solver: String,
    pub status: SolutionStatus,
    pub objective: Option<f64>,
    pub savings: Option<f64>,
    pub solve_time_ms: u64,
}

impl From<&DispatchOutcome> for SolverSummary {
    fn from(outcome: &DispatchOutcome) -> Self {
        Self {
            solver: outcome.solver.clone(),
            status: outcome.status,
            objective: outcome.objective,
            savings: outcome.savings(),
            solve_time_ms: outcome.elapsed.as_millis() as u64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub n_steps: usize,
    pub base_cost: f64,
    pub solvers: Vec<SolverSummary>,
    pub best_solver: Option<String>,
}

impl RunSummary {
    pub fn new(n_steps: usize, base_cost: f64, comparison: &SolverComparison) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            created_at: Utc::now(),
            n_steps,
            base_cost,
            solvers: comparison.outcomes.iter().map(SolverSummary::from).collect(),
            best_solver: comparison.best().map(|o| o.solver.clone()),
        }
    }
}

pub fn write_summary(summary: &RunSummary, path: &Path) -> DispatchResult<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, summary)?;
    writer.flush()?;
    Ok(())
}
