//! Battery storage dispatch as a mixed-integer linear program.
//!
//! [`optimizer::build_dispatch_model`] turns load, generation and price
//! series plus battery parameters into a solver-neutral
//! [`optimizer::model::LinearModel`]. Any [`solver::Solver`] backend solves
//! it; [`optimizer::MilpOptimizer`] ties both together and reads the
//! schedule back.

pub mod config;
pub mod domain;
pub mod error;
pub mod export;
pub mod forecast;
pub mod optimizer;
pub mod runner;
pub mod solver;
pub mod telemetry;

pub use error::{DispatchError, DispatchResult};
