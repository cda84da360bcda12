//! Synthetic input series for dispatch runs.
//!
//! Load and generation are drawn per clearing interval, prices per block of
//! clearing intervals. Both streams are seeded so a run is reproducible.

pub mod consumption;
pub mod prices;

pub use consumption::*;
pub use prices::*;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{DispatchInputs, Horizon};

/// Seed offset for the price stream so it does not mirror the load stream
const PRICE_SEED_OFFSET: u64 = 101;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisConfig {
    /// Fixed seed; `None` draws from entropy
    pub seed: Option<u64>,
    pub max_load_kw: f64,
    pub max_generation_kw: f64,
    pub price_base: f64,
    pub price_spread: f64,
    /// Clearing intervals sharing one price
    pub price_block_intervals: usize,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            seed: Some(1234),
            max_load_kw: 1.0,
            max_generation_kw: 1.0,
            price_base: 0.5,
            price_spread: 0.2,
            price_block_intervals: 12,
        }
    }
}

/// Draw a full set of input series for `horizon`
pub fn synthesize_inputs(config: &SynthesisConfig, horizon: &Horizon) -> DispatchInputs {
    let mut consumption = SyntheticConsumptionForecaster::new(
        config.max_load_kw,
        config.max_generation_kw,
        config.seed,
    );
    let mut prices = SyntheticPriceForecaster::new(
        config.price_base,
        config.price_spread,
        config.price_block_intervals,
        config.seed.map(|s| s.wrapping_add(PRICE_SEED_OFFSET)),
    );

    let ConsumptionForecast {
        user_load,
        user_generation,
    } = consumption.forecast_consumption(horizon);
    let price = prices.forecast_prices(horizon);

    let inputs = DispatchInputs::new(user_load, user_generation, price);
    debug!(
        n_steps = inputs.len(),
        base_cost = inputs.base_cost(),
        "synthesized input series"
    );
    inputs
}
