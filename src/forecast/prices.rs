use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::domain::{repeat_blocks, Horizon};

/// Source of the per-step price series for a run
pub trait PriceForecaster {
    fn forecast_prices(&mut self, horizon: &Horizon) -> Vec<f64>;
}

/// Random prices around a base level, held constant for `block_intervals`
/// clearing intervals at a time
pub struct SyntheticPriceForecaster {
    base: f64,
    spread: f64,
    block_intervals: usize,
    rng: StdRng,
}

impl SyntheticPriceForecaster {
    pub fn new(base: f64, spread: f64, block_intervals: usize, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            base,
            spread: spread.abs(),
            block_intervals: block_intervals.max(1),
            rng,
        }
    }

    fn sample_price(&mut self) -> f64 {
        let noise = if self.spread > 0.0 {
            self.rng.gen_range(-self.spread..=self.spread)
        } else {
            0.0
        };
        round_cents(self.base + noise)
    }
}

impl PriceForecaster for SyntheticPriceForecaster {
    fn forecast_prices(&mut self, horizon: &Horizon) -> Vec<f64> {
        let n_clearance = horizon.n_clearance();

        let mut per_clearing = Vec::with_capacity(n_clearance);
        while per_clearing.len() < n_clearance {
            let price = self.sample_price();
            let remaining = n_clearance - per_clearing.len();
            per_clearing.extend(std::iter::repeat(price).take(self.block_intervals.min(remaining)));
        }

        repeat_blocks(&per_clearing, horizon.steps_per_clearing())
    }
}

pub(crate) fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
