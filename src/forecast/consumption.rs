use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::prices::round_cents;
use crate::domain::{repeat_blocks, Horizon};

/// Household load and local generation over a run, one value per step
#[derive(Debug, Clone, PartialEq)]
pub struct ConsumptionForecast {
    pub user_load: Vec<f64>,
    pub user_generation: Vec<f64>,
}

pub trait ConsumptionForecaster {
    fn forecast_consumption(&mut self, horizon: &Horizon) -> ConsumptionForecast;
}

/// Uniform random load and generation in `[0, max_kw)`, drawn once per
/// clearing interval and held for its control steps
pub struct SyntheticConsumptionForecaster {
    max_load_kw: f64,
    max_generation_kw: f64,
    rng: StdRng,
}

impl SyntheticConsumptionForecaster {
    pub fn new(max_load_kw: f64, max_generation_kw: f64, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            max_load_kw: max_load_kw.max(0.0),
            max_generation_kw: max_generation_kw.max(0.0),
            rng,
        }
    }

    fn sample_blocks(&mut self, n: usize, max_kw: f64) -> Vec<f64> {
        (0..n)
            .map(|_| {
                if max_kw > 0.0 {
                    round_cents(self.rng.gen_range(0.0..max_kw))
                } else {
                    0.0
                }
            })
            .collect()
    }
}

impl ConsumptionForecaster for SyntheticConsumptionForecaster {
    fn forecast_consumption(&mut self, horizon: &Horizon) -> ConsumptionForecast {
        let n_clearance = horizon.n_clearance();
        let factor = horizon.steps_per_clearing();

        let load = self.sample_blocks(n_clearance, self.max_load_kw);
        let generation = self.sample_blocks(n_clearance, self.max_generation_kw);

        ConsumptionForecast {
            user_load: repeat_blocks(&load, factor),
            user_generation: repeat_blocks(&generation, factor),
        }
    }
}
