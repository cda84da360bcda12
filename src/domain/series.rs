use serde::{Deserialize, Serialize};

use crate::error::{DispatchError, DispatchResult};

/// Per-step input series of one dispatch run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchInputs {
    /// Household consumption per step (kW)
    pub user_load: Vec<f64>,
    /// Local generation per step (kW)
    pub user_generation: Vec<f64>,
    /// Energy price per step
    pub price: Vec<f64>,
}

impl DispatchInputs {
    pub fn new(user_load: Vec<f64>, user_generation: Vec<f64>, price: Vec<f64>) -> Self {
        Self {
            user_load,
            user_generation,
            price,
        }
    }

    /// Inputs with no generation, for callers that already hold a net-load series
    pub fn from_net_load(net_load: Vec<f64>, price: Vec<f64>) -> Self {
        let generation = vec![0.0; net_load.len()];
        Self::new(net_load, generation, price)
    }

    pub fn len(&self) -> usize {
        self.price.len()
    }

    pub fn is_empty(&self) -> bool {
        self.price.is_empty()
    }

    /// Every series must hold exactly `n_steps` values
    pub fn validate(&self, n_steps: usize) -> DispatchResult<()> {
        for (name, series) in [
            ("user_load", &self.user_load),
            ("user_generation", &self.user_generation),
            ("price", &self.price),
        ] {
            if series.len() != n_steps {
                return Err(DispatchError::SeriesLength {
                    name,
                    expected: n_steps,
                    actual: series.len(),
                });
            }
        }
        Ok(())
    }

    pub fn net_load(&self, step: usize) -> f64 {
        self.user_load[step] - self.user_generation[step]
    }

    pub fn net_load_series(&self) -> Vec<f64> {
        (0..self.len()).map(|i| self.net_load(i)).collect()
    }

    /// Cost of serving the net load without any storage
    pub fn base_cost(&self) -> f64 {
        (0..self.len()).map(|i| self.net_load(i) * self.price[i]).sum()
    }
}

/// Repeat every value `factor` times, turning per-block values into per-step values
pub fn repeat_blocks(values: &[f64], factor: usize) -> Vec<f64> {
    values
        .iter()
        .flat_map(|v| std::iter::repeat(*v).take(factor))
        .collect()
}
