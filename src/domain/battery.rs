use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{DispatchError, DispatchResult};

/// Static parameters of the storage unit for one run.
///
/// SOC values are fractions of `capacity_kwh`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct BatteryParams {
    #[validate(range(min = 0.01, max = 1.0))]
    pub charge_efficiency: f64,

    #[validate(range(min = 0.01, max = 1.0))]
    pub discharge_efficiency: f64,

    /// Bound on both charge and discharge power (kW)
    #[validate(range(min = 0.0))]
    pub nominal_power_kw: f64,

    #[validate(range(min = 0.0, max = 1.0))]
    pub soc_min: f64,

    #[validate(range(min = 0.0, max = 1.0))]
    pub soc_max: f64,

    #[validate(range(min = 0.0, max = 1.0))]
    pub initial_soc: f64,

    #[validate(range(min = 0.001))]
    pub capacity_kwh: f64,
}

impl Default for BatteryParams {
    fn default() -> Self {
        Self {
            charge_efficiency: 0.91,
            discharge_efficiency: 0.95,
            nominal_power_kw: 0.8,
            soc_min: 0.0,
            soc_max: 1.0,
            initial_soc: 0.5,
            capacity_kwh: 1.0,
        }
    }
}

impl BatteryParams {
    /// Field ranges plus the ordering `soc_min <= initial_soc <= soc_max`
    pub fn check(&self) -> DispatchResult<()> {
        self.validate()?;

        if self.soc_min > self.soc_max {
            return Err(DispatchError::InvalidBattery(format!(
                "soc_min ({}) must be <= soc_max ({})",
                self.soc_min, self.soc_max
            )));
        }

        if self.initial_soc < self.soc_min || self.initial_soc > self.soc_max {
            return Err(DispatchError::InvalidBattery(format!(
                "initial_soc ({}) must lie within [{}, {}]",
                self.initial_soc, self.soc_min, self.soc_max
            )));
        }

        Ok(())
    }

    /// SOC gained per kW of charge power held for one step
    pub fn charge_coefficient(&self, step_hours: f64) -> f64 {
        self.charge_efficiency * step_hours / self.capacity_kwh
    }

    /// SOC change per kW of (negative) discharge power held for one step
    pub fn discharge_coefficient(&self, step_hours: f64) -> f64 {
        step_hours / self.discharge_efficiency / self.capacity_kwh
    }
}
