use serde::{Deserialize, Serialize};

use crate::error::{DispatchError, DispatchResult};

/// Discrete time grid of a dispatch run.
///
/// Prices clear once per `clear_interval_minutes`, the battery is steered
/// once per `ctrl_interval_minutes`, and the whole run spans
/// `clear_period_minutes`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Horizon {
    pub clear_interval_minutes: u32,
    pub clear_period_minutes: u32,
    pub ctrl_interval_minutes: u32,
}

impl Default for Horizon {
    fn default() -> Self {
        Self {
            clear_interval_minutes: 30,
            clear_period_minutes: 24 * 60,
            ctrl_interval_minutes: 1,
        }
    }
}

impl Horizon {
    pub fn new(
        clear_interval_minutes: u32,
        clear_period_minutes: u32,
        ctrl_interval_minutes: u32,
    ) -> Self {
        Self {
            clear_interval_minutes,
            clear_period_minutes,
            ctrl_interval_minutes,
        }
    }

    /// Reject grids whose intervals do not nest exactly
    pub fn validate(&self) -> DispatchResult<()> {
        if self.clear_interval_minutes == 0
            || self.clear_period_minutes == 0
            || self.ctrl_interval_minutes == 0
        {
            return Err(DispatchError::InvalidHorizon(format!(
                "intervals must be positive (clear_interval={}, clear_period={}, ctrl_interval={})",
                self.clear_interval_minutes, self.clear_period_minutes, self.ctrl_interval_minutes
            )));
        }

        if self.clear_period_minutes % self.clear_interval_minutes != 0 {
            return Err(DispatchError::InvalidHorizon(format!(
                "clear_period ({} min) must be a multiple of clear_interval ({} min)",
                self.clear_period_minutes, self.clear_interval_minutes
            )));
        }

        if self.clear_interval_minutes % self.ctrl_interval_minutes != 0 {
            return Err(DispatchError::InvalidHorizon(format!(
                "clear_interval ({} min) must be a multiple of ctrl_interval ({} min)",
                self.clear_interval_minutes, self.ctrl_interval_minutes
            )));
        }

        Ok(())
    }

    /// Number of clearing blocks in the run
    pub fn n_clearance(&self) -> usize {
        (self.clear_period_minutes / self.clear_interval_minutes) as usize
    }

    /// Number of control steps in the run
    pub fn n_ctrl(&self) -> usize {
        (self.clear_period_minutes / self.ctrl_interval_minutes) as usize
    }

    pub fn steps_per_clearing(&self) -> usize {
        (self.clear_interval_minutes / self.ctrl_interval_minutes) as usize
    }

    /// Length of one control step in hours
    pub fn step_hours(&self) -> f64 {
        self.ctrl_interval_minutes as f64 / 60.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_default_horizon_is_one_day_of_minutes() {
        let horizon = Horizon::default();
        horizon.validate().unwrap();
        assert_eq!(horizon.n_clearance(), 48);
        assert_eq!(horizon.n_ctrl(), 1440);
        assert_eq!(horizon.steps_per_clearing(), 30);
        assert!((horizon.step_hours() - 1.0 / 60.0).abs() < 1e-12);
    }

    #[rstest]
    #[case::period_not_multiple(30, 1450, 1)]
    #[case::clearing_not_multiple(30, 1440, 7)]
    #[case::zero_ctrl(30, 1440, 0)]
    #[case::zero_clearing(0, 1440, 1)]
    fn test_invalid_horizons_fail_fast(#[case] clear: u32, #[case] period: u32, #[case] ctrl: u32) {
        let err = Horizon::new(clear, period, ctrl).validate().unwrap_err();
        assert!(matches!(err, DispatchError::InvalidHorizon(_)));
    }

    #[test]
    fn test_hourly_grid() {
        let horizon = Horizon::new(60, 6 * 60, 60);
        horizon.validate().unwrap();
        assert_eq!(horizon.n_ctrl(), 6);
        assert_eq!(horizon.steps_per_clearing(), 1);
        assert_eq!(horizon.step_hours(), 1.0);
    }
}
