use serde::{Deserialize, Serialize};

use crate::error::{DispatchError, DispatchResult};

/// Policy constraints layered on top of the battery physics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DispatchConstraints {
    /// Largest change of charge or discharge power between consecutive steps (kW)
    pub ramp_limit_kw: f64,
    /// Optional floor on the SOC of the last step
    #[serde(default)]
    pub final_soc_min: Option<f64>,
}

impl Default for DispatchConstraints {
    fn default() -> Self {
        Self {
            ramp_limit_kw: 0.01,
            final_soc_min: None,
        }
    }
}

impl DispatchConstraints {
    pub fn validate(&self) -> DispatchResult<()> {
        if !self.ramp_limit_kw.is_finite() || self.ramp_limit_kw < 0.0 {
            return Err(DispatchError::InvalidConstraints(format!(
                "ramp_limit_kw must be a non-negative number, got {}",
                self.ramp_limit_kw
            )));
        }

        if let Some(floor) = self.final_soc_min {
            if !(0.0..=1.0).contains(&floor) {
                return Err(DispatchError::InvalidConstraints(format!(
                    "final_soc_min must be within [0, 1], got {}",
                    floor
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ramp_limit() {
        let constraints = DispatchConstraints::default();
        assert_eq!(constraints.ramp_limit_kw, 0.01);
        constraints.validate().unwrap();
    }

    #[test]
    fn test_negative_ramp_rejected() {
        let constraints = DispatchConstraints {
            ramp_limit_kw: -0.1,
            ..Default::default()
        };
        assert!(constraints.validate().is_err());
    }

    #[test]
    fn test_final_soc_out_of_range() {
        let constraints = DispatchConstraints {
            final_soc_min: Some(1.2),
            ..Default::default()
        };
        assert!(constraints.validate().is_err());
    }
}
