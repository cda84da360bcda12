//! Post-solve verification of a dispatch schedule against the battery model.

use itertools::Itertools;

use super::constraints::DispatchConstraints;
use super::types::DispatchSchedule;
use crate::domain::{BatteryParams, Horizon};

#[derive(Debug, Clone, PartialEq)]
pub enum ScheduleViolation {
    InitialSoc { expected: f64, actual: f64 },
    SocBalance { step: usize, residual: f64 },
    SocBounds { step: usize, soc: f64 },
    PowerBounds { step: usize },
    SimultaneousModes { step: usize, charge_kw: f64, discharge_kw: f64 },
    ChargeRamp { step: usize, delta: f64 },
    DischargeRamp { step: usize, delta: f64 },
    FinalSoc { floor: f64, actual: f64 },
}

/// Every invariant of the dispatch model that `schedule` breaks by more
/// than `tolerance`
pub fn check_schedule(
    schedule: &DispatchSchedule,
    battery: &BatteryParams,
    horizon: &Horizon,
    constraints: &DispatchConstraints,
    tolerance: f64,
) -> Vec<ScheduleViolation> {
    let mut out = Vec::new();
    let Some(first) = schedule.steps.first() else {
        return out;
    };

    if (first.soc - battery.initial_soc).abs() > tolerance {
        out.push(ScheduleViolation::InitialSoc {
            expected: battery.initial_soc,
            actual: first.soc,
        });
    }

    let power = battery.nominal_power_kw;
    for s in &schedule.steps {
        if s.soc < battery.soc_min - tolerance || s.soc > battery.soc_max + tolerance {
            out.push(ScheduleViolation::SocBounds { step: s.step, soc: s.soc });
        }
        if s.charge_kw < -tolerance
            || s.charge_kw > power + tolerance
            || s.discharge_kw > tolerance
            || s.discharge_kw < -power - tolerance
        {
            out.push(ScheduleViolation::PowerBounds { step: s.step });
        }
        if s.charge_kw > tolerance && s.discharge_kw < -tolerance {
            out.push(ScheduleViolation::SimultaneousModes {
                step: s.step,
                charge_kw: s.charge_kw,
                discharge_kw: s.discharge_kw,
            });
        }
    }

    let dt = horizon.step_hours();
    let charge_coef = battery.charge_coefficient(dt);
    let discharge_coef = battery.discharge_coefficient(dt);
    let ramp = constraints.ramp_limit_kw;

    for (prev, next) in schedule.steps.iter().tuple_windows() {
        let expected =
            prev.soc + prev.charge_kw * charge_coef + prev.discharge_kw * discharge_coef;
        let residual = next.soc - expected;
        if residual.abs() > tolerance {
            out.push(ScheduleViolation::SocBalance {
                step: prev.step,
                residual,
            });
        }

        let delta = next.charge_kw - prev.charge_kw;
        if delta.abs() > ramp + tolerance {
            out.push(ScheduleViolation::ChargeRamp { step: prev.step, delta });
        }
        let delta = next.discharge_kw - prev.discharge_kw;
        if delta.abs() > ramp + tolerance {
            out.push(ScheduleViolation::DischargeRamp { step: prev.step, delta });
        }
    }

    // The floor applies after the last step has run
    if let (Some(floor), Some(last)) = (constraints.final_soc_min, schedule.steps.last()) {
        let terminal =
            last.soc + last.charge_kw * charge_coef + last.discharge_kw * discharge_coef;
        if terminal < floor - tolerance {
            out.push(ScheduleViolation::FinalSoc {
                floor,
                actual: terminal,
            });
        }
    }

    out
}
