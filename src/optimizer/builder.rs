//! Battery dispatch MILP
//!
//! Variables per control step `i`:
//! - `charge_i` in `[0, P]` (kW)
//! - `discharge_i` in `[-P, 0]` (kW, negative while discharging)
//! - `soc_i` in `[soc_min, soc_max]`
//! - `mode_i` binary, 1 while the step is allowed to charge
//!
//! With a terminal SOC floor the model also carries `soc_end`, the SOC after
//! the last step, so power at the last step is paid for in stored energy.
//!
//! Objective: minimise `sum((net_load_i + charge_i + discharge_i) * price_i)`.
//!
//! The binary mode makes charge and discharge mutually exclusive within a
//! step, which turns the problem into a MILP that needs a branch-and-bound
//! capable solver.

use tracing::debug;

use super::constraints::DispatchConstraints;
use super::model::{Direction, LinearExpr, LinearModel, Sense, VarId};
use crate::domain::{BatteryParams, DispatchInputs, Horizon};
use crate::error::DispatchResult;

/// Handles to the variable families of a built dispatch model
#[derive(Debug, Clone)]
pub struct DispatchVariables {
    pub charge: Vec<VarId>,
    pub discharge: Vec<VarId>,
    pub soc: Vec<VarId>,
    pub mode: Vec<VarId>,
    /// SOC after the last step, present only with a terminal floor
    pub soc_end: Option<VarId>,
}

#[derive(Debug, Clone)]
pub struct DispatchModel {
    pub model: LinearModel,
    pub vars: DispatchVariables,
}

impl DispatchModel {
    pub fn n_steps(&self) -> usize {
        self.vars.soc.len()
    }
}

/// `next - soc - charge * ce * dt - discharge * dt / de`, zero when the SOC balances
fn soc_balance(
    next: VarId,
    soc: VarId,
    charge: (VarId, f64),
    discharge: (VarId, f64),
) -> LinearExpr {
    LinearExpr::new()
        .term(next, 1.0)
        .term(soc, -1.0)
        .term(charge.0, -charge.1)
        .term(discharge.0, -discharge.1)
}

/// Build the dispatch MILP for one run.
///
/// Fails before touching the model when the horizon, battery, constraints
/// or input lengths are inconsistent.
pub fn build_dispatch_model(
    inputs: &DispatchInputs,
    battery: &BatteryParams,
    horizon: &Horizon,
    constraints: &DispatchConstraints,
) -> DispatchResult<DispatchModel> {
    horizon.validate()?;
    battery.check()?;
    constraints.validate()?;

    let n = horizon.n_ctrl();
    inputs.validate(n)?;

    let power = battery.nominal_power_kw;
    let dt = horizon.step_hours();
    let charge_coef = battery.charge_coefficient(dt);
    let discharge_coef = battery.discharge_coefficient(dt);
    let ramp = constraints.ramp_limit_kw;

    let mut model = LinearModel::new("battery_dispatch", Direction::Minimize);

    let charge: Vec<VarId> = (0..n)
        .map(|i| model.add_variable(format!("charge_{i}"), 0.0, power))
        .collect();
    let discharge: Vec<VarId> = (0..n)
        .map(|i| model.add_variable(format!("discharge_{i}"), -power, 0.0))
        .collect();
    let soc: Vec<VarId> = (0..n)
        .map(|i| model.add_variable(format!("soc_{i}"), battery.soc_min, battery.soc_max))
        .collect();
    let mode: Vec<VarId> = (0..n).map(|i| model.add_binary(format!("mode_{i}"))).collect();

    // Net load is fixed, so its cost stays in the objective as a constant
    let mut objective = LinearExpr::constant(inputs.base_cost());
    for i in 0..n {
        objective.add_term(charge[i], inputs.price[i]);
        objective.add_term(discharge[i], inputs.price[i]);
    }
    model.set_objective(objective);

    model.add_constraint(
        "init_soc",
        LinearExpr::new().term(soc[0], 1.0),
        Sense::Eq,
        battery.initial_soc,
    );

    for i in 0..n.saturating_sub(1) {
        model.add_constraint(
            format!("soc_balance_{i}"),
            soc_balance(
                soc[i + 1],
                soc[i],
                (charge[i], charge_coef),
                (discharge[i], discharge_coef),
            ),
            Sense::Eq,
            0.0,
        );

        for (family, vars) in [("charge", &charge), ("discharge", &discharge)] {
            let step = LinearExpr::new().term(vars[i + 1], 1.0).term(vars[i], -1.0);
            model.add_constraint(format!("{family}_ramp_up_{i}"), step.clone(), Sense::Le, ramp);
            model.add_constraint(format!("{family}_ramp_down_{i}"), step, Sense::Ge, -ramp);
        }
    }

    for i in 0..n {
        // charge[i] <= mode[i] * P
        model.add_constraint(
            format!("charge_mode_{i}"),
            LinearExpr::new().term(charge[i], 1.0).term(mode[i], -power),
            Sense::Le,
            0.0,
        );
        // -discharge[i] <= (1 - mode[i]) * P
        model.add_constraint(
            format!("discharge_mode_{i}"),
            LinearExpr::new().term(discharge[i], -1.0).term(mode[i], power),
            Sense::Le,
            power,
        );
    }

    let soc_end = constraints.final_soc_min.map(|floor| {
        let last = n - 1;
        let end = model.add_variable("soc_end", battery.soc_min, battery.soc_max);
        model.add_constraint(
            "soc_end_balance",
            soc_balance(
                end,
                soc[last],
                (charge[last], charge_coef),
                (discharge[last], discharge_coef),
            ),
            Sense::Eq,
            0.0,
        );
        model.add_constraint("final_soc", LinearExpr::new().term(end, 1.0), Sense::Ge, floor);
        end
    });

    debug!(
        n_steps = n,
        n_variables = model.variables().len(),
        n_constraints = model.constraints().len(),
        n_binaries = model.n_binaries(),
        "built dispatch model"
    );

    Ok(DispatchModel {
        model,
        vars: DispatchVariables {
            charge,
            discharge,
            soc,
            mode,
            soc_end,
        },
    })
}
