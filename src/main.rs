use anyhow::Result;
use bess_dispatch::{config, runner, telemetry};
use config::Config;
use telemetry::init_tracing;
use tracing::info;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cfg = Config::load()?;
    init_tracing(cfg.telemetry.json);

    info!(
        backends = ?cfg.solver.backends,
        n_steps = cfg.horizon.n_ctrl(),
        "starting battery dispatch run"
    );

    let report = runner::run(&cfg)?;
    info!(run_id = %report.summary.run_id, solver = %report.best.solver, "run complete");
    Ok(())
}
