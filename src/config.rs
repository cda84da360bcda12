use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::domain::{BatteryParams, Horizon};
use crate::error::{DispatchError, DispatchResult};
use crate::forecast::SynthesisConfig;
use crate::optimizer::DispatchConstraints;
use crate::solver::{SolverKind, SolverSettings};

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";
/// Names an alternative config file
pub const CONFIG_PATH_ENV: &str = "BESS_CONFIG";
pub const ENV_PREFIX: &str = "BESS__";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub horizon: Horizon,
    pub battery: BatteryParams,
    pub dispatch: DispatchConstraints,
    pub synthesis: SynthesisConfig,
    pub solver: SolverConfig,
    pub output: OutputConfig,
    pub telemetry: TelemetryConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Backends to run, in order; more than one turns the run into a comparison
    pub backends: Vec<SolverKind>,
    pub time_limit_seconds: Option<u64>,
    pub echo_log: bool,
    pub keep_files: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            backends: vec![SolverKind::Cbc],
            time_limit_seconds: None,
            echo_log: false,
            keep_files: false,
        }
    }
}

impl SolverConfig {
    pub fn settings(&self) -> SolverSettings {
        SolverSettings {
            time_limit_seconds: self.time_limit_seconds,
            echo_log: self.echo_log,
            keep_files: self.keep_files,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    pub results_path: PathBuf,
    pub summary_path: Option<PathBuf>,
    /// Debug dump of the model in LP format
    pub lp_path: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            results_path: PathBuf::from("optimization_results.csv"),
            summary_path: None,
            lp_path: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    pub json: bool,
}

impl Config {
    /// Defaults, then the config file (`BESS_CONFIG` or `config/default.toml`),
    /// then `BESS__*` environment variables
    pub fn load() -> Result<Self> {
        let path =
            std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(path)
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let figment = Self::figment(path).merge(Env::prefixed(ENV_PREFIX).split("__"));
        let cfg: Config = figment
            .extract()
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
        cfg.validate().context("Invalid configuration")?;
        Ok(cfg)
    }

    /// Defaults layered under one TOML file
    pub fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(Config::default())).merge(Toml::file(path))
    }

    /// Cross-field rules the serde layer cannot express
    pub fn validate(&self) -> DispatchResult<()> {
        self.horizon.validate()?;
        self.battery.check()?;
        self.dispatch.validate()?;

        if self.solver.backends.is_empty() {
            return Err(DispatchError::InvalidConstraints(
                "solver.backends must name at least one solver".to_string(),
            ));
        }
        if self.synthesis.price_block_intervals == 0 {
            return Err(DispatchError::InvalidHorizon(
                "synthesis.price_block_intervals must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let cfg = Config::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.solver.backends, vec![SolverKind::Cbc]);
        assert_eq!(cfg.dispatch.ramp_limit_kw, 0.01);
        assert_eq!(cfg.synthesis.seed, Some(1234));
    }

    #[test]
    fn test_partial_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bess.toml");
        std::fs::write(
            &path,
            r#"
[horizon]
clear_interval_minutes = 60
clear_period_minutes = 360

[battery]
initial_soc = 0.2

[solver]
backends = ["glpk", "microlp"]
time_limit_seconds = 10
"#,
        )
        .unwrap();

        let cfg: Config = Config::figment(&path).extract().unwrap();
        assert_eq!(cfg.horizon.clear_interval_minutes, 60);
        assert_eq!(cfg.horizon.ctrl_interval_minutes, 1);
        assert_eq!(cfg.battery.initial_soc, 0.2);
        assert_eq!(cfg.battery.capacity_kwh, 1.0);
        assert_eq!(cfg.solver.backends, vec![SolverKind::Glpk, SolverKind::Microlp]);
        assert_eq!(cfg.solver.settings().time_limit_seconds, Some(10));
        assert_eq!(cfg.output.results_path, PathBuf::from("optimization_results.csv"));
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let cfg: Config = Config::figment(Path::new("/nonexistent/bess.toml")).extract().unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn test_final_soc_floor_from_toml() {
        let cfg: Config = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::string("[dispatch]\nramp_limit_kw = 0.5\nfinal_soc_min = 0.5\n"))
            .extract()
            .unwrap();
        assert_eq!(cfg.dispatch.ramp_limit_kw, 0.5);
        assert_eq!(cfg.dispatch.final_soc_min, Some(0.5));
    }

    #[test]
    fn test_validate_rejects_bad_horizon() {
        let mut cfg = Config::default();
        cfg.horizon.clear_period_minutes = 1441;
        assert!(matches!(cfg.validate(), Err(DispatchError::InvalidHorizon(_))));
    }

    #[test]
    fn test_validate_rejects_empty_backends() {
        let mut cfg = Config::default();
        cfg.solver.backends.clear();
        assert!(cfg.validate().is_err());
    }
}
