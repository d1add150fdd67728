//! Scenario configuration stored as `scenario.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::types::{PartialState, SystemState};
use crate::io::forcing::ForcingConfig;
use crate::model::{ModelParameters, RunnerOptions};

/// Default file name written by `soilcarb init`.
pub const DEFAULT_CONFIG_FILE: &str = "scenario.toml";

/// Scenario configuration (TOML).
///
/// Intended to be edited by humans. Missing tables fall back to the reference
/// soil and the published kinetic parameters; a present `[initial]` table must
/// list every state variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub initial: PartialState,
    pub parameters: ModelParameters,
    pub forcing: ForcingConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Destination of the exported history.
    pub history_path: PathBuf,
    /// Keep each step's intermediate variables in the history.
    pub record_diagnostics: bool,
    /// Clamp carbon-use efficiency to `[0, 1]`.
    pub clamp_cue: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            history_path: PathBuf::from("history.json"),
            record_diagnostics: false,
            clamp_cue: false,
        }
    }
}

impl OutputConfig {
    pub fn runner_options(&self) -> RunnerOptions {
        RunnerOptions {
            record_diagnostics: self.record_diagnostics,
            clamp_cue: self.clamp_cue,
        }
    }
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            initial: PartialState::from(SystemState::reference()),
            parameters: ModelParameters::default(),
            forcing: ForcingConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl ScenarioConfig {
    pub fn validate(&self) -> Result<()> {
        let p = &self.parameters;
        if !(0.0..=1.0).contains(&p.mic_to_soc) {
            return Err(anyhow!("parameters.mic_to_soc must be within [0, 1]"));
        }
        let positive = |value: f64| value.is_finite() && value > 0.0;
        if !positive(p.catalysis.gas_const) || !positive(p.uptake.gas_const) {
            return Err(anyhow!("parameters gas_const must be > 0"));
        }
        let rates = [
            ("catalysis.v_max_0", p.catalysis.v_max_0),
            ("catalysis.ea", p.catalysis.ea),
            ("catalysis.km_0", p.catalysis.km_0),
            ("catalysis.km_slope", p.catalysis.km_slope),
            ("uptake.v_max_uptake_0", p.uptake.v_max_uptake_0),
            ("uptake.ea_uptake", p.uptake.ea_uptake),
            ("uptake.km_uptake_0", p.uptake.km_uptake_0),
            ("uptake.km_uptake_slope", p.uptake.km_uptake_slope),
            ("carbon_use.cue_slope", p.carbon_use.cue_slope),
            ("carbon_use.cue_0", p.carbon_use.cue_0),
            ("enzyme.r_enz_prod", p.enzyme.r_enz_prod),
            ("enzyme.r_enz_loss", p.enzyme.r_enz_loss),
            ("death.r_death", p.death.r_death),
        ];
        if let Some((name, _)) = rates.iter().find(|(_, value)| !value.is_finite()) {
            return Err(anyhow!("parameters.{name} must be finite"));
        }
        if self.output.history_path.as_os_str().is_empty() {
            return Err(anyhow!("output.history_path must be non-empty"));
        }
        self.forcing.validate()
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `ScenarioConfig::default()`.
pub fn load_config(path: &Path) -> Result<ScenarioConfig> {
    if !path.exists() {
        debug!(path = %path.display(), "config missing, using defaults");
        let cfg = ScenarioConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: ScenarioConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    debug!(path = %path.display(), "config loaded");
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &ScenarioConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Forcing;

    #[test]
    fn load_missing_returns_default() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cfg = load_config(&temp.path().join("missing.toml")).expect("load");
        assert_eq!(cfg, ScenarioConfig::default());
    }

    #[test]
    fn write_then_load_round_trips() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("scenario.toml");
        let mut cfg = ScenarioConfig::default();
        cfg.forcing.schedule = vec![Forcing::new(0.5, 1.0, 0.1), Forcing::new(-0.25, 0.0, 0.0)];
        cfg.output.record_diagnostics = true;

        write_config(&path, &cfg).expect("write");
        let loaded = load_config(&path).expect("load");
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn partial_tables_fill_from_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("scenario.toml");
        fs::write(
            &path,
            "[parameters.death]\nr_death = 0.001\n\n[forcing]\nsteps = 7\n",
        )
        .expect("write");

        let cfg = load_config(&path).expect("load");
        assert_eq!(cfg.parameters.death.r_death, 0.001);
        assert_eq!(cfg.parameters.enzyme, ModelParameters::default().enzyme);
        assert_eq!(cfg.forcing.steps, 7);
        assert_eq!(cfg.initial, PartialState::from(SystemState::reference()));
    }

    #[test]
    fn incomplete_initial_table_stays_incomplete() {
        let cfg: ScenarioConfig = toml::from_str("[initial]\nsoc = 900.0\n").expect("parse");
        assert_eq!(cfg.initial.soc, Some(900.0));
        assert_eq!(cfg.initial.doc, None);
    }

    #[test]
    fn rejects_out_of_range_partition() {
        let mut cfg = ScenarioConfig::default();
        cfg.parameters.mic_to_soc = 1.5;
        let err = cfg.validate().expect_err("invalid partition");
        assert!(err.to_string().contains("mic_to_soc"));
    }

    #[test]
    fn rejects_non_positive_gas_constant() {
        let mut cfg = ScenarioConfig::default();
        cfg.parameters.uptake.gas_const = 0.0;
        assert!(cfg.validate().is_err());
    }
}
