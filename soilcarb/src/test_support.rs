//! Test-only helpers for building runners and scenario directories.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::core::types::{Forcing, SystemState};
use crate::io::config::{DEFAULT_CONFIG_FILE, ScenarioConfig, write_config};
use crate::model::{ModelParameters, ModelRunner, RunnerOptions};

/// Runner at the reference soil with published parameters.
pub fn reference_runner() -> ModelRunner {
    runner_with(SystemState::reference(), RunnerOptions::default())
}

pub fn runner_with(state: SystemState, options: RunnerOptions) -> ModelRunner {
    ModelRunner::new(state, ModelParameters::default(), options)
}

/// Step `runner` `steps` times with the same forcing.
pub fn run_constant(runner: &mut ModelRunner, forcing: Forcing, steps: usize) -> Result<()> {
    for _ in 0..steps {
        runner.step(forcing)?;
    }
    Ok(())
}

/// Temporary directory holding a `scenario.toml`.
pub struct ScenarioDir {
    temp: tempfile::TempDir,
}

impl ScenarioDir {
    pub fn new(cfg: &ScenarioConfig) -> Result<Self> {
        let temp = tempfile::tempdir()?;
        write_config(&temp.path().join(DEFAULT_CONFIG_FILE), cfg)?;
        Ok(Self { temp })
    }

    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    pub fn config_path(&self) -> PathBuf {
        self.root().join(DEFAULT_CONFIG_FILE)
    }
}
