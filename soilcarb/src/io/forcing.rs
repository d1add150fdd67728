//! Forcing schedules: constant drivers, explicit per-step lists, or a
//! temperature series read from the scenario or a file.

use std::fs;
use std::iter;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::types::Forcing;
use crate::core::units::celsius_from_kelvin;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Kelvin,
}

/// Per-step forcing for a run.
///
/// Constant forcing is produced lazily, so `steps` costs no memory up front.
#[derive(Debug, Clone, PartialEq)]
pub enum ForcingSchedule {
    Constant { forcing: Forcing, steps: usize },
    Explicit(Vec<Forcing>),
}

impl ForcingSchedule {
    pub fn len(&self) -> usize {
        match self {
            ForcingSchedule::Constant { steps, .. } => *steps,
            ForcingSchedule::Explicit(forcings) => forcings.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keep at most `limit` steps.
    pub fn truncate(&mut self, limit: usize) {
        match self {
            ForcingSchedule::Constant { steps, .. } => *steps = (*steps).min(limit),
            ForcingSchedule::Explicit(forcings) => forcings.truncate(limit),
        }
    }

    pub fn iter(&self) -> Box<dyn Iterator<Item = Forcing> + '_> {
        match self {
            ForcingSchedule::Constant { forcing, steps } => {
                Box::new(iter::repeat_n(*forcing, *steps))
            }
            ForcingSchedule::Explicit(forcings) => Box::new(forcings.iter().copied()),
        }
    }
}

/// `[forcing]` table of the scenario.
///
/// Exactly one source is used, in this order: `schedule`, then
/// `temperature_series`, then `temperature_series_path`, then the constant
/// `dtemp`/`input_soc`/`input_doc` repeated `steps` times. Carbon inputs also
/// apply to temperature-series forcing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForcingConfig {
    pub steps: u32,
    pub dtemp: f64,
    pub input_soc: f64,
    pub input_doc: f64,
    /// Unit of `temperature_series` and the series file.
    pub temperature_unit: TemperatureUnit,
    /// JSON array of temperatures, relative to the scenario file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature_series_path: Option<PathBuf>,
    pub temperature_series: Vec<f64>,
    pub schedule: Vec<Forcing>,
}

impl Default for ForcingConfig {
    fn default() -> Self {
        Self {
            steps: 100,
            dtemp: 0.0,
            input_soc: 0.0,
            input_doc: 0.0,
            temperature_unit: TemperatureUnit::Celsius,
            temperature_series_path: None,
            temperature_series: Vec::new(),
            schedule: Vec::new(),
        }
    }
}

impl ForcingConfig {
    pub fn validate(&self) -> Result<()> {
        let sources = [
            !self.schedule.is_empty(),
            !self.temperature_series.is_empty(),
            self.temperature_series_path.is_some(),
        ];
        if sources.iter().filter(|set| **set).count() > 1 {
            bail!(
                "forcing: set at most one of schedule, temperature_series, temperature_series_path"
            );
        }
        Forcing::new(self.dtemp, self.input_soc, self.input_doc)
            .validate()
            .context("forcing constants")?;
        for (index, forcing) in self.schedule.iter().enumerate() {
            forcing
                .validate()
                .with_context(|| format!("forcing.schedule[{index}]"))?;
        }
        if let Some(index) = self.temperature_series.iter().position(|t| !t.is_finite()) {
            bail!("forcing.temperature_series[{index}] must be finite");
        }
        Ok(())
    }

    /// Expand this table into one forcing per step.
    ///
    /// `initial_temp` anchors the first delta of a temperature series;
    /// `base_dir` resolves a relative `temperature_series_path`.
    pub fn resolve(&self, initial_temp: f64, base_dir: &Path) -> Result<ForcingSchedule> {
        if !self.schedule.is_empty() {
            return Ok(ForcingSchedule::Explicit(self.schedule.clone()));
        }
        let series = if !self.temperature_series.is_empty() {
            self.temperature_series.clone()
        } else if let Some(path) = &self.temperature_series_path {
            load_temperature_series(&base_dir.join(path))?
        } else {
            return Ok(ForcingSchedule::Constant {
                forcing: Forcing::new(self.dtemp, self.input_soc, self.input_doc),
                steps: self.steps as usize,
            });
        };
        let celsius: Vec<f64> = match self.temperature_unit {
            TemperatureUnit::Celsius => series,
            TemperatureUnit::Kelvin => series.into_iter().map(celsius_from_kelvin).collect(),
        };
        Ok(ForcingSchedule::Explicit(Forcing::from_temperature_series(
            initial_temp,
            &celsius,
            self.input_soc,
            self.input_doc,
        )))
    }
}

/// Read a JSON array of temperatures.
pub fn load_temperature_series(path: &Path) -> Result<Vec<f64>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("read temperature series {}", path.display()))?;
    let series: Vec<f64> = serde_json::from_str(&contents)
        .with_context(|| format!("parse temperature series {}", path.display()))?;
    if let Some(index) = series.iter().position(|t| !t.is_finite()) {
        return Err(anyhow!(
            "temperature series {} has a non-finite value at index {index}",
            path.display()
        ));
    }
    debug!(path = %path.display(), samples = series.len(), "temperature series loaded");
    Ok(series)
}
