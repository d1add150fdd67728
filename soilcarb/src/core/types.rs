//! Shared deterministic types for the simulation core.
//!
//! These types define the contracts between the kinetic processes, the state
//! update equations, and the history log. They carry no I/O and compare by
//! value.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::error::SimulationError;

/// Authoritative state of one simulation run.
///
/// Stocks are carbon pools; `co2` is the cumulative respired flux and `temp`
/// is the current temperature in °C. Non-negativity is intended but not
/// enforced by the update equations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SystemState {
    /// Soil organic carbon.
    pub soc: f64,
    /// Dissolved organic carbon.
    pub doc: f64,
    /// Microbial biomass carbon.
    pub mic: f64,
    /// Extracellular enzyme pool.
    pub enz: f64,
    /// Cumulative CO2 released by microbial respiration.
    pub co2: f64,
    /// Temperature in °C.
    pub temp: f64,
}

impl SystemState {
    /// Reference soil used throughout the model literature and tests.
    pub fn reference() -> Self {
        Self {
            soc: 1000.0,
            doc: 10.0,
            mic: 5.0,
            enz: 0.01,
            co2: 0.0,
            temp: 20.0,
        }
    }

    pub fn get(&self, variable: Variable) -> f64 {
        match variable {
            Variable::Soc => self.soc,
            Variable::Doc => self.doc,
            Variable::Mic => self.mic,
            Variable::Enz => self.enz,
            Variable::Co2 => self.co2,
            Variable::Temp => self.temp,
        }
    }

    /// Sum of the four organic pools (`soc + doc + mic + enz`).
    pub fn organic_carbon(&self) -> f64 {
        self.soc + self.doc + self.mic + self.enz
    }
}

/// State as supplied by a caller, where any variable may be absent.
///
/// Converting into [`SystemState`] fails with
/// [`SimulationError::MissingState`] naming every absent variable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartialState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub soc: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mic: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enz: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub co2: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp: Option<f64>,
}

impl PartialState {
    pub fn get(&self, variable: Variable) -> Option<f64> {
        match variable {
            Variable::Soc => self.soc,
            Variable::Doc => self.doc,
            Variable::Mic => self.mic,
            Variable::Enz => self.enz,
            Variable::Co2 => self.co2,
            Variable::Temp => self.temp,
        }
    }
}

impl From<SystemState> for PartialState {
    fn from(state: SystemState) -> Self {
        Self {
            soc: Some(state.soc),
            doc: Some(state.doc),
            mic: Some(state.mic),
            enz: Some(state.enz),
            co2: Some(state.co2),
            temp: Some(state.temp),
        }
    }
}

impl TryFrom<PartialState> for SystemState {
    type Error = SimulationError;

    fn try_from(partial: PartialState) -> Result<Self, Self::Error> {
        match (
            partial.soc,
            partial.doc,
            partial.mic,
            partial.enz,
            partial.co2,
            partial.temp,
        ) {
            (Some(soc), Some(doc), Some(mic), Some(enz), Some(co2), Some(temp)) => Ok(Self {
                soc,
                doc,
                mic,
                enz,
                co2,
                temp,
            }),
            _ => Err(SimulationError::MissingState {
                keys: Variable::ALL
                    .into_iter()
                    .filter(|variable| partial.get(*variable).is_none())
                    .collect(),
            }),
        }
    }
}

/// Named state variable, used to key trajectories and error reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variable {
    Soc,
    Doc,
    Mic,
    Enz,
    Co2,
    Temp,
}

impl Variable {
    /// All variables in canonical (export) order.
    pub const ALL: [Variable; 6] = [
        Variable::Soc,
        Variable::Doc,
        Variable::Mic,
        Variable::Enz,
        Variable::Co2,
        Variable::Temp,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Variable::Soc => "soc",
            Variable::Doc => "doc",
            Variable::Mic => "mic",
            Variable::Enz => "enz",
            Variable::Co2 => "co2",
            Variable::Temp => "temp",
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Variable {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Variable::ALL
            .into_iter()
            .find(|variable| variable.as_str() == raw.trim().to_ascii_lowercase())
            .ok_or_else(|| format!("unknown variable '{raw}'"))
    }
}

/// Per-step external drivers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Forcing {
    /// Temperature change applied before the processes run (°C).
    pub dtemp: f64,
    /// Carbon added to SOC this step.
    pub input_soc: f64,
    /// Carbon added to DOC this step.
    pub input_doc: f64,
}

impl Forcing {
    pub fn new(dtemp: f64, input_soc: f64, input_doc: f64) -> Self {
        Self {
            dtemp,
            input_soc,
            input_doc,
        }
    }

    /// Forcings that track an observed or projected temperature series.
    ///
    /// Each step moves the temperature to the next sample; the first delta is
    /// taken relative to `initial_temp`. Carbon inputs are constant.
    pub fn from_temperature_series(
        initial_temp: f64,
        temperatures: &[f64],
        input_soc: f64,
        input_doc: f64,
    ) -> Vec<Self> {
        let mut previous = initial_temp;
        temperatures
            .iter()
            .map(|&temp| {
                let dtemp = temp - previous;
                previous = temp;
                Self::new(dtemp, input_soc, input_doc)
            })
            .collect()
    }

    pub fn validate(&self) -> Result<(), SimulationError> {
        for (field, value) in [
            ("dtemp", self.dtemp),
            ("input_soc", self.input_soc),
            ("input_doc", self.input_doc),
        ] {
            if !value.is_finite() {
                return Err(SimulationError::InvalidForcing { field, value });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complete_partial_state_converts() {
        let state = SystemState::try_from(PartialState::from(SystemState::reference()))
            .expect("complete state");
        assert_eq!(state, SystemState::reference());
    }

    #[test]
    fn missing_keys_are_reported_in_canonical_order() {
        let partial = PartialState {
            soc: Some(1.0),
            mic: Some(1.0),
            co2: Some(0.0),
            ..PartialState::default()
        };
        let err = SystemState::try_from(partial).expect_err("missing keys");
        assert_eq!(
            err,
            SimulationError::MissingState {
                keys: vec![Variable::Doc, Variable::Enz, Variable::Temp],
            }
        );
    }

    #[test]
    fn variable_parses_case_insensitively() {
        assert_eq!("CO2".parse::<Variable>(), Ok(Variable::Co2));
        assert!("nitrogen".parse::<Variable>().is_err());
    }

    #[test]
    fn temperature_series_becomes_successive_deltas() {
        let forcings = Forcing::from_temperature_series(20.0, &[21.0, 23.0, 22.5], 0.5, 0.0);
        let deltas: Vec<f64> = forcings.iter().map(|f| f.dtemp).collect();
        assert_eq!(deltas, vec![1.0, 2.0, -0.5]);
        assert!(forcings.iter().all(|f| f.input_soc == 0.5));
    }

    #[test]
    fn non_finite_forcing_is_rejected() {
        let err = Forcing::new(f64::NAN, 0.0, 0.0)
            .validate()
            .expect_err("nan forcing");
        assert!(matches!(
            err,
            SimulationError::InvalidForcing { field: "dtemp", .. }
        ));
    }
}
