//! Temperature-dependent carbon-use efficiency.

use serde::{Deserialize, Serialize};

use super::{KineticProcess, ProcessOutput, ensure_finite, linear};
use crate::core::error::SimulationError;
use crate::core::intermediate::{IntermediateVariables, IvKey};
use crate::core::types::SystemState;

/// Linear CUE response. The result is not clamped here; see
/// [`RunnerOptions::clamp_cue`](crate::model::RunnerOptions::clamp_cue).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarbonUse {
    pub cue_slope: f64,
    /// Efficiency at 0 °C.
    pub cue_0: f64,
}

impl Default for CarbonUse {
    fn default() -> Self {
        Self {
            cue_slope: -0.016,
            cue_0: 0.63,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CarbonUseOutput {
    pub cue: f64,
}

impl ProcessOutput for CarbonUseOutput {
    fn entries(&self) -> Vec<(IvKey, f64)> {
        vec![(IvKey::Cue, self.cue)]
    }
}

impl KineticProcess for CarbonUse {
    type Output = CarbonUseOutput;
    const NAME: &'static str = "carbon_use";

    fn compute(
        &self,
        state: &SystemState,
        _iv: &IntermediateVariables,
    ) -> Result<Self::Output, SimulationError> {
        let cue = ensure_finite(
            Self::NAME,
            "cue",
            linear(self.cue_slope, state.temp, self.cue_0),
        )?;
        Ok(CarbonUseOutput { cue })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn efficiency_declines_with_temperature() {
        let iv = IntermediateVariables::new();
        let out = CarbonUse::default()
            .compute(&SystemState::reference(), &iv)
            .expect("compute");
        assert!((out.cue - (0.63 - 0.016 * 20.0)).abs() < 1e-15);
    }

    #[test]
    fn extreme_temperatures_are_not_clamped() {
        let state = SystemState {
            temp: 50.0,
            ..SystemState::reference()
        };
        let out = CarbonUse::default()
            .compute(&state, &IntermediateVariables::new())
            .expect("compute");
        assert!(out.cue < 0.0);
    }
}
