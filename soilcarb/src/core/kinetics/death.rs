//! Microbial mortality.

use serde::{Deserialize, Serialize};

use super::{KineticProcess, ProcessOutput, ensure_finite};
use crate::core::error::SimulationError;
use crate::core::intermediate::{IntermediateVariables, IvKey};
use crate::core::types::SystemState;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MicDeath {
    pub r_death: f64,
}

impl Default for MicDeath {
    fn default() -> Self {
        Self { r_death: 0.0002 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeathOutput {
    pub death: f64,
}

impl ProcessOutput for DeathOutput {
    fn entries(&self) -> Vec<(IvKey, f64)> {
        vec![(IvKey::Death, self.death)]
    }
}

impl KineticProcess for MicDeath {
    type Output = DeathOutput;
    const NAME: &'static str = "mic_death";

    fn compute(
        &self,
        state: &SystemState,
        _iv: &IntermediateVariables,
    ) -> Result<Self::Output, SimulationError> {
        let death = ensure_finite(Self::NAME, "death", self.r_death * state.mic)?;
        Ok(DeathOutput { death })
    }
}
