//! First-order enzyme production and decay.

use serde::{Deserialize, Serialize};

use super::{KineticProcess, ProcessOutput, ensure_finite};
use crate::core::error::SimulationError;
use crate::core::intermediate::{IntermediateVariables, IvKey};
use crate::core::types::SystemState;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnzymeProductionDecay {
    /// Fraction of microbial biomass converted to enzyme per step.
    pub r_enz_prod: f64,
    /// Fraction of the enzyme pool lost per step.
    pub r_enz_loss: f64,
}

impl Default for EnzymeProductionDecay {
    fn default() -> Self {
        Self {
            r_enz_prod: 0.000005,
            r_enz_loss: 0.001,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnzymeTurnoverOutput {
    pub eprod: f64,
    pub eloss: f64,
}

impl ProcessOutput for EnzymeTurnoverOutput {
    fn entries(&self) -> Vec<(IvKey, f64)> {
        vec![(IvKey::Eprod, self.eprod), (IvKey::Eloss, self.eloss)]
    }
}

impl KineticProcess for EnzymeProductionDecay {
    type Output = EnzymeTurnoverOutput;
    const NAME: &'static str = "enzyme_production_decay";

    fn compute(
        &self,
        state: &SystemState,
        _iv: &IntermediateVariables,
    ) -> Result<Self::Output, SimulationError> {
        Ok(EnzymeTurnoverOutput {
            eprod: ensure_finite(Self::NAME, "eprod", state.mic * self.r_enz_prod)?,
            eloss: ensure_finite(Self::NAME, "eloss", state.enz * self.r_enz_loss)?,
        })
    }
}
