//! Microbial assimilation of DOC.

use serde::{Deserialize, Serialize};

use super::{GAS_CONST, KineticProcess, ProcessOutput, arrhenius, linear, michaelis_menten};
use crate::core::error::SimulationError;
use crate::core::intermediate::{IntermediateVariables, IvKey};
use crate::core::types::SystemState;

/// Parameters for temperature-sensitive microbial uptake.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Uptake {
    pub v_max_uptake_0: f64,
    pub ea_uptake: f64,
    pub gas_const: f64,
    pub km_uptake_0: f64,
    pub km_uptake_slope: f64,
}

impl Default for Uptake {
    fn default() -> Self {
        Self {
            v_max_uptake_0: 100_000_000.0,
            ea_uptake: 47.0,
            gas_const: GAS_CONST,
            km_uptake_0: 0.1,
            km_uptake_slope: 0.01,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UptakeOutput {
    pub v_max_uptake: f64,
    pub km_uptake: f64,
    pub assim: f64,
}

impl ProcessOutput for UptakeOutput {
    fn entries(&self) -> Vec<(IvKey, f64)> {
        vec![
            (IvKey::VMaxUptake, self.v_max_uptake),
            (IvKey::KmUptake, self.km_uptake),
            (IvKey::Assim, self.assim),
        ]
    }
}

impl KineticProcess for Uptake {
    type Output = UptakeOutput;
    const NAME: &'static str = "uptake";

    fn compute(
        &self,
        state: &SystemState,
        _iv: &IntermediateVariables,
    ) -> Result<Self::Output, SimulationError> {
        let v_max_uptake = arrhenius(
            self.v_max_uptake_0,
            self.ea_uptake,
            self.gas_const,
            state.temp,
        );
        let km_uptake = linear(self.km_uptake_slope, state.temp, self.km_uptake_0);
        let assim = michaelis_menten(
            Self::NAME,
            "assim",
            v_max_uptake,
            state.mic,
            km_uptake,
            state.doc,
        )?;
        Ok(UptakeOutput {
            v_max_uptake,
            km_uptake,
            assim,
        })
    }
}
