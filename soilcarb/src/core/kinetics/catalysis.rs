//! Enzyme-catalysed decomposition of SOC into DOC.

use serde::{Deserialize, Serialize};

use super::{GAS_CONST, KineticProcess, ProcessOutput, arrhenius, linear, michaelis_menten};
use crate::core::error::SimulationError;
use crate::core::intermediate::{IntermediateVariables, IvKey};
use crate::core::types::SystemState;

/// Parameters for temperature-sensitive enzymatic decomposition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnzymeCatalysis {
    /// Maximum reaction velocity pre-exponential factor.
    pub v_max_0: f64,
    /// Activation energy (kJ mol⁻¹).
    pub ea: f64,
    pub gas_const: f64,
    /// Half-saturation constant at 0 °C.
    pub km_0: f64,
    /// Change in half-saturation constant per °C.
    pub km_slope: f64,
}

impl Default for EnzymeCatalysis {
    fn default() -> Self {
        Self {
            v_max_0: 100_000_000.0,
            ea: 47.0,
            gas_const: GAS_CONST,
            km_0: 500.0,
            km_slope: 5.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CatalysisOutput {
    pub v_max: f64,
    pub km: f64,
    pub decomp: f64,
}

impl ProcessOutput for CatalysisOutput {
    fn entries(&self) -> Vec<(IvKey, f64)> {
        vec![
            (IvKey::VMax, self.v_max),
            (IvKey::Km, self.km),
            (IvKey::Decomp, self.decomp),
        ]
    }
}

impl KineticProcess for EnzymeCatalysis {
    type Output = CatalysisOutput;
    const NAME: &'static str = "enzyme_catalysis";

    fn compute(
        &self,
        state: &SystemState,
        _iv: &IntermediateVariables,
    ) -> Result<Self::Output, SimulationError> {
        let v_max = arrhenius(self.v_max_0, self.ea, self.gas_const, state.temp);
        let km = linear(self.km_slope, state.temp, self.km_0);
        let decomp = michaelis_menten(Self::NAME, "decomp", v_max, state.enz, km, state.soc)?;
        Ok(CatalysisOutput { v_max, km, decomp })
    }
}
