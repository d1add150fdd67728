//! State-update equations applied once per step.

use crate::core::error::SimulationError;
use crate::core::intermediate::{IntermediateVariables, IvKey};
use crate::core::kinetics::ensure_finite;
use crate::core::types::{Forcing, SystemState};

/// Default fraction of dead microbial biomass routed to SOC (rest goes to DOC).
pub const DEFAULT_MIC_TO_SOC: f64 = 0.5;

const STAGE: &str = "state_update";

/// Apply one forward-Euler step to `state` using this step's fluxes.
///
/// `state` must already carry the step's temperature. Returns the advanced
/// state; the input is never modified, so a failure leaves the caller's
/// state intact.
///
/// ```text
/// soc' = soc + input_soc + death*mic_to_soc - decomp
/// doc' = doc + input_doc + death*(1-mic_to_soc) + decomp + eloss - assim
/// mic' = mic + assim*cue - death - eprod
/// enz' = enz + eprod - eloss
/// co2' = co2 + assim*(1-cue)
/// ```
pub fn apply_state_updates(
    state: &SystemState,
    iv: &IntermediateVariables,
    forcing: &Forcing,
    mic_to_soc: f64,
) -> Result<SystemState, SimulationError> {
    let decomp = iv.require(IvKey::Decomp)?;
    let assim = iv.require(IvKey::Assim)?;
    let cue = iv.require(IvKey::Cue)?;
    let eprod = iv.require(IvKey::Eprod)?;
    let eloss = iv.require(IvKey::Eloss)?;
    let death = iv.require(IvKey::Death)?;

    let soc = state.soc + forcing.input_soc + death * mic_to_soc - decomp;
    let doc =
        state.doc + forcing.input_doc + death * (1.0 - mic_to_soc) + decomp + eloss - assim;
    let mic = state.mic + assim * cue - death - eprod;
    let enz = state.enz + eprod - eloss;
    let co2 = state.co2 + assim * (1.0 - cue);

    Ok(SystemState {
        soc: ensure_finite(STAGE, "soc", soc)?,
        doc: ensure_finite(STAGE, "doc", doc)?,
        mic: ensure_finite(STAGE, "mic", mic)?,
        enz: ensure_finite(STAGE, "enz", enz)?,
        co2: ensure_finite(STAGE, "co2", co2)?,
        temp: state.temp,
    })
}
