//! Kinetic processes of the enzyme decomposition model.
//!
//! Each process is a plain value holding immutable parameters and a pure
//! `compute` operation. The runner invokes them in a fixed order (catalysis,
//! uptake, carbon use, enzyme turnover, death) and merges their named outputs
//! into the step's intermediate variables.
//!
//! Shared rate laws live here:
//!
//! - **Arrhenius**: `rate_0 * exp(-ea / (gas_const * (temp + 273)))`, with the
//!   Celsius offset fixed at 273 as calibrated.
//! - **Linear temperature sensitivity**: `slope * temp + intercept`.
//! - **Michaelis–Menten**: `v_max * pool * (substrate / (km + substrate))`,
//!   rejected when the denominator is zero or the result is not finite.

pub mod carbon_use;
pub mod catalysis;
pub mod death;
pub mod enzyme;
pub mod uptake;

pub use carbon_use::{CarbonUse, CarbonUseOutput};
pub use catalysis::{CatalysisOutput, EnzymeCatalysis};
pub use death::{DeathOutput, MicDeath};
pub use enzyme::{EnzymeProductionDecay, EnzymeTurnoverOutput};
pub use uptake::{Uptake, UptakeOutput};

use crate::core::error::SimulationError;
use crate::core::intermediate::{IntermediateVariables, IvKey};
use crate::core::types::SystemState;

/// Celsius to absolute temperature offset used by the Arrhenius terms.
pub const KELVIN_OFFSET: f64 = 273.0;

/// Universal gas constant in kJ mol⁻¹ K⁻¹.
pub const GAS_CONST: f64 = 0.008314;


/// A kinetic sub-process: immutable parameters plus a pure computation.
pub trait KineticProcess {
    type Output: ProcessOutput;

    /// Stable identifier used in logs and error reports.
    const NAME: &'static str;

    /// Compute this process's outputs from the current state and the
    /// intermediate variables already produced earlier in the step.
    fn compute(
        &self,
        state: &SystemState,
        iv: &IntermediateVariables,
    ) -> Result<Self::Output, SimulationError>;
}

/// Explicit, named result of a kinetic process.
pub trait ProcessOutput {
    /// Named values in the order they should be merged.
    fn entries(&self) -> Vec<(IvKey, f64)>;
}

pub fn arrhenius(rate_0: f64, ea: f64, gas_const: f64, temp: f64) -> f64 {
    rate_0 * (-ea / (gas_const * (temp + KELVIN_OFFSET))).exp()
}

pub fn linear(slope: f64, temp: f64, intercept: f64) -> f64 {
    slope * temp + intercept
}

/// Saturating flux `v_max * pool * (substrate / (km + substrate))`.
///
/// Degenerates to zero when `substrate == 0` and `km != 0`.
pub fn michaelis_menten(
    process: &'static str,
    operation: &'static str,
    v_max: f64,
    pool: f64,
    km: f64,
    substrate: f64,
) -> Result<f64, SimulationError> {
    let denominator = km + substrate;
    if denominator == 0.0 {
        return Err(SimulationError::Domain {
            process,
            operation,
            detail: format!("half-saturation denominator is zero (km={km}, substrate={substrate})"),
        });
    }
    ensure_finite(
        process,
        operation,
        v_max * pool * (substrate / denominator),
    )
}

/// Reject NaN and infinite results instead of propagating them silently.
pub fn ensure_finite(
    process: &'static str,
    operation: &'static str,
    value: f64,
) -> Result<f64, SimulationError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(SimulationError::Domain {
            process,
            operation,
            detail: format!("result is not finite ({value})"),
        })
    }
}
