//! Precondition checks run before a step touches any state.

use crate::core::error::SimulationError;
use crate::core::types::{SystemState, Variable};

/// Reject states holding NaN or infinite values.
///
/// Negative stocks are allowed (the update equations do not prevent them);
/// see [`negative_stocks`] for reporting them.
pub fn validate_state(state: &SystemState) -> Result<(), SimulationError> {
    for variable in Variable::ALL {
        let value = state.get(variable);
        if !value.is_finite() {
            return Err(SimulationError::InvalidState {
                key: variable,
                value,
            });
        }
    }
    Ok(())
}

/// Carbon stocks that have gone below zero, in canonical order.
pub fn negative_stocks(state: &SystemState) -> Vec<Variable> {
    Variable::ALL
        .into_iter()
        .filter(|variable| *variable != Variable::Temp)
        .filter(|variable| state.get(*variable) < 0.0)
        .collect()
}
