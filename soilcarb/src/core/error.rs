//! Error types for the simulation core.
//!
//! Errors are split by where a step can fail: before any arithmetic runs
//! (missing or invalid state and forcing), or inside a rate law that hit a
//! degenerate input. In every case the runner leaves its state and history
//! untouched.

use thiserror::Error;

use crate::core::intermediate::IvKey;
use crate::core::types::Variable;

/// Errors that can occur while advancing the simulation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    /// One or more state variables were never provided.
    ///
    /// Every update equation references all six variables, so a run cannot
    /// start until the initial state is complete.
    #[error("missing state variables: {}", join_variables(.keys))]
    MissingState {
        /// The absent variables, in canonical order.
        keys: Vec<Variable>,
    },

    /// A state variable holds a non-finite value.
    #[error("invalid state variable '{key}': {value} is not finite")]
    InvalidState { key: Variable, value: f64 },

    /// A per-step forcing value is not finite.
    #[error("invalid forcing '{field}': {value} is not finite")]
    InvalidForcing { field: &'static str, value: f64 },

    /// A rate law received inputs for which it is undefined.
    #[error("{process}: {operation} is undefined ({detail})")]
    Domain {
        /// Process (or update stage) that failed.
        process: &'static str,
        /// The operation that failed, e.g. `decomp`.
        operation: &'static str,
        /// Description of the offending inputs.
        detail: String,
    },

    /// The update equations needed a value no process produced this step.
    #[error("intermediate variable '{key}' was not computed this step")]
    MissingIntermediate { key: IvKey },
}

fn join_variables(keys: &[Variable]) -> String {
    keys.iter()
        .map(|key| key.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_state_lists_every_key() {
        let err = SimulationError::MissingState {
            keys: vec![Variable::Soc, Variable::Temp],
        };
        assert_eq!(err.to_string(), "missing state variables: soc, temp");
    }

    #[test]
    fn domain_error_names_process_and_operation() {
        let err = SimulationError::Domain {
            process: "enzyme_catalysis",
            operation: "decomp",
            detail: "km + soc = 0".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "enzyme_catalysis: decomp is undefined (km + soc = 0)"
        );
    }
}
