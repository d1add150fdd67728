//! Per-step intermediate variables produced by the kinetic processes.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::error::SimulationError;

/// Name of a flux or rate computed during a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IvKey {
    VMax,
    Km,
    Decomp,
    VMaxUptake,
    KmUptake,
    Assim,
    Cue,
    Eprod,
    Eloss,
    Death,
}

impl IvKey {
    pub const ALL: [IvKey; 10] = [
        IvKey::VMax,
        IvKey::Km,
        IvKey::Decomp,
        IvKey::VMaxUptake,
        IvKey::KmUptake,
        IvKey::Assim,
        IvKey::Cue,
        IvKey::Eprod,
        IvKey::Eloss,
        IvKey::Death,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            IvKey::VMax => "v_max",
            IvKey::Km => "km",
            IvKey::Decomp => "decomp",
            IvKey::VMaxUptake => "v_max_uptake",
            IvKey::KmUptake => "km_uptake",
            IvKey::Assim => "assim",
            IvKey::Cue => "cue",
            IvKey::Eprod => "eprod",
            IvKey::Eloss => "eloss",
            IvKey::Death => "death",
        }
    }
}

impl fmt::Display for IvKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mapping from flux name to value, rebuilt from scratch every step.
///
/// Later writes to the same key overwrite earlier ones. The five processes
/// produce disjoint key sets, so [`IntermediateVariables::merge`] reports any
/// overwrite it performs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IntermediateVariables {
    values: BTreeMap<IvKey, f64>,
}

impl IntermediateVariables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, returning the one it replaced.
    pub fn insert(&mut self, key: IvKey, value: f64) -> Option<f64> {
        self.values.insert(key, value)
    }

    /// Merge named outputs in order, returning keys that were overwritten.
    pub fn merge<I>(&mut self, outputs: I) -> Vec<IvKey>
    where
        I: IntoIterator<Item = (IvKey, f64)>,
    {
        let mut overwritten = Vec::new();
        for (key, value) in outputs {
            if self.insert(key, value).is_some() {
                overwritten.push(key);
            }
        }
        overwritten
    }

    pub fn get(&self, key: IvKey) -> Option<f64> {
        self.values.get(&key).copied()
    }

    /// Value for `key`, or [`SimulationError::MissingIntermediate`].
    pub fn require(&self, key: IvKey) -> Result<f64, SimulationError> {
        self.get(key)
            .ok_or(SimulationError::MissingIntermediate { key })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_reports_overwritten_keys() {
        let mut iv = IntermediateVariables::new();
        assert!(iv.merge([(IvKey::Cue, 0.3), (IvKey::Death, 0.1)]).is_empty());

        let overwritten = iv.merge([(IvKey::Cue, 0.4)]);
        assert_eq!(overwritten, vec![IvKey::Cue]);
        assert_eq!(iv.get(IvKey::Cue), Some(0.4));
        assert_eq!(iv.len(), 2);
    }

    #[test]
    fn require_reports_missing_key() {
        let iv = IntermediateVariables::new();
        assert_eq!(
            iv.require(IvKey::Assim),
            Err(SimulationError::MissingIntermediate { key: IvKey::Assim })
        );
    }

    #[test]
    fn serializes_with_snake_case_names() {
        let mut iv = IntermediateVariables::new();
        iv.insert(IvKey::VMaxUptake, 1.5);
        iv.insert(IvKey::KmUptake, 0.25);
        let json = serde_json::to_string(&iv).expect("serialize");
        assert_eq!(json, r#"{"v_max_uptake":1.5,"km_uptake":0.25}"#);
    }
}
