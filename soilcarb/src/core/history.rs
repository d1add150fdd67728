//! Append-only trajectory of completed steps.

use serde::{Deserialize, Serialize};

use crate::core::intermediate::IntermediateVariables;
use crate::core::types::{SystemState, Variable};

/// Snapshot of the state after one completed step.
///
/// Entries are values: later mutation of the runner's state never reaches an
/// entry already in the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Step number (1-indexed).
    pub step: u64,
    #[serde(flatten)]
    pub state: SystemState,
    /// Fluxes computed during this step, when diagnostics are recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<IntermediateVariables>,
}

/// Ordered sequence of [`HistoryEntry`], one per completed step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryLog {
    entries: Vec<HistoryEntry>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a log from stored entries, checking that steps run `1..=n`.
    pub fn from_entries(entries: Vec<HistoryEntry>) -> Result<Self, String> {
        for (index, entry) in entries.iter().enumerate() {
            let expected = index as u64 + 1;
            if entry.step != expected {
                return Err(format!(
                    "history entry {index} has step {} (expected {expected})",
                    entry.step
                ));
            }
        }
        Ok(Self { entries })
    }

    /// Append an entry and return a reference to it.
    pub fn append(&mut self, entry: HistoryEntry) -> &HistoryEntry {
        self.entries.push(entry);
        &self.entries[self.entries.len() - 1]
    }

    /// Step number the next appended entry should carry.
    pub fn next_step(&self) -> u64 {
        self.entries.len() as u64 + 1
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn first(&self) -> Option<&HistoryEntry> {
        self.entries.first()
    }

    pub fn last(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, HistoryEntry> {
        self.entries.iter()
    }

    /// Values of one variable across the run, in step order.
    pub fn series(&self, variable: Variable) -> Vec<f64> {
        self.entries
            .iter()
            .map(|entry| entry.state.get(variable))
            .collect()
    }
}

impl<'a> IntoIterator for &'a HistoryLog {
    type Item = &'a HistoryEntry;
    type IntoIter = std::slice::Iter<'a, HistoryEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
