//! Trajectory statistics derived from a history log.

use serde::Serialize;

use crate::core::history::HistoryLog;
use crate::core::invariants::negative_stocks;
use crate::core::types::{SystemState, Variable};

/// Range of one variable over a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VariableRange {
    pub variable: Variable,
    pub first: f64,
    pub last: f64,
    pub min: f64,
    pub max: f64,
}

impl VariableRange {
    pub fn change(&self) -> f64 {
        self.last - self.first
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrajectorySummary {
    pub steps: usize,
    pub final_state: SystemState,
    /// One range per variable, in canonical order.
    pub ranges: Vec<VariableRange>,
    /// Change in `soc + doc + mic + enz` between the first and last entry.
    pub organic_carbon_change: f64,
    /// Steps after which at least one stock was negative.
    pub negative_stock_steps: usize,
}

impl TrajectorySummary {
    pub fn range(&self, variable: Variable) -> Option<&VariableRange> {
        self.ranges.iter().find(|range| range.variable == variable)
    }
}

/// Summarize a history, or `None` when no step has completed.
pub fn summarize(history: &HistoryLog) -> Option<TrajectorySummary> {
    let first = history.first()?;
    let last = history.last()?;

    let ranges = Variable::ALL
        .into_iter()
        .map(|variable| {
            let series = history.series(variable);
            VariableRange {
                variable,
                first: first.state.get(variable),
                last: last.state.get(variable),
                min: series.iter().copied().fold(f64::INFINITY, f64::min),
                max: series.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            }
        })
        .collect();

    let negative_stock_steps = history
        .iter()
        .filter(|entry| !negative_stocks(&entry.state).is_empty())
        .count();

    Some(TrajectorySummary {
        steps: history.len(),
        final_state: last.state,
        ranges,
        organic_carbon_change: last.state.organic_carbon() - first.state.organic_carbon(),
        negative_stock_steps,
    })
}
