//! Deterministic, pure logic of the simulation engine.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! values and return deterministic outputs suitable for tests.

pub mod error;
pub mod history;
pub mod intermediate;
pub mod invariants;
pub mod kinetics;
pub mod state_update;
pub mod summary;
pub mod types;
pub mod units;
