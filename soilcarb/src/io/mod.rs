//! I/O helpers for scenarios and exported histories.

pub mod config;
pub mod error;
pub mod forcing;
pub mod history_store;
