//! Enzyme-driven soil carbon model.
//!
//! Simulates the exchange of carbon between soil organic carbon, dissolved
//! organic carbon, microbial biomass, extracellular enzymes and respired CO2
//! under a temperature forcing. The crate keeps a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (kinetic processes, state update,
//!   history, summaries). No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting operations (scenario files, forcing series,
//!   history export).
//!
//! [`model`] owns the per-step orchestration and [`simulate`] drives a runner
//! across a whole scenario for the CLI.

pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod model;
pub mod simulate;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
