//! Development-time tracing for the simulator.
//!
//! Tracing output goes to stderr and is controlled by `RUST_LOG`. It is never
//! part of the exported history; diagnostics that belong in the product are
//! recorded on history entries instead.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber.
///
/// Reads `RUST_LOG`. Defaults to `warn` if unset, which still surfaces
/// negative-stock warnings.
/// Output: stderr, compact format.
///
/// # Example
/// ```bash
/// RUST_LOG=soilcarb=debug soilcarb run --steps 10
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
