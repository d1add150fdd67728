//! Stable exit codes for soilcarb CLI commands.

/// Command succeeded.
pub const OK: i32 = 0;
/// Invalid scenario, missing initial state, unreadable input or other errors.
pub const INVALID: i32 = 1;
/// A kinetic process or state update left its numeric domain.
pub const DOMAIN: i32 = 2;
/// The history could not be written or verified.
pub const EXPORT: i32 = 3;
