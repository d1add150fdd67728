//! Error types for history export.

use std::path::PathBuf;

use thiserror::Error;

/// Failures while writing a history to its sink.
///
/// Every variant leaves the in-memory history untouched, so an export can be
/// retried against the same or a different destination.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The history could not be encoded.
    #[error("failed to serialize history: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The destination could not be written.
    #[error("failed to write history to {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The write reported success but the file could not be confirmed.
    #[error("history written to {} could not be verified: {reason}", .path.display())]
    Verification { path: PathBuf, reason: String },
}
