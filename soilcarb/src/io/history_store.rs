//! History export and load helpers with write verification.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use jsonschema::validator_for;
use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::core::history::{HistoryEntry, HistoryLog};
use crate::io::error::ExportError;

const HISTORY_SCHEMA: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../schemas/history/v1.schema.json"
));

/// Confirmation of a verified export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReceipt {
    pub path: PathBuf,
    pub entries: usize,
    pub bytes: usize,
}

/// Write `history` to `path` as a pretty JSON array and verify the result.
///
/// The file is replaced atomically (temp file + rename). A failed write is
/// reported as [`ExportError::Write`]; a destination that cannot be read back
/// with the expected number of records is [`ExportError::Verification`].
#[instrument(skip_all, fields(path = %path.display(), entries = history.len()))]
pub fn export_history(path: &Path, history: &HistoryLog) -> Result<ExportReceipt, ExportError> {
    let mut buf = serde_json::to_string_pretty(history)?;
    buf.push('\n');
    write_atomic(path, &buf)?;
    verify_export(path, history.len())?;
    info!(bytes = buf.len(), "history exported");
    Ok(ExportReceipt {
        path: path.to_path_buf(),
        entries: history.len(),
        bytes: buf.len(),
    })
}

/// Confirm that `path` is a readable file holding `expected_entries` records.
pub fn verify_export(path: &Path, expected_entries: usize) -> Result<(), ExportError> {
    let fail = |reason: String| ExportError::Verification {
        path: path.to_path_buf(),
        reason,
    };
    let metadata = fs::metadata(path).map_err(|err| fail(format!("stat failed: {err}")))?;
    if !metadata.is_file() {
        return Err(fail("destination is not a regular file".to_string()));
    }
    let contents =
        fs::read_to_string(path).map_err(|err| fail(format!("read back failed: {err}")))?;
    let records: Vec<Value> =
        serde_json::from_str(&contents).map_err(|err| fail(format!("parse back failed: {err}")))?;
    if records.len() != expected_entries {
        return Err(fail(format!(
            "expected {expected_entries} records, found {}",
            records.len()
        )));
    }
    debug!(records = records.len(), "export verified");
    Ok(())
}

/// Load a history file, validating it against the v1 history schema.
pub fn load_history(path: &Path) -> Result<HistoryLog> {
    debug!(path = %path.display(), "loading history");
    let contents =
        fs::read_to_string(path).with_context(|| format!("read history {}", path.display()))?;
    let value: Value = serde_json::from_str(&contents)
        .with_context(|| format!("parse history {}", path.display()))?;
    validate_schema(&value).with_context(|| format!("validate history {}", path.display()))?;
    let entries: Vec<HistoryEntry> = serde_json::from_value(value)
        .with_context(|| format!("deserialize history {}", path.display()))?;
    HistoryLog::from_entries(entries).map_err(|err| anyhow!("invalid history: {err}"))
}

fn validate_schema(history: &Value) -> Result<()> {
    let schema: Value = serde_json::from_str(HISTORY_SCHEMA).context("parse history schema")?;
    let compiled = validator_for(&schema).map_err(|err| anyhow!("invalid schema: {}", err))?;
    let messages = compiled
        .iter_errors(history)
        .map(|err| err.to_string())
        .collect::<Vec<_>>();
    if !messages.is_empty() {
        return Err(anyhow!(
            "history schema validation failed: {}",
            messages.join("; ")
        ));
    }
    Ok(())
}

fn write_atomic(path: &Path, contents: &str) -> Result<(), ExportError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_error(path))?;
    }
    let tmp_path = path.with_extension("json.tmp");
    if let Err(err) = fs::write(&tmp_path, contents) {
        let _ = fs::remove_file(&tmp_path);
        return Err(write_error(path)(err));
    }
    if let Err(err) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(write_error(path)(err));
    }
    Ok(())
}

fn write_error(path: &Path) -> impl Fn(io::Error) -> ExportError + '_ {
    move |source| ExportError::Write {
        path: path.to_path_buf(),
        source,
    }
}
