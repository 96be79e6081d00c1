//! Reading result batches from JSON files.

use std::io::ErrorKind;
use std::path::Path;

use crate::domain::{AuditError, Batch, Record, Result};
use crate::obs;

/// Read a JSON array of records from `path`.
///
/// Fails with [`AuditError::InputNotFound`] when the file does not exist and
/// [`AuditError::Parse`] when the content is not a JSON array of records.
pub fn load_batch(path: &Path) -> Result<Batch> {
    let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => AuditError::InputNotFound {
            path: path.to_path_buf(),
        },
        _ => AuditError::Io(e),
    })?;

    let records: Vec<Record> = serde_json::from_str(&content).map_err(|source| AuditError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    obs::emit_batch_loaded(path, records.len());
    if records.is_empty() {
        tracing::warn!(path = %path.display(), "batch contains no records");
    }
    Ok(Batch::new(records))
}

/// Like [`load_batch`], but a missing file yields `Ok(None)`.
pub fn load_optional_batch(path: &Path) -> Result<Option<Batch>> {
    match load_batch(path) {
        Ok(batch) => Ok(Some(batch)),
        Err(e) if e.is_not_found() => {
            obs::emit_optional_input_missing(path);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}
