//! Error taxonomy for audit runs.

use std::path::PathBuf;

/// Errors raised while loading result sets or writing report artifacts.
#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("input not found: {}", path.display())]
    InputNotFound { path: PathBuf },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl AuditError {
    /// True when the error means the input file does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::InputNotFound { .. })
    }
}

/// Result type for audit operations.
pub type Result<T> = std::result::Result<T, AuditError>;
