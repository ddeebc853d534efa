//! Error types for sheetsync-engine.

use std::path::PathBuf;

use thiserror::Error;

use sheetsync_core::StoreError;
use sheetsync_sheets::SheetsError;

/// All errors that can arise from sync-cycle operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// An error from the order store.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// An error from the spreadsheet API.
    #[error("sheets error: {0}")]
    Sheets(#[from] SheetsError),

    /// An I/O error, with annotated path for context (lock files).
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error (lock file payload).
    #[error("lock file JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience constructor for [`EngineError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> EngineError {
    EngineError::Io {
        path: path.into(),
        source,
    }
}
