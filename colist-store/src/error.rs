//! Error types for colist-store.

use std::path::PathBuf;

use thiserror::Error;

use colist_core::{ListId, ModelError};

/// All errors that can arise from replica reads and writes.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A stored document could not be parsed.
    #[error("corrupt list document at {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// JSON serialization error (write path).
    #[error("list document JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A submission failed validation before reaching the merge.
    #[error("invalid list document: {0}")]
    Invalid(#[from] ModelError),

    /// A lock guarding a document was poisoned by a panicking writer.
    #[error("replica lock poisoned for list {0}")]
    Poisoned(ListId),
}

/// Convenience constructor for [`StoreError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.into(),
        source,
    }
}
