use std::path::PathBuf;

use thiserror::Error;

/// Error surface for the relay runtime and the blocking peer connection.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config error: {0}")]
    Config(#[from] colist_core::ConfigError),

    #[error("store error: {0}")]
    Store(#[from] colist_store::StoreError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("channel closed: {0}")]
    ChannelClosed(&'static str),

    #[error("relay protocol error: {0}")]
    Protocol(String),

    #[error("relay is not running at {addr}")]
    RelayNotRunning { addr: String },
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> RelayError {
    RelayError::Io {
        path: path.into(),
        source,
    }
}
