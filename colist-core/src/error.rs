//! Error types for colist-core.

use std::path::PathBuf;

use thiserror::Error;

/// Validation failures raised while constructing or accepting list documents.
///
/// Construction never coerces an invalid value into a valid one; the caller
/// gets one of these instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// Item text was empty (or whitespace only).
    #[error("empty items are not allowed")]
    EmptyItemText,

    /// The list name was empty after sanitizing.
    #[error("lists require a name")]
    EmptyListName,

    /// A submitted document carried no list id.
    #[error("list document is missing its id")]
    MissingListId,

    /// An item inside a submitted document carried no id.
    #[error("item in list {list_id} is missing its id")]
    MissingItemId { list_id: String },
}

/// Errors from loading or saving [`Settings`](crate::config::Settings).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure while reading the config file.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML serialization error (write path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// YAML parse error on load, with the offending path.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The file parsed but holds a value the peers cannot use.
    #[error("invalid config at {path}: {reason}")]
    Invalid { path: PathBuf, reason: String },

    /// An environment override held a value of the wrong shape.
    #[error("invalid value for {var}: {value}")]
    InvalidEnv { var: &'static str, value: String },

    /// `dirs::home_dir()` returned `None`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ConfigError {
    ConfigError::Io {
        path: path.into(),
        source,
    }
}
