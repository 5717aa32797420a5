//! Error types for colist-client.

use thiserror::Error;

use colist_core::{ItemId, ModelError};
use colist_store::StoreError;

/// Failures scoped to a single dispatched action.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid input: {0}")]
    Invalid(#[from] ModelError),

    #[error("local replica error: {0}")]
    Store(#[from] StoreError),

    #[error("state serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// An item action arrived before any list was loaded.
    #[error("no list is loaded")]
    NoListLoaded,

    /// `app-initialize` carried neither a list id nor a name for a new list.
    #[error("no list found, and no new list name provided")]
    NoListToOpen,

    #[error("no item {0} in the current list")]
    UnknownItem(ItemId),

    /// The transport to the relay failed.
    #[error("peer link error: {0}")]
    Link(String),
}
