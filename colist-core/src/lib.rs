//! colist core library: list model, reconciliation, wire protocol, config.
//!
//! - [`types`]: ids, timestamps, [`List`] and [`Item`]
//! - [`sanitize`]: list name and slug cleaning
//! - [`reconcile`]: the per-item last-writer-wins [`merge`]
//! - [`protocol`]: relay events and framing
//! - [`config`]: `config.yaml` settings and data layout
//! - [`error`]: [`ModelError`], [`ConfigError`]

pub mod config;
pub mod error;
pub mod protocol;
pub mod reconcile;
pub mod sanitize;
pub mod types;

pub use config::Settings;
pub use error::{ConfigError, ModelError};
pub use protocol::{ClientEvent, ConnectionId, ListRef, PeerEditing, PeerJoined, ServerEvent};
pub use reconcile::{merge, MergeOutcome, Merged};
pub use types::{Item, ItemDraft, ItemId, List, ListId, Timestamp};
