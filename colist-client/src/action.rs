//! Actions accepted by the dispatcher.

use serde::{Deserialize, Serialize};

use colist_core::{ItemDraft, ItemId, List, ListId};

/// A tagged mutation or notification record.
///
/// Editing actions use `item_id: None` for "editing released".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Action {
    /// Open `list_id` from the local replica (or the relay), or create a new
    /// list named `list_name`.
    AppInitialize {
        list_id: Option<ListId>,
        list_name: Option<String>,
    },
    /// The collaborator finished showing the list for the first time.
    ListHideLoadingStatus,
    ItemUserIsEditing {
        list_id: ListId,
        item_id: Option<ItemId>,
    },
    ItemPeerIsEditing {
        item_id: Option<ItemId>,
    },
    ItemSave(ItemDraft),
    ItemMarkComplete {
        item_id: ItemId,
    },
    ItemDelete {
        item_id: ItemId,
    },
    /// A document from the relay: a peer's merged update or an initial load.
    ListPeerUpdated(List),
    ListNotFound {
        list_id: ListId,
    },
}

impl Action {
    /// The `type` discriminant.
    pub fn kind(&self) -> &'static str {
        match self {
            Action::AppInitialize { .. } => "app-initialize",
            Action::ListHideLoadingStatus => "list-hide-loading-status",
            Action::ItemUserIsEditing { .. } => "item-user-is-editing",
            Action::ItemPeerIsEditing { .. } => "item-peer-is-editing",
            Action::ItemSave(_) => "item-save",
            Action::ItemMarkComplete { .. } => "item-mark-complete",
            Action::ItemDelete { .. } => "item-delete",
            Action::ListPeerUpdated(_) => "list-peer-updated",
            Action::ListNotFound { .. } => "list-not-found",
        }
    }
}
