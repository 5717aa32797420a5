//! Wire protocol shared by the relay and its peers.
//!
//! Newline-delimited JSON; one frame per line:
//!
//! ```text
//! {"event":"list-mutated","data":{"id":"...","name":"...","items":{...},"updated":1700000000000}}
//! ```
//!
//! Event names are the contract; field names inside payloads are camel-case
//! (`listID`, `itemID`).

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{ItemId, List, ListId};

pub const JOIN_ROOM: &str = "join-room";
pub const INITIAL_LOAD: &str = "initial-load";
pub const ITEM_PEER_EDITING: &str = "item-peer-editing";
pub const LIST_MUTATED: &str = "list-mutated";
pub const PEER_JOINED_ROOM: &str = "peer-joined-room";
pub const LIST_LOADED: &str = "list-loaded";
pub const LIST_NOT_FOUND: &str = "list-not-found";
pub const LIST_PEER_UPDATED: &str = "list-peer-updated";

/// Relay-assigned identity of one live connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ConnectionId(pub u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn#{}", self.0)
    }
}

/// `{listID}` payload of `initial-load` and `list-not-found`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListRef {
    #[serde(rename = "listID", default)]
    pub list_id: ListId,
}

/// `{listID, itemID}` payload of `item-peer-editing`. `itemID: null` releases
/// the edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerEditing {
    #[serde(rename = "listID", default)]
    pub list_id: ListId,
    #[serde(rename = "itemID", default)]
    pub item_id: Option<ItemId>,
}

/// `{id}` payload of `peer-joined-room`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerJoined {
    pub id: ConnectionId,
}

/// Events a peer sends to the relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientEvent {
    JoinRoom(ListId),
    InitialLoad(ListRef),
    ItemPeerEditing(PeerEditing),
    ListMutated(List),
}

impl ClientEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ClientEvent::JoinRoom(_) => JOIN_ROOM,
            ClientEvent::InitialLoad(_) => INITIAL_LOAD,
            ClientEvent::ItemPeerEditing(_) => ITEM_PEER_EDITING,
            ClientEvent::ListMutated(_) => LIST_MUTATED,
        }
    }

    /// Build an event from a wire name and an already-serialized payload.
    pub fn from_parts(event: &str, data: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(serde_json::json!({ "event": event, "data": data }))
    }
}

/// Events the relay sends to peers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerEvent {
    PeerJoinedRoom(PeerJoined),
    ListLoaded(List),
    ListNotFound(ListRef),
    ItemPeerEditing(PeerEditing),
    ListPeerUpdated(List),
}

impl ServerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::PeerJoinedRoom(_) => PEER_JOINED_ROOM,
            ServerEvent::ListLoaded(_) => LIST_LOADED,
            ServerEvent::ListNotFound(_) => LIST_NOT_FOUND,
            ServerEvent::ItemPeerEditing(_) => ITEM_PEER_EDITING,
            ServerEvent::ListPeerUpdated(_) => LIST_PEER_UPDATED,
        }
    }
}

/// Serialize one frame, newline included.
pub fn encode_frame<T: Serialize>(event: &T) -> Result<String, serde_json::Error> {
    let mut line = serde_json::to_string(event)?;
    line.push('\n');
    Ok(line)
}
