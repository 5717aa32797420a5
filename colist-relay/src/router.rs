//! Dispatch of inbound peer events.

use std::sync::Arc;

use colist_core::{ClientEvent, ConnectionId, List, ListId, ListRef, PeerJoined, ServerEvent};
use colist_store::{Commit, DocumentStore, ReplicaStore, StoreError};

use crate::error::RelayError;
use crate::rooms::RoomRelay;

/// What routing one event did, for logging and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Routed {
    Joined { list: ListId, newly: bool },
    Loaded { list: ListId, found: bool },
    Relayed { list: ListId, delivered: usize },
    Committed { list: ListId, delivered: usize },
    /// Stale or identical submission; nothing written or sent.
    Discarded { list: ListId },
    Ignored(&'static str),
}

pub struct Router<S> {
    rooms: Arc<RoomRelay>,
    replica: Arc<ReplicaStore<S>>,
}

impl<S> Clone for Router<S> {
    fn clone(&self) -> Self {
        Self {
            rooms: self.rooms.clone(),
            replica: self.replica.clone(),
        }
    }
}

impl<S: DocumentStore + 'static> Router<S> {
    pub fn new(rooms: Arc<RoomRelay>, replica: Arc<ReplicaStore<S>>) -> Self {
        Self { rooms, replica }
    }

    pub fn rooms(&self) -> &Arc<RoomRelay> {
        &self.rooms
    }

    pub fn replica(&self) -> &Arc<ReplicaStore<S>> {
        &self.replica
    }

    pub async fn route(
        &self,
        from: ConnectionId,
        event: ClientEvent,
    ) -> Result<Routed, RelayError> {
        match event {
            ClientEvent::JoinRoom(list) => self.join(from, list).await,
            ClientEvent::InitialLoad(ListRef { list_id }) => self.initial_load(from, list_id).await,
            ClientEvent::ItemPeerEditing(editing) => {
                if editing.list_id.is_empty() {
                    return Ok(Routed::Ignored("item-peer-editing without list id"));
                }
                let list = editing.list_id.clone();
                let delivered = self
                    .rooms
                    .broadcast(&list, ServerEvent::ItemPeerEditing(editing), Some(from))
                    .await;
                Ok(Routed::Relayed { list, delivered })
            }
            ClientEvent::ListMutated(list) => self.mutate(from, list).await,
        }
    }

    async fn join(&self, from: ConnectionId, list: ListId) -> Result<Routed, RelayError> {
        if list.is_empty() {
            return Ok(Routed::Ignored("join-room without room id"));
        }
        let newly = self.rooms.join(from, &list).await;
        tracing::info!(conn = %from, list_id = %list, newly, "joined room");
        self.rooms
            .broadcast(
                &list,
                ServerEvent::PeerJoinedRoom(PeerJoined { id: from }),
                Some(from),
            )
            .await;
        Ok(Routed::Joined { list, newly })
    }

    async fn initial_load(&self, from: ConnectionId, list: ListId) -> Result<Routed, RelayError> {
        if list.is_empty() {
            return Ok(Routed::Ignored("initial-load without list id"));
        }
        let replica = self.replica.clone();
        let id = list.clone();
        let stored = tokio::task::spawn_blocking(move || replica.load(&id))
            .await
            .map_err(|err| RelayError::Protocol(format!("load task join error: {err}")))??;

        let found = stored.is_some();
        let reply = match stored {
            Some(doc) => ServerEvent::ListLoaded(doc),
            None => ServerEvent::ListNotFound(ListRef {
                list_id: list.clone(),
            }),
        };
        tracing::debug!(conn = %from, list_id = %list, found, "initial load");
        self.rooms.send_to(from, reply).await;
        Ok(Routed::Loaded { list, found })
    }

    async fn mutate(&self, from: ConnectionId, submitted: List) -> Result<Routed, RelayError> {
        let replica = self.replica.clone();
        let committed: Result<Commit, StoreError> =
            tokio::task::spawn_blocking(move || replica.apply_mutation(submitted))
                .await
                .map_err(|err| RelayError::Protocol(format!("mutation task join error: {err}")))?;

        let commit = match committed {
            Ok(commit) => commit,
            Err(StoreError::Invalid(reason)) => {
                tracing::warn!(conn = %from, %reason, "rejected list-mutated");
                return Ok(Routed::Ignored("invalid list document"));
            }
            Err(err) => return Err(err.into()),
        };

        let list = commit.list.id.clone();
        if !commit.changed() {
            tracing::debug!(conn = %from, list_id = %list, outcome = ?commit.outcome, "no change");
            return Ok(Routed::Discarded { list });
        }

        let delivered = self
            .rooms
            .broadcast(&list, ServerEvent::ListPeerUpdated(commit.list), Some(from))
            .await;
        tracing::info!(
            conn = %from,
            list_id = %list,
            outcome = ?commit.outcome,
            delivered,
            "list committed",
        );
        Ok(Routed::Committed { list, delivered })
    }
}
