//! Room membership and fan-out.
//!
//! A room is named by a list id. Each live connection registers an outbound
//! queue; the connection's writer task drains it onto the socket. Delivery is
//! fire-and-forget: a closed queue is skipped, never retried.

use std::collections::{BTreeSet, HashMap};

use tokio::sync::{mpsc, RwLock};

use colist_core::{ConnectionId, ListId, ServerEvent};

pub type Outbox = mpsc::UnboundedSender<ServerEvent>;

#[derive(Default)]
struct Rooms {
    outboxes: HashMap<ConnectionId, Outbox>,
    members: HashMap<ListId, BTreeSet<ConnectionId>>,
}

#[derive(Default)]
pub struct RoomRelay {
    inner: RwLock<Rooms>,
}

impl RoomRelay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `conn` reachable. Until it joins a room it only receives direct
    /// replies.
    pub async fn register(&self, conn: ConnectionId, outbox: Outbox) {
        self.inner.write().await.outboxes.insert(conn, outbox);
    }

    /// Add `conn` to the room for `list`. Joining twice is a no-op; returns
    /// whether the connection was newly added.
    pub async fn join(&self, conn: ConnectionId, list: &ListId) -> bool {
        let mut rooms = self.inner.write().await;
        rooms.members.entry(list.clone()).or_default().insert(conn)
    }

    /// Forget `conn` entirely: its queue and every room membership.
    pub async fn leave_all(&self, conn: ConnectionId) {
        let mut rooms = self.inner.write().await;
        rooms.outboxes.remove(&conn);
        rooms.members.retain(|_, members| {
            members.remove(&conn);
            !members.is_empty()
        });
    }

    pub async fn members(&self, list: &ListId) -> Vec<ConnectionId> {
        let rooms = self.inner.read().await;
        rooms
            .members
            .get(list)
            .map(|members| members.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Deliver `event` to one connection. Returns whether it was queued.
    pub async fn send_to(&self, conn: ConnectionId, event: ServerEvent) -> bool {
        let rooms = self.inner.read().await;
        match rooms.outboxes.get(&conn) {
            Some(outbox) => outbox.send(event).is_ok(),
            None => false,
        }
    }

    /// Deliver `event` to every member of the room for `list` except
    /// `exclude`. Returns how many connections it was queued for.
    pub async fn broadcast(
        &self,
        list: &ListId,
        event: ServerEvent,
        exclude: Option<ConnectionId>,
    ) -> usize {
        let rooms = self.inner.read().await;
        let Some(members) = rooms.members.get(list) else {
            return 0;
        };

        let mut delivered = 0;
        for conn in members.iter().filter(|conn| Some(**conn) != exclude) {
            let Some(outbox) = rooms.outboxes.get(conn) else {
                continue;
            };
            if outbox.send(event.clone()).is_ok() {
                delivered += 1;
            } else {
                tracing::debug!(%conn, event = event.name(), "dropped; connection closed");
            }
        }
        delivered
    }
}
