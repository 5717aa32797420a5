//! Outbound transport from a peer to the relay.

use std::cell::RefCell;

use colist_core::ClientEvent;

use crate::error::ClientError;

/// Sends protocol events towards the relay. Delivery is best-effort.
pub trait PeerLink {
    fn emit(&self, event: ClientEvent) -> Result<(), ClientError>;
}

/// Drops every event; for peers working offline.
#[derive(Debug, Default)]
pub struct NullLink;

impl PeerLink for NullLink {
    fn emit(&self, event: ClientEvent) -> Result<(), ClientError> {
        tracing::debug!(event = event.name(), "offline; event dropped");
        Ok(())
    }
}

/// Keeps every event in memory, in send order.
#[derive(Debug, Default)]
pub struct RecordingLink {
    sent: RefCell<Vec<ClientEvent>>,
}

impl RecordingLink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain everything recorded so far.
    pub fn take(&self) -> Vec<ClientEvent> {
        std::mem::take(&mut *self.sent.borrow_mut())
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.sent.borrow().iter().map(ClientEvent::name).collect()
    }
}

impl PeerLink for RecordingLink {
    fn emit(&self, event: ClientEvent) -> Result<(), ClientError> {
        self.sent.borrow_mut().push(event);
        Ok(())
    }
}
