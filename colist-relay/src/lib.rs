//! colist relay: room-scoped fan-out in front of the central replica.
//!
//! - [`rooms`]: connection registry and per-list broadcast
//! - [`router`]: what each inbound peer event does
//! - [`runtime`]: tokio TCP server, shutdown, tracing setup
//! - [`client`]: blocking connection used by synchronous peers

pub mod client;
mod error;
pub mod rooms;
pub mod router;
mod runtime;

pub use client::PeerConnection;
pub use error::RelayError;
pub use rooms::RoomRelay;
pub use router::{Routed, Router};
pub use runtime::{init_tracing, run, serve, start_blocking};
