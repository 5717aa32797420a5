//! colist client: the peer side of list synchronization.
//!
//! Actions enter through a [`Dispatcher`], which delivers them in one total
//! order to every registered [`Store`]. Each store runs its [`Reducer`],
//! commits changed state (the list variant through the local
//! [`colist_store::ReplicaStore`]), and pushes changes over a [`PeerLink`].
//! [`Peer`] wires the two standard stores together.

pub mod action;
pub mod dispatcher;
pub mod error;
pub mod link;
pub mod list;
pub mod peer;
pub mod session;
pub mod store;

pub use action::Action;
pub use dispatcher::Dispatcher;
pub use error::ClientError;
pub use link::{NullLink, PeerLink, RecordingLink};
pub use list::ListReducer;
pub use peer::Peer;
pub use session::{SessionReducer, SessionState};
pub use store::{ReduceContext, Reducer, Store};
