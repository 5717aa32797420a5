//! # colist-store
//!
//! Replica storage for list documents.
//!
//! [`ReplicaStore::apply_mutation`] is the only write path: it reconciles a
//! submitted list against the stored copy and persists the merged result.
//! The medium is pluggable through [`DocumentStore`]: [`FileDocumentStore`]
//! for the central and per-peer replicas, [`MemoryDocumentStore`] for
//! ephemeral peers and tests.

pub mod document;
pub mod error;
pub mod file_store;
pub mod replica;

pub use document::{DocumentStore, MemoryDocumentStore};
pub use error::StoreError;
pub use file_store::FileDocumentStore;
pub use replica::{Commit, ReplicaStore};
