//! Storage media for list documents.
//!
//! A [`DocumentStore`] is a plain keyed get/put; it knows nothing about
//! merging. [`ReplicaStore`](crate::ReplicaStore) layers the read-merge-write
//! cycle on top.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use colist_core::{List, ListId};

use crate::error::StoreError;

/// Whole-document storage keyed by list id. `put` replaces, never patches.
pub trait DocumentStore: Send + Sync {
    fn get(&self, id: &ListId) -> Result<Option<List>, StoreError>;

    fn put(&self, list: &List) -> Result<(), StoreError>;

    /// Ids of every stored document, sorted.
    fn ids(&self) -> Result<Vec<ListId>, StoreError>;
}

/// In-process store for ephemeral peers and tests.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    docs: Mutex<HashMap<ListId, List>>,
    writes: AtomicUsize,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful `put` calls so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn get(&self, id: &ListId) -> Result<Option<List>, StoreError> {
        let docs = self
            .docs
            .lock()
            .map_err(|_| StoreError::Poisoned(id.clone()))?;
        Ok(docs.get(id).cloned())
    }

    fn put(&self, list: &List) -> Result<(), StoreError> {
        let mut docs = self
            .docs
            .lock()
            .map_err(|_| StoreError::Poisoned(list.id.clone()))?;
        docs.insert(list.id.clone(), list.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn ids(&self) -> Result<Vec<ListId>, StoreError> {
        let docs = self
            .docs
            .lock()
            .map_err(|_| StoreError::Poisoned(ListId::default()))?;
        let mut ids: Vec<ListId> = docs.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}
