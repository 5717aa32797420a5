//! Durable read-merge-write around [`merge`].
//!
//! ## `apply_mutation` protocol
//!
//! 1. Validate the submission (missing ids or empty text never reach the merge).
//! 2. Take the per-list lock.
//! 3. Read the stored copy (absent on first mutation).
//! 4. Merge.
//! 5. Created / merged → replace the stored document. Stale / unchanged → no
//!    write; the stored copy is returned untouched.
//!
//! Step 2 serializes every mutation of one list id, so two submissions can
//! never both merge against the same stored copy and overwrite each other.
//! Different list ids do not contend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use colist_core::{merge, List, ListId, MergeOutcome};

use crate::document::DocumentStore;
use crate::error::StoreError;

/// What a mutation left in the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    /// The authoritative document after the mutation.
    pub list: List,
    pub outcome: MergeOutcome,
}

impl Commit {
    pub fn changed(&self) -> bool {
        self.outcome.changed()
    }
}

pub struct ReplicaStore<S> {
    store: S,
    locks: Mutex<HashMap<ListId, Arc<Mutex<()>>>>,
}

impl<S: DocumentStore> ReplicaStore<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Current authoritative copy of `id`, if any.
    pub fn load(&self, id: &ListId) -> Result<Option<List>, StoreError> {
        self.store.get(id)
    }

    /// Reconcile `submitted` against the stored copy and persist the result.
    pub fn apply_mutation(&self, submitted: List) -> Result<Commit, StoreError> {
        let submitted = submitted.validated()?;
        let id = submitted.id.clone();

        let lock = self.lock_for(&id)?;
        let _guard = lock.lock().map_err(|_| StoreError::Poisoned(id.clone()))?;

        let current = self.store.get(&id)?;
        let merged = merge(current.as_ref(), &submitted);

        if merged.changed() {
            self.store.put(&merged.list)?;
            tracing::debug!(
                "list {id} committed ({:?}, {} item(s), updated {})",
                merged.outcome,
                merged.list.items.len(),
                merged.list.updated,
            );
            return Ok(Commit {
                list: merged.list,
                outcome: merged.outcome,
            });
        }

        tracing::debug!(
            "list {id} not written ({:?}: stored {}, submitted {})",
            merged.outcome,
            current.as_ref().map(|l| l.updated.0).unwrap_or_default(),
            submitted.updated,
        );
        Ok(Commit {
            list: current.unwrap_or(merged.list),
            outcome: merged.outcome,
        })
    }

    fn lock_for(&self, id: &ListId) -> Result<Arc<Mutex<()>>, StoreError> {
        let mut locks = self
            .locks
            .lock()
            .map_err(|_| StoreError::Poisoned(id.clone()))?;
        // Drop entries no mutation is holding any more.
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        Ok(locks
            .entry(id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone())
    }
}
