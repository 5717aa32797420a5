//! The list variant: the current document, committed through the local
//! replica and pushed to peers on every change.

use std::sync::Arc;

use colist_core::protocol::LIST_MUTATED;
use colist_core::{ClientEvent, Item, List, ListId, ListRef, Timestamp};
use colist_store::{DocumentStore, ReplicaStore};

use crate::action::Action;
use crate::error::ClientError;
use crate::store::{ReduceContext, Reducer};

pub struct ListReducer<S> {
    replica: Arc<ReplicaStore<S>>,
}

impl<S: DocumentStore> ListReducer<S> {
    pub fn new(replica: Arc<ReplicaStore<S>>) -> Self {
        Self { replica }
    }

    pub fn replica(&self) -> &Arc<ReplicaStore<S>> {
        &self.replica
    }

    fn initialize(
        &self,
        state: &Option<List>,
        list_id: Option<&ListId>,
        list_name: Option<&str>,
        ctx: &mut ReduceContext,
    ) -> Result<Option<List>, ClientError> {
        let local = match list_id.filter(|id| !id.is_empty()) {
            Some(id) => self.replica.load(id)?,
            None => None,
        };

        let next = match (local, list_id, list_name) {
            (Some(list), _, _) => {
                tracing::debug!(list = %list.id, "opened from local replica");
                Some(list)
            }
            (None, Some(id), _) if !id.is_empty() => {
                tracing::debug!(list = %id, "not in local replica; asking relay");
                ctx.emit(ClientEvent::InitialLoad(ListRef {
                    list_id: id.clone(),
                }));
                ctx.emit(ClientEvent::JoinRoom(id.clone()));
                return Ok(state.clone());
            }
            (None, _, Some(name)) => Some(List::new(name)?),
            (None, _, None) => return Err(ClientError::NoListToOpen),
        };

        if let Some(list) = &next {
            ctx.emit(ClientEvent::JoinRoom(list.id.clone()));
        }
        Ok(next)
    }
}

fn loaded(state: &Option<List>) -> Result<&List, ClientError> {
    state.as_ref().ok_or(ClientError::NoListLoaded)
}

impl<S: DocumentStore> Reducer for ListReducer<S> {
    type State = Option<List>;

    fn initial_state(&self) -> Option<List> {
        None
    }

    fn reduce(
        &self,
        state: &Option<List>,
        action: &Action,
        ctx: &mut ReduceContext,
    ) -> Result<Option<List>, ClientError> {
        match action {
            Action::AppInitialize { list_id, list_name } => {
                self.initialize(state, list_id.as_ref(), list_name.as_deref(), ctx)
            }
            Action::ItemSave(draft) => {
                let list = loaded(state)?;
                let at = Timestamp::after(list.updated);
                let item = Item::from_draft(draft.clone(), at)?;
                Ok(Some(list.with_item(item, at)))
            }
            Action::ItemMarkComplete { item_id } => {
                let list = loaded(state)?;
                list.with_item_toggled(item_id, Timestamp::after(list.updated))
                    .map(Some)
                    .ok_or_else(|| ClientError::UnknownItem(item_id.clone()))
            }
            Action::ItemDelete { item_id } => {
                let list = loaded(state)?;
                list.without_item(item_id, Timestamp::after(list.updated))
                    .map(Some)
                    .ok_or_else(|| ClientError::UnknownItem(item_id.clone()))
            }
            Action::ListPeerUpdated(incoming) => {
                let incoming = incoming.clone().validated()?;
                match state {
                    Some(current) if current.id != incoming.id => {
                        tracing::debug!(
                            current = %current.id,
                            incoming = %incoming.id,
                            "update for another list ignored"
                        );
                        Ok(state.clone())
                    }
                    _ => Ok(Some(incoming)),
                }
            }
            Action::ListNotFound { list_id } => {
                tracing::warn!(list = %list_id, "relay has no such list");
                Ok(state.clone())
            }
            _ => Ok(state.clone()),
        }
    }

    /// Merge the candidate into the local replica; the stored result is what
    /// becomes visible. A stale candidate settles on the stored copy.
    fn commit(
        &self,
        _previous: &Option<List>,
        next: Option<List>,
    ) -> Result<Option<List>, ClientError> {
        let Some(list) = next else {
            return Ok(None);
        };
        let commit = self.replica.apply_mutation(list)?;
        tracing::debug!(list = %commit.list.id, outcome = ?commit.outcome, "local commit");
        Ok(Some(commit.list))
    }

    fn notify_remote_on_change(&self) -> bool {
        true
    }

    fn remote_event_name(&self) -> Option<&'static str> {
        Some(LIST_MUTATED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::RecordingLink;
    use crate::store::Store;
    use colist_core::{ItemDraft, ItemId};
    use colist_store::MemoryDocumentStore;
    use rstest::rstest;
    use std::rc::Rc;

    fn store_with(
        link: Rc<RecordingLink>,
    ) -> (Store<ListReducer<MemoryDocumentStore>>, Arc<ReplicaStore<MemoryDocumentStore>>) {
        let replica = Arc::new(ReplicaStore::new(MemoryDocumentStore::new()));
        (Store::new(ListReducer::new(replica.clone()), link), replica)
    }

    fn create(name: &str) -> Action {
        Action::AppInitialize {
            list_id: None,
            list_name: Some(name.into()),
        }
    }

    #[rstest]
    #[case::save(Action::ItemSave(ItemDraft::new("milk")))]
    #[case::toggle(Action::ItemMarkComplete { item_id: ItemId::from("a") })]
    #[case::delete(Action::ItemDelete { item_id: ItemId::from("a") })]
    fn item_actions_need_a_loaded_list(#[case] action: Action) {
        let link = Rc::new(RecordingLink::new());
        let (store, _) = store_with(link.clone());
        let err = store.handle(&action).unwrap_err();
        assert!(matches!(err, ClientError::NoListLoaded));
        assert!(store.state().is_none());
        assert!(link.take().is_empty());
    }

    #[test]
    fn initialize_without_id_or_name_fails() {
        let (store, _) = store_with(Rc::new(RecordingLink::new()));
        let err = store
            .handle(&Action::AppInitialize {
                list_id: None,
                list_name: None,
            })
            .unwrap_err();
        assert!(matches!(err, ClientError::NoListToOpen));
    }

    #[test]
    fn saved_item_is_stamped_after_the_list() {
        let (store, replica) = store_with(Rc::new(RecordingLink::new()));
        store.handle(&create("Groceries")).expect("create");
        let before = store.state().expect("list").updated;

        store
            .handle(&Action::ItemSave(ItemDraft::new("milk")))
            .expect("save");

        let list = store.state().expect("list");
        assert!(list.updated > before);
        let item = list.items.values().next().expect("item");
        assert_eq!(item.updated, list.updated);
        assert_eq!(replica.load(&list.id).expect("load"), Some(list));
    }

    #[test]
    fn toggling_unknown_item_is_an_error() {
        let (store, _) = store_with(Rc::new(RecordingLink::new()));
        store.handle(&create("Chores")).expect("create");
        let err = store
            .handle(&Action::ItemMarkComplete {
                item_id: ItemId::from("nope"),
            })
            .unwrap_err();
        assert!(matches!(err, ClientError::UnknownItem(_)));
    }

    #[test]
    fn update_for_another_list_is_ignored() {
        let link = Rc::new(RecordingLink::new());
        let (store, _) = store_with(link.clone());
        store.handle(&create("Mine")).expect("create");
        link.take();

        let mut other = List::new("Theirs").expect("list");
        other.id = ListId::from("other-list");
        other.updated = Timestamp(i64::MAX);
        let changed = store
            .handle(&Action::ListPeerUpdated(other))
            .expect("handle");

        assert!(!changed);
        assert!(link.take().is_empty());
    }
}
