//! Session state: loading flag and who is editing what.

use serde::Serialize;

use colist_core::{ClientEvent, ItemId, PeerEditing};

use crate::action::Action;
use crate::error::ClientError;
use crate::store::{ReduceContext, Reducer};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionState {
    pub list_loaded: bool,
    /// Item the local user is editing.
    pub user_editing: Option<ItemId>,
    /// Item a remote peer reported editing.
    pub peer_editing: Option<ItemId>,
}

impl SessionState {
    pub fn is_user_editing(&self, item: &ItemId) -> bool {
        self.user_editing.as_ref() == Some(item)
    }

    pub fn is_peer_editing(&self, item: &ItemId) -> bool {
        self.peer_editing.as_ref() == Some(item)
    }
}

/// Local-only variant: never pushes its state to peers, but starting or
/// releasing a local edit announces it with `item-peer-editing`.
#[derive(Debug, Default)]
pub struct SessionReducer;

impl Reducer for SessionReducer {
    type State = SessionState;

    fn initial_state(&self) -> SessionState {
        SessionState::default()
    }

    fn reduce(
        &self,
        state: &SessionState,
        action: &Action,
        ctx: &mut ReduceContext,
    ) -> Result<SessionState, ClientError> {
        let mut next = state.clone();
        match action {
            Action::ListHideLoadingStatus => next.list_loaded = true,
            Action::ItemUserIsEditing { list_id, item_id } => {
                next.user_editing = item_id.clone();
                ctx.emit(ClientEvent::ItemPeerEditing(PeerEditing {
                    list_id: list_id.clone(),
                    item_id: item_id.clone(),
                }));
            }
            Action::ItemPeerIsEditing { item_id } => next.peer_editing = item_id.clone(),
            _ => {}
        }
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::RecordingLink;
    use crate::store::Store;
    use colist_core::ListId;
    use std::rc::Rc;

    #[test]
    fn local_edit_is_tracked_and_announced() {
        let link = Rc::new(RecordingLink::new());
        let store = Store::new(SessionReducer, link.clone());

        let changed = store
            .handle(&Action::ItemUserIsEditing {
                list_id: ListId::from("L1"),
                item_id: Some(ItemId::from("a")),
            })
            .expect("handle");

        assert!(changed);
        assert!(store.state().is_user_editing(&ItemId::from("a")));
        assert_eq!(
            link.take(),
            vec![ClientEvent::ItemPeerEditing(PeerEditing {
                list_id: ListId::from("L1"),
                item_id: Some(ItemId::from("a")),
            })]
        );
    }

    #[test]
    fn peer_edit_changes_state_without_sending() {
        let link = Rc::new(RecordingLink::new());
        let store = Store::new(SessionReducer, link.clone());

        store
            .handle(&Action::ItemPeerIsEditing {
                item_id: Some(ItemId::from("b")),
            })
            .expect("handle");
        assert!(store.state().is_peer_editing(&ItemId::from("b")));

        store
            .handle(&Action::ItemPeerIsEditing { item_id: None })
            .expect("handle");
        assert!(!store.state().is_peer_editing(&ItemId::from("b")));
        assert!(link.take().is_empty());
    }

    #[test]
    fn repeated_loading_flag_notifies_once() {
        let store = Store::new(SessionReducer, Rc::new(RecordingLink::new()));
        let hits = Rc::new(std::cell::Cell::new(0));
        {
            let hits = hits.clone();
            store.subscribe(move || hits.set(hits.get() + 1));
        }

        assert!(store.handle(&Action::ListHideLoadingStatus).expect("first"));
        assert!(!store.handle(&Action::ListHideLoadingStatus).expect("second"));
        assert_eq!(hits.get(), 1);
        assert!(store.state().list_loaded);
    }
}
