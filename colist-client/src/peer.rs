//! One running client: a dispatcher with the session and list stores
//! registered on it, plus the mapping from relay events to actions.

use std::rc::Rc;
use std::sync::Arc;

use colist_core::{List, ServerEvent};
use colist_store::{DocumentStore, ReplicaStore};

use crate::action::Action;
use crate::dispatcher::Dispatcher;
use crate::link::PeerLink;
use crate::list::ListReducer;
use crate::session::{SessionReducer, SessionState};
use crate::store::Store;

pub struct Peer<S: DocumentStore + 'static> {
    dispatcher: Dispatcher,
    session: Rc<Store<SessionReducer>>,
    list: Rc<Store<ListReducer<S>>>,
}

impl<S: DocumentStore + 'static> Peer<S> {
    pub fn new(replica: Arc<ReplicaStore<S>>, link: Rc<dyn PeerLink>) -> Self {
        let dispatcher = Dispatcher::new();
        let session = Rc::new(Store::new(SessionReducer, link.clone()));
        let list = Rc::new(Store::new(ListReducer::new(replica), link));
        session.attach(&dispatcher);
        list.attach(&dispatcher);
        Self {
            dispatcher,
            session,
            list,
        }
    }

    /// Dispatch `action`, then mark the session loaded the first time a list
    /// is in place.
    pub fn dispatch(&self, action: Action) {
        self.dispatcher.dispatch(action);
        if self.dispatcher.is_dispatching() || self.session.with_state(|s| s.list_loaded) {
            return;
        }
        if self.list.with_state(Option::is_some) {
            self.dispatcher.dispatch(Action::ListHideLoadingStatus);
        }
    }

    /// Feed one event from the relay into the dispatcher.
    pub fn receive(&self, event: ServerEvent) {
        let action = match event {
            ServerEvent::ListLoaded(list) | ServerEvent::ListPeerUpdated(list) => {
                Action::ListPeerUpdated(list)
            }
            ServerEvent::ListNotFound(not_found) => Action::ListNotFound {
                list_id: not_found.list_id,
            },
            ServerEvent::ItemPeerEditing(editing) => Action::ItemPeerIsEditing {
                item_id: editing.item_id,
            },
            ServerEvent::PeerJoinedRoom(joined) => {
                tracing::debug!(peer = %joined.id, "peer joined room");
                return;
            }
        };
        self.dispatch(action);
    }

    pub fn list(&self) -> Option<List> {
        self.list.state()
    }

    pub fn session(&self) -> SessionState {
        self.session.state()
    }

    pub fn list_store(&self) -> &Rc<Store<ListReducer<S>>> {
        &self.list
    }

    pub fn session_store(&self) -> &Rc<Store<SessionReducer>> {
        &self.session
    }

    /// Call `listener` whenever either store changes.
    pub fn on_change(&self, listener: impl Fn() + 'static) {
        let listener = Rc::new(listener);
        let for_list = listener.clone();
        self.list.subscribe(move || for_list());
        self.session.subscribe(move || listener());
    }
}
