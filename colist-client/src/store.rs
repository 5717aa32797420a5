//! The reducer contract and the store that drives it.
//!
//! A [`Reducer`] is the per-variant capability set: how to reduce, how to
//! commit, and whether and under which event name to push state to peers.
//! [`Store`] owns the state and does the rest the same way for every variant:
//!
//! 1. `reduce(state, action)` → candidate state (+ queued outbound events).
//! 2. Candidate equal to the current state → nothing changes.
//! 3. Otherwise `commit` it; a commit may settle on something else (the list
//!    variant merges through its replica). Committed equal to the current
//!    state → nothing changes.
//! 4. Otherwise replace the state, notify local listeners (no payload), and,
//!    for remote-notifying variants, send the whole state under the variant's
//!    event name.
//! 5. Send the outbound events queued by `reduce`.

use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;
use serde_json::Value;

use colist_core::ClientEvent;

use crate::action::Action;
use crate::dispatcher::Dispatcher;
use crate::error::ClientError;
use crate::link::PeerLink;

/// Side channel for protocol events a reduction wants sent.
#[derive(Debug, Default)]
pub struct ReduceContext {
    outbound: Vec<ClientEvent>,
}

impl ReduceContext {
    pub fn emit(&mut self, event: ClientEvent) {
        self.outbound.push(event);
    }
}

pub trait Reducer {
    type State: Clone + PartialEq + Serialize;

    fn initial_state(&self) -> Self::State;

    fn reduce(
        &self,
        state: &Self::State,
        action: &Action,
        ctx: &mut ReduceContext,
    ) -> Result<Self::State, ClientError>;

    /// Make a changed state durable. Returns the state actually committed.
    fn commit(
        &self,
        _previous: &Self::State,
        next: Self::State,
    ) -> Result<Self::State, ClientError> {
        Ok(next)
    }

    fn notify_remote_on_change(&self) -> bool {
        false
    }

    /// Event name the whole state is sent under when it changes.
    fn remote_event_name(&self) -> Option<&'static str> {
        None
    }
}

type Listener = Rc<dyn Fn()>;

pub struct Store<R: Reducer> {
    reducer: R,
    state: RefCell<R::State>,
    listeners: RefCell<Vec<Listener>>,
    link: Rc<dyn PeerLink>,
}

impl<R: Reducer> Store<R> {
    pub fn new(reducer: R, link: Rc<dyn PeerLink>) -> Self {
        let state = reducer.initial_state();
        Self {
            reducer,
            state: RefCell::new(state),
            listeners: RefCell::new(Vec::new()),
            link,
        }
    }

    pub fn reducer(&self) -> &R {
        &self.reducer
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> R::State {
        self.state.borrow().clone()
    }

    pub fn with_state<T>(&self, f: impl FnOnce(&R::State) -> T) -> T {
        f(&self.state.borrow())
    }

    /// Register a change listener. Listeners get no payload; they re-read
    /// [`Store::state`].
    pub fn subscribe(&self, listener: impl Fn() + 'static) {
        self.listeners.borrow_mut().push(Rc::new(listener));
    }

    /// Run one action through the reducer. Returns whether the state changed.
    pub fn handle(&self, action: &Action) -> Result<bool, ClientError> {
        let current = self.state();
        let mut ctx = ReduceContext::default();
        let reduced = self.reducer.reduce(&current, action, &mut ctx)?;

        let changed = if reduced != current {
            let committed = self.reducer.commit(&current, reduced)?;
            if committed != current {
                *self.state.borrow_mut() = committed;
                true
            } else {
                false
            }
        } else {
            false
        };

        if changed {
            self.notify_listeners();
            if self.reducer.notify_remote_on_change() {
                self.push_state()?;
            }
        }
        for event in ctx.outbound {
            self.send(event);
        }
        Ok(changed)
    }

    /// Subscribe this store to `dispatcher`.
    pub fn attach(self: &Rc<Self>, dispatcher: &Dispatcher)
    where
        R: 'static,
    {
        let store = Rc::clone(self);
        dispatcher.register(move |_, action| store.handle(action).map(|_| ()));
    }

    fn notify_listeners(&self) {
        let listeners: Vec<Listener> = self.listeners.borrow().clone();
        for listener in listeners {
            listener();
        }
    }

    fn push_state(&self) -> Result<(), ClientError> {
        let Some(name) = self.reducer.remote_event_name() else {
            return Ok(());
        };
        let data = serde_json::to_value(&*self.state.borrow())?;
        if data == Value::Null {
            return Ok(());
        }
        self.send(ClientEvent::from_parts(name, data)?);
        Ok(())
    }

    fn send(&self, event: ClientEvent) {
        let name = event.name();
        if let Err(err) = self.link.emit(event) {
            tracing::warn!(event = name, error = %err, "peer notification dropped");
        }
    }
}
