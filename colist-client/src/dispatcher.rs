//! Serialized FIFO action dispatch.
//!
//! `dispatch` appends to the queue and drains it unless a drain is already
//! running further up the stack. A subscriber that dispatches while an action
//! is being delivered only enqueues; its action is delivered after the current
//! one has reached every subscriber. The result is one total order of actions
//! observed identically by all subscribers.
//!
//! A subscriber returning `Err` is logged and the drain continues with the
//! next subscriber; one failing store never strands the rest of the queue.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use crate::action::Action;
use crate::error::ClientError;

type Subscriber = Rc<dyn Fn(&Dispatcher, &Action) -> Result<(), ClientError>>;

/// One per running client. Not `Send`: the client is single-threaded.
#[derive(Default)]
pub struct Dispatcher {
    subscribers: RefCell<Vec<Subscriber>>,
    queue: RefCell<VecDeque<Action>>,
    draining: Cell<bool>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a subscriber; it sees every action dispatched from now on, in
    /// registration order relative to the other subscribers.
    pub fn register<F>(&self, callback: F)
    where
        F: Fn(&Dispatcher, &Action) -> Result<(), ClientError> + 'static,
    {
        self.subscribers.borrow_mut().push(Rc::new(callback));
    }

    pub fn dispatch(&self, action: Action) {
        tracing::debug!(action = action.kind(), "dispatch");
        self.queue.borrow_mut().push_back(action);
        if self.draining.get() {
            return;
        }

        let _drain = DrainGuard::start(&self.draining);
        loop {
            let next = self.queue.borrow_mut().pop_front();
            let Some(action) = next else { break };

            // Snapshot so a subscriber may register another without a
            // conflicting borrow; the newcomer starts with the next action.
            let subscribers: Vec<Subscriber> = self.subscribers.borrow().clone();
            for (index, subscriber) in subscribers.iter().enumerate() {
                if let Err(err) = subscriber(self, &action) {
                    tracing::error!(
                        action = action.kind(),
                        subscriber = index,
                        error = %err,
                        "subscriber failed; continuing drain",
                    );
                }
            }
        }
        tracing::trace!("all dispatches sent");
    }

    pub fn is_dispatching(&self) -> bool {
        self.draining.get()
    }

    /// Actions queued behind the one currently being delivered.
    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }
}

/// Clears the in-flight flag even if a subscriber panics.
struct DrainGuard<'a>(&'a Cell<bool>);

impl<'a> DrainGuard<'a> {
    fn start(flag: &'a Cell<bool>) -> Self {
        flag.set(true);
        Self(flag)
    }
}

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use colist_core::ListId;

    fn marker(name: &str) -> Action {
        Action::ListNotFound {
            list_id: ListId::from(name),
        }
    }

    fn name_of(action: &Action) -> String {
        match action {
            Action::ListNotFound { list_id } => list_id.0.clone(),
            other => other.kind().to_string(),
        }
    }

    #[test]
    fn nested_dispatch_runs_after_current_action_reaches_everyone() {
        let dispatcher = Dispatcher::new();
        let seen: Rc<RefCell<Vec<String>>> = Rc::default();

        for label in ["first", "second"] {
            let seen = seen.clone();
            dispatcher.register(move |dispatcher, action| {
                let name = name_of(action);
                if label == "first" && name == "X" {
                    dispatcher.dispatch(marker("Z"));
                }
                seen.borrow_mut().push(format!("{label}:{name}"));
                Ok(())
            });
        }

        dispatcher.dispatch(marker("X"));
        dispatcher.dispatch(marker("Y"));

        assert_eq!(
            *seen.borrow(),
            vec![
                "first:X", "second:X", "first:Z", "second:Z", "first:Y", "second:Y"
            ]
        );
        assert!(!dispatcher.is_dispatching());
        assert_eq!(dispatcher.pending(), 0);
    }

    #[test]
    fn failing_subscriber_does_not_stall_the_queue() {
        let dispatcher = Dispatcher::new();
        let delivered: Rc<RefCell<Vec<String>>> = Rc::default();

        dispatcher.register(|_, action| match name_of(action).as_str() {
            "bad" => Err(ClientError::NoListLoaded),
            _ => Ok(()),
        });
        {
            let delivered = delivered.clone();
            dispatcher.register(move |_, action| {
                delivered.borrow_mut().push(name_of(action));
                Ok(())
            });
        }

        dispatcher.dispatch(marker("bad"));
        dispatcher.dispatch(marker("good"));

        assert_eq!(*delivered.borrow(), vec!["bad", "good"]);
    }

    #[test]
    fn subscribers_run_in_registration_order() {
        let dispatcher = Dispatcher::new();
        let order: Rc<RefCell<Vec<usize>>> = Rc::default();
        for n in 0..4 {
            let order = order.clone();
            dispatcher.register(move |_, _| {
                order.borrow_mut().push(n);
                Ok(())
            });
        }
        dispatcher.dispatch(Action::ListHideLoadingStatus);
        assert_eq!(*order.borrow(), vec![0, 1, 2, 3]);
    }
}
