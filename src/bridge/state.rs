//! Reactive view of bridge state.
//!
//! Holds the latest snapshot in a signal, fed by a poll-loop subscription,
//! so effects and deriveds re-run when the host publishes new state.

use std::rc::Rc;

use serde_json::Value;
use spark_signals::{signal, Signal};

use super::poll::{PollLoop, Unsubscribe};

pub struct BridgeState {
    snapshot: Signal<Rc<Value>>,
    unsubscribe: Option<Unsubscribe>,
}

impl BridgeState {
    /// Start tracking; the signal holds the snapshot at subscription time.
    pub fn new(poll: &PollLoop) -> Self {
        let snapshot = signal(poll.client().get_snapshot());
        let sink = snapshot.clone();
        let unsubscribe = poll.subscribe(move |next| sink.set(Rc::clone(next)));
        Self {
            snapshot,
            unsubscribe: Some(unsubscribe),
        }
    }

    pub fn signal(&self) -> Signal<Rc<Value>> {
        self.snapshot.clone()
    }

    /// Current snapshot (tracked when read inside an effect).
    pub fn get(&self) -> Rc<Value> {
        self.snapshot.get()
    }

    /// Project part of the snapshot.
    pub fn select<T>(&self, selector: impl FnOnce(&Value) -> T) -> T {
        selector(&self.snapshot.get())
    }
}

impl Drop for BridgeState {
    fn drop(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}
