//! Poll loop - per-frame change detection over a bridge client.
//!
//! # Pattern
//!
//! - First subscriber (state or event) requests a frame
//! - Each frame re-requests the next one, then compares versions
//! - On a change: drain and fan out events (only if anyone listens), then
//!   notify state listeners
//! - Last unsubscribe cancels the pending frame
//!
//! # Example
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use std::sync::Arc;
//! use spark_bridge::bridge::{BridgeClient, HostBridge, PollLoop};
//! use spark_bridge::scheduler::Scheduler;
//!
//! let bridge = Arc::new(HostBridge::new());
//! let scheduler = Scheduler::new();
//! let poll = PollLoop::new(BridgeClient::new(bridge.clone()), Rc::new(scheduler.clone()));
//!
//! let changes = Rc::new(Cell::new(0));
//! let c = changes.clone();
//! let unsubscribe = poll.subscribe(move |_| c.set(c.get() + 1));
//!
//! bridge.set_state_json(r#"{"hp": 3}"#);
//! scheduler.run_frame();
//! assert_eq!(changes.get(), 1);
//!
//! unsubscribe();
//! assert!(!poll.is_running());
//! ```

use std::cell::RefCell;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::rc::{Rc, Weak};

use serde_json::Value;
use tracing::{trace, warn};

use crate::scheduler::{FrameScheduler, TaskId};

use super::client::BridgeClient;
use super::wire::BridgeEvent;

/// Detaches a poll-loop subscription.
pub type Unsubscribe = Box<dyn FnOnce()>;

type StateListener = Rc<dyn Fn(&Rc<Value>)>;
type EventListener = Rc<dyn Fn(&BridgeEvent)>;

struct PollInner {
    client: BridgeClient,
    scheduler: Rc<dyn FrameScheduler>,
    frame: Option<TaskId>,
    last_version: u64,
    next_listener: u64,
    state_listeners: Vec<(u64, StateListener)>,
    event_listeners: Vec<(u64, EventListener)>,
}

impl PollInner {
    fn listener_count(&self) -> usize {
        self.state_listeners.len() + self.event_listeners.len()
    }
}

/// Shared handle to a poll loop. Cloning shares the loop.
#[derive(Clone)]
pub struct PollLoop {
    inner: Rc<RefCell<PollInner>>,
}

impl PollLoop {
    pub fn new(client: BridgeClient, scheduler: Rc<dyn FrameScheduler>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(PollInner {
                client,
                scheduler,
                frame: None,
                last_version: 0,
                next_listener: 0,
                state_listeners: Vec::new(),
                event_listeners: Vec::new(),
            })),
        }
    }

    pub fn client(&self) -> BridgeClient {
        self.inner.borrow().client.clone()
    }

    /// True while a frame is requested.
    pub fn is_running(&self) -> bool {
        self.inner.borrow().frame.is_some()
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().listener_count()
    }

    /// Called with the current snapshot after every observed change.
    pub fn subscribe(&self, listener: impl Fn(&Rc<Value>) + 'static) -> Unsubscribe {
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_listener;
            inner.next_listener += 1;
            inner.state_listeners.push((id, Rc::new(listener)));
            id
        };
        self.ensure_running();

        let weak = Rc::downgrade(&self.inner);
        Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.borrow_mut().state_listeners.retain(|(existing, _)| *existing != id);
                Self::maybe_stop(&inner);
            }
        })
    }

    /// Called once per drained event, in enqueue order.
    pub fn subscribe_events(&self, listener: impl Fn(&BridgeEvent) + 'static) -> Unsubscribe {
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_listener;
            inner.next_listener += 1;
            inner.event_listeners.push((id, Rc::new(listener)));
            id
        };
        self.ensure_running();

        let weak = Rc::downgrade(&self.inner);
        Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.borrow_mut().event_listeners.retain(|(existing, _)| *existing != id);
                Self::maybe_stop(&inner);
            }
        })
    }

    fn ensure_running(&self) {
        let mut inner = self.inner.borrow_mut();
        if inner.frame.is_some() {
            return;
        }
        inner.last_version = inner.client.version();
        trace!(version = inner.last_version, "poll loop started");
        let frame = Self::request(&inner.scheduler, Rc::downgrade(&self.inner));
        inner.frame = Some(frame);
    }

    fn maybe_stop(inner: &Rc<RefCell<PollInner>>) {
        let mut inner = inner.borrow_mut();
        if inner.listener_count() > 0 {
            return;
        }
        if let Some(frame) = inner.frame.take() {
            inner.scheduler.cancel_frame(frame);
            trace!("poll loop stopped");
        }
    }

    fn request(scheduler: &Rc<dyn FrameScheduler>, weak: Weak<RefCell<PollInner>>) -> TaskId {
        scheduler.request_frame(Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                Self::tick(&inner);
            }
        }))
    }

    /// One frame: re-arm, then deliver whatever changed.
    fn tick(this: &Rc<RefCell<PollInner>>) {
        let (client, state_listeners, event_listeners) = {
            let mut inner = this.borrow_mut();
            if inner.frame.is_none() {
                return;
            }
            let next = Self::request(&inner.scheduler, Rc::downgrade(this));
            inner.frame = Some(next);

            let version = inner.client.version();
            if version == inner.last_version {
                return;
            }
            inner.last_version = version;
            trace!(version, "bridge changed");

            let states: Vec<StateListener> = inner.state_listeners.iter().map(|(_, l)| Rc::clone(l)).collect();
            let events: Vec<EventListener> = inner.event_listeners.iter().map(|(_, l)| Rc::clone(l)).collect();
            (inner.client.clone(), states, events)
        };

        // A panicking listener is logged and skipped; the frame carries on.
        if !event_listeners.is_empty() {
            for event in client.drain_events() {
                for listener in &event_listeners {
                    if catch_unwind(AssertUnwindSafe(|| listener(&event))).is_err() {
                        warn!(kind = %event.kind, "event listener panicked");
                    }
                }
            }
        }

        if !state_listeners.is_empty() {
            let snapshot = client.get_snapshot();
            for listener in &state_listeners {
                if catch_unwind(AssertUnwindSafe(|| listener(&snapshot))).is_err() {
                    warn!("state listener panicked");
                }
            }
        }
    }
}
