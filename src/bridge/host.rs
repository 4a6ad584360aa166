//! Host bridge - versioned state snapshot, event queue and dispatch.
//!
//! Touched from two contexts: the host writes state and enqueues events on
//! its own tick, the UI reads and drains on its frame tick. None of the
//! read/write paths take a lock:
//!
//! - the `(version, state)` pair lives behind one epoch-managed atomic
//!   pointer, so a reader always sees a version together with the state
//!   written at that version
//! - events go through a multi-producer FIFO
//!
//! `version` strictly increases on every state write and every event. An
//! event is queued before its version is published: a reader that sees the
//! new version always finds the event already drained or still queued,
//! while a reader on the old version may drain it one frame early.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam::epoch::{self, Atomic, Owned};
use crossbeam::queue::SegQueue;
use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, trace, warn};

use super::wire::{BridgeEvent, DispatchAction};

const EMPTY_STATE: &str = "{}";
const DEFAULT_EVENT_TYPE: &str = "event";

struct Snapshot {
    version: u64,
    state: Arc<str>,
}

/// Host-side listener for dispatched actions.
pub type DispatchListener = Arc<dyn Fn(&DispatchAction) + Send + Sync>;

/// Handle returned by [`HostBridge::subscribe_dispatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

pub struct HostBridge {
    snapshot: Atomic<Snapshot>,
    events: SegQueue<String>,
    listeners: RwLock<Vec<(ListenerId, DispatchListener)>>,
    next_listener: AtomicU64,
}

impl Default for HostBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl HostBridge {
    pub fn new() -> Self {
        Self {
            snapshot: Atomic::new(Snapshot {
                version: 0,
                state: Arc::from(EMPTY_STATE),
            }),
            events: SegQueue::new(),
            listeners: RwLock::new(Vec::new()),
            next_listener: AtomicU64::new(0),
        }
    }

    // =========================================================================
    // Snapshot
    // =========================================================================

    /// Current `(version, state)` pair.
    pub fn snapshot(&self) -> (u64, Arc<str>) {
        let guard = epoch::pin();
        let shared = self.snapshot.load(Ordering::Acquire, &guard);
        // SAFETY: the pointer is never null and is only destroyed through
        // `defer_destroy` after being replaced; `guard` keeps it alive here.
        match unsafe { shared.as_ref() } {
            Some(snapshot) => (snapshot.version, Arc::clone(&snapshot.state)),
            None => (0, Arc::from(EMPTY_STATE)),
        }
    }

    pub fn version(&self) -> u64 {
        self.snapshot().0
    }

    pub fn state_json(&self) -> Arc<str> {
        self.snapshot().1
    }

    /// Swap in the next snapshot, keeping the current state when `state` is
    /// `None`. Returns the new version.
    fn bump(&self, state: Option<Arc<str>>) -> u64 {
        let guard = epoch::pin();
        loop {
            let current = self.snapshot.load(Ordering::Acquire, &guard);
            // SAFETY: see `snapshot`.
            let (version, current_state) = match unsafe { current.as_ref() } {
                Some(s) => (s.version, Arc::clone(&s.state)),
                None => (0, Arc::from(EMPTY_STATE)),
            };
            let next = Owned::new(Snapshot {
                version: version + 1,
                state: state.clone().unwrap_or(current_state),
            });
            match self
                .snapshot
                .compare_exchange(current, next, Ordering::AcqRel, Ordering::Acquire, &guard)
            {
                Ok(_) => {
                    if !current.is_null() {
                        // SAFETY: `current` is unreachable from the atomic now;
                        // readers still holding it are protected by their guards.
                        unsafe { guard.defer_destroy(current) };
                    }
                    return version + 1;
                }
                Err(_) => trace!("snapshot write raced, retrying"),
            }
        }
    }

    /// Store already-serialized state. Blank text stores `{}`.
    pub fn set_state_json(&self, json: &str) -> u64 {
        let state = if json.trim().is_empty() { EMPTY_STATE } else { json };
        let version = self.bump(Some(Arc::from(state)));
        trace!(version, "state written");
        version
    }

    /// Serialize and store state. A value that fails to serialize stores `{}`.
    pub fn set_state<T: Serialize + ?Sized>(&self, state: &T) -> u64 {
        match serde_json::to_string(state) {
            Ok(json) => self.set_state_json(&json),
            Err(err) => {
                warn!(%err, "state failed to serialize");
                self.set_state_json(EMPTY_STATE)
            }
        }
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Enqueue an event record. A blank type becomes `"event"`; a payload
    /// that fails to serialize is sent as `null`.
    pub fn emit<T: Serialize + ?Sized>(&self, kind: &str, payload: &T) -> u64 {
        let payload = serde_json::to_value(payload).unwrap_or_else(|err| {
            warn!(kind, %err, "event payload failed to serialize");
            Value::Null
        });
        self.emit_value(kind, payload)
    }

    /// Enqueue an event whose payload is JSON text. Malformed text is sent
    /// as a `null` payload.
    pub fn emit_json(&self, kind: &str, payload_json: &str) -> u64 {
        let payload = serde_json::from_str(payload_json).unwrap_or_else(|err| {
            warn!(kind, %err, "event payload is not valid JSON");
            Value::Null
        });
        self.emit_value(kind, payload)
    }

    fn emit_value(&self, kind: &str, payload: Value) -> u64 {
        let kind = if kind.trim().is_empty() { DEFAULT_EVENT_TYPE } else { kind };
        let record = BridgeEvent::new(kind, payload);
        match serde_json::to_string(&record) {
            Ok(text) => self.push_record(text),
            Err(err) => {
                warn!(kind, %err, "event record failed to serialize");
                self.version()
            }
        }
    }

    /// Enqueue a record that is already serialized. It is not validated;
    /// readers drop records they cannot parse.
    ///
    /// The record is queued before the version moves. Bumping first would
    /// let a reader observe the new version, drain an empty queue and then
    /// never see another change for this event.
    pub fn push_record(&self, record: impl Into<String>) -> u64 {
        self.events.push(record.into());
        self.bump(None)
    }

    /// Dequeue every queued record, oldest first.
    pub fn drain_events(&self) -> Vec<String> {
        let mut records = Vec::with_capacity(self.events.len());
        while let Some(record) = self.events.pop() {
            records.push(record);
        }
        records
    }

    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    pub fn subscribe_dispatch(&self, listener: impl Fn(&DispatchAction) + Send + Sync + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener.fetch_add(1, Ordering::Relaxed));
        self.listeners.write().push((id, Arc::new(listener)));
        id
    }

    pub fn unsubscribe_dispatch(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.read().len()
    }

    /// Deliver `action` to every listener in registration order. Listeners
    /// may subscribe or unsubscribe while being called; a panicking listener
    /// is logged and the rest still run.
    pub fn dispatch(&self, action: &DispatchAction) {
        let listeners: Vec<(ListenerId, DispatchListener)> =
            self.listeners.read().iter().map(|(id, l)| (*id, Arc::clone(l))).collect();
        debug!(kind = %action.kind, listeners = listeners.len(), "dispatch");
        for (id, listener) in listeners {
            if catch_unwind(AssertUnwindSafe(|| listener(action))).is_err() {
                warn!(kind = %action.kind, listener = id.0, "dispatch listener panicked");
            }
        }
    }
}

impl Drop for HostBridge {
    fn drop(&mut self) {
        // SAFETY: `&mut self` means no other thread can be reading the
        // snapshot, so the last pointer can be reclaimed immediately.
        unsafe {
            let guard = epoch::unprotected();
            let shared = self.snapshot.load(Ordering::Relaxed, guard);
            if !shared.is_null() {
                drop(shared.into_owned());
            }
        }
    }
}

// =============================================================================
// Default instance
// =============================================================================

static DEFAULT_BRIDGE: RwLock<Option<Arc<HostBridge>>> = parking_lot::const_rwlock(None);

/// The process-wide default bridge, created on first use.
pub fn default_bridge() -> Arc<HostBridge> {
    if let Some(bridge) = DEFAULT_BRIDGE.read().as_ref() {
        return Arc::clone(bridge);
    }
    Arc::clone(DEFAULT_BRIDGE.write().get_or_insert_with(|| Arc::new(HostBridge::new())))
}

/// Replace the default bridge. Returns the previous one.
pub fn set_default_bridge(bridge: Arc<HostBridge>) -> Option<Arc<HostBridge>> {
    DEFAULT_BRIDGE.write().replace(bridge)
}
