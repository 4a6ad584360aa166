//! UI-side reader of the host bridge.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::debug;

use super::host::HostBridge;
use super::wire::{BridgeEvent, DispatchAction};

struct CachedSnapshot {
    version: Option<u64>,
    text: Arc<str>,
    value: Rc<Value>,
}

/// Reads snapshots, drains events and dispatches actions.
///
/// Cloning shares the snapshot cache.
#[derive(Clone)]
pub struct BridgeClient {
    bridge: Arc<HostBridge>,
    cache: Rc<RefCell<CachedSnapshot>>,
}

impl BridgeClient {
    pub fn new(bridge: Arc<HostBridge>) -> Self {
        Self {
            bridge,
            cache: Rc::new(RefCell::new(CachedSnapshot {
                version: None,
                text: Arc::from(""),
                value: Rc::new(Value::Object(Map::new())),
            })),
        }
    }

    pub fn bridge(&self) -> &Arc<HostBridge> {
        &self.bridge
    }

    pub fn version(&self) -> u64 {
        self.bridge.version()
    }

    /// Current state, parsed once per version. Malformed state reads as an
    /// empty object.
    pub fn get_snapshot(&self) -> Rc<Value> {
        let (version, text) = self.bridge.snapshot();
        let mut cache = self.cache.borrow_mut();
        if cache.version == Some(version) {
            return Rc::clone(&cache.value);
        }
        cache.version = Some(version);

        // Events bump the version without touching the state text.
        if Arc::ptr_eq(&cache.text, &text) {
            return Rc::clone(&cache.value);
        }
        let value = serde_json::from_str(&text).unwrap_or_else(|err| {
            debug!(version, %err, "malformed state, using empty object");
            Value::Object(Map::new())
        });
        cache.text = text;
        cache.value = Rc::new(value);
        Rc::clone(&cache.value)
    }

    /// Dequeue and parse every queued event, oldest first. Records that do
    /// not parse are dropped.
    pub fn drain_events(&self) -> Vec<BridgeEvent> {
        self.bridge
            .drain_events()
            .into_iter()
            .filter_map(|record| match serde_json::from_str(&record) {
                Ok(event) => Some(event),
                Err(err) => {
                    debug!(%err, "malformed event record dropped");
                    None
                }
            })
            .collect()
    }

    pub fn dispatch(&self, action: &DispatchAction) {
        self.bridge.dispatch(action);
    }

    /// Dispatch an action given as JSON text, tolerating malformed fields.
    pub fn dispatch_json(&self, text: &str) {
        self.dispatch(&DispatchAction::from_json(text));
    }
}
