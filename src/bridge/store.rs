//! State store - named slices merged into one published snapshot.
//!
//! Several host systems each own a slice (`"player"`, `"inventory"`, ...);
//! every change republishes the merged object through the bridge.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::host::HostBridge;

pub struct StateStore {
    bridge: Arc<HostBridge>,
    slices: Mutex<Map<String, Value>>,
}

impl StateStore {
    pub fn new(bridge: Arc<HostBridge>) -> Self {
        Self {
            bridge,
            slices: Mutex::new(Map::new()),
        }
    }

    pub fn bridge(&self) -> &Arc<HostBridge> {
        &self.bridge
    }

    /// Set a slice and publish. Blank keys and values that fail to
    /// serialize are ignored. Returns the published version.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Option<u64> {
        if key.trim().is_empty() {
            debug!("state slice with blank key ignored");
            return None;
        }
        let value = match serde_json::to_value(value) {
            Ok(value) => value,
            Err(err) => {
                warn!(key, %err, "state slice failed to serialize");
                return None;
            }
        };
        let mut slices = self.slices.lock();
        slices.insert(key.to_string(), value);
        Some(self.publish_locked(&slices))
    }

    /// Remove a slice, publishing only if it existed.
    pub fn remove(&self, key: &str) -> Option<u64> {
        if key.trim().is_empty() {
            return None;
        }
        let mut slices = self.slices.lock();
        let removed = slices.remove(key).is_some();
        removed.then(|| self.publish_locked(&slices))
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.slices.lock().get(key).cloned()
    }

    /// Publish the merged slices.
    pub fn publish(&self) -> u64 {
        let slices = self.slices.lock();
        self.publish_locked(&slices)
    }

    /// The slice lock stays held until the bridge has the new state, so
    /// publishes land in the same order as the writes they carry.
    fn publish_locked(&self, slices: &Map<String, Value>) -> u64 {
        self.bridge.set_state(slices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn setup() -> StateStore {
        StateStore::new(Arc::new(HostBridge::new()))
    }

    fn published(store: &StateStore) -> Value {
        serde_json::from_str(&store.bridge().state_json()).unwrap()
    }

    #[test]
    fn test_slices_merge() {
        let store = setup();
        store.set("player", &json!({ "hp": 80 }));
        store.set("gold", &120);
        assert_eq!(published(&store), json!({ "player": { "hp": 80 }, "gold": 120 }));
        assert_eq!(store.bridge().version(), 2);
    }

    #[test]
    fn test_blank_key_ignored() {
        let store = setup();
        assert_eq!(store.set("  ", &1), None);
        assert_eq!(store.bridge().version(), 0);
    }

    #[test]
    fn test_remove_publishes_only_when_present() {
        let store = setup();
        store.set("quest", &"find the key");
        assert_eq!(store.remove("missing"), None);
        assert_eq!(store.remove("quest"), Some(2));
        assert_eq!(published(&store), json!({}));
        assert_eq!(store.get("quest"), None);
    }

    #[test]
    fn test_concurrent_sets_publish_every_slice() {
        for _ in 0..50 {
            let store = Arc::new(setup());
            let writers: Vec<_> = (0..8)
                .map(|i| {
                    let store = Arc::clone(&store);
                    std::thread::spawn(move || {
                        store.set(&format!("slice{i}"), &i);
                    })
                })
                .collect();
            for writer in writers {
                writer.join().unwrap();
            }

            let state = published(&store);
            for i in 0..8 {
                assert_eq!(state[format!("slice{i}")], json!(i));
            }
            assert_eq!(store.bridge().version(), 8);
        }
    }
}
