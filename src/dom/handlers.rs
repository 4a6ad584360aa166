//! Handler slots - per-proxy record of attached native callbacks.
//!
//! Each slot holds the unsubscribe function of whatever is currently
//! attached under that name (`onClick`, `onChange`, `layout:resized`, ...).
//! Replacing a slot always runs the old unsubscribe first, so a handler is
//! never attached twice.

use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};

use tracing::warn;

use crate::props::{Callback, PropValue};
use crate::scene::{NodeId, Scene, SceneSignal, SignalArgs};

/// Detaches one native connection.
pub type Unsubscribe = Box<dyn FnOnce()>;

#[derive(Default)]
pub struct HandlerSlots {
    slots: HashMap<String, Unsubscribe>,
}

impl HandlerSlots {
    pub fn new() -> Self {
        Self::default()
    }

    /// Detach the current occupant of `slot` (if any), then store `next`.
    pub fn replace(&mut self, slot: &str, next: Option<Unsubscribe>) {
        self.detach(slot);
        if let Some(next) = next {
            self.slots.insert(slot.to_string(), next);
        }
    }

    pub fn detach(&mut self, slot: &str) {
        if let Some(unsubscribe) = self.slots.remove(slot) {
            unsubscribe();
        }
    }

    pub fn detach_all(&mut self) {
        for (_, unsubscribe) in self.slots.drain() {
            unsubscribe();
        }
    }

    pub fn contains(&self, slot: &str) -> bool {
        self.slots.contains_key(slot)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl Drop for HandlerSlots {
    fn drop(&mut self) {
        self.detach_all();
    }
}

/// Connect `handler` to a native signal, returning its unsubscribe.
///
/// A connection the native side refuses is reported and yields `None`;
/// the widget simply goes without that behavior.
pub fn connect(
    scene: &Scene,
    node: NodeId,
    signal: SceneSignal,
    handler: impl Fn(&Scene, &SignalArgs) + 'static,
) -> Option<Unsubscribe> {
    match scene.connect(node, signal, handler) {
        Ok(connection) => {
            let scene = scene.clone();
            Some(Box::new(move || scene.disconnect(node, connection)))
        }
        Err(err) => {
            warn!(%node, ?signal, error = %err, "native connection failed");
            None
        }
    }
}

/// Invoke a prop callback, containing any panic it raises.
pub fn invoke(callback: &Callback, slot: &str, args: &[PropValue]) {
    if catch_unwind(AssertUnwindSafe(|| callback.call(args))).is_err() {
        warn!(slot, "prop callback panicked");
    }
}

/// Attach (or detach) the callback stored under `key` in a payload to a
/// native signal, using `key` as the slot name.
///
/// `args` maps the signal arguments to callback arguments; returning `None`
/// filters the emission out.
pub fn bind_callback(
    slots: &mut HandlerSlots,
    scene: &Scene,
    node: NodeId,
    key: &str,
    value: Option<&PropValue>,
    signal: SceneSignal,
    args: impl Fn(&SignalArgs) -> Option<Vec<PropValue>> + 'static,
) {
    let Some(value) = value else { return };
    let next = value.as_callback().cloned().and_then(|callback| {
        let slot = key.to_string();
        connect(scene, node, signal, move |_, signal_args| {
            if let Some(call_args) = args(signal_args) {
                invoke(&callback, &slot, &call_args);
            }
        })
    });
    slots.replace(key, next);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::NativeClass;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_replace_runs_previous_unsubscribe() {
        let detached = Rc::new(Cell::new(0));
        let mut slots = HandlerSlots::new();
        for _ in 0..3 {
            let counter = detached.clone();
            slots.replace("onClick", Some(Box::new(move || counter.set(counter.get() + 1))));
        }
        assert_eq!(detached.get(), 2);
        assert_eq!(slots.len(), 1);

        slots.replace("onClick", None);
        assert_eq!(detached.get(), 3);
        assert!(slots.is_empty());
    }

    #[test]
    fn test_drop_detaches_everything() {
        let detached = Rc::new(Cell::new(0));
        {
            let mut slots = HandlerSlots::new();
            for slot in ["a", "b"] {
                let counter = detached.clone();
                slots.replace(slot, Some(Box::new(move || counter.set(counter.get() + 1))));
            }
        }
        assert_eq!(detached.get(), 2);
    }

    #[test]
    fn test_bind_callback_rebinds_without_duplicates() {
        let scene = Scene::new();
        let button = scene.create(NativeClass::Button);
        let hits = Rc::new(Cell::new(0));
        let mut slots = HandlerSlots::new();

        for _ in 0..2 {
            let counter = hits.clone();
            let cb = PropValue::from(Callback::new(move |_| counter.set(counter.get() + 1)));
            bind_callback(&mut slots, &scene, button, "onPress", Some(&cb), SceneSignal::Pressed, |_| {
                Some(Vec::new())
            });
        }
        assert_eq!(scene.connection_count(button, SceneSignal::Pressed), 1);
        scene.press(button);
        assert_eq!(hits.get(), 1);

        bind_callback(&mut slots, &scene, button, "onPress", Some(&PropValue::Null), SceneSignal::Pressed, |_| {
            Some(Vec::new())
        });
        assert_eq!(scene.connection_count(button, SceneSignal::Pressed), 0);
    }

    #[test]
    fn test_unsupported_connection_is_skipped() {
        let scene = Scene::new();
        let label = scene.create(NativeClass::Label);
        let mut slots = HandlerSlots::new();
        let cb = PropValue::from(Callback::new(|_| {}));
        bind_callback(&mut slots, &scene, label, "onPress", Some(&cb), SceneSignal::Pressed, |_| None);
        assert!(!slots.contains("onPress"));
    }

    #[test]
    fn test_panicking_callback_is_contained() {
        let cb = Callback::new(|_| panic!("boom"));
        invoke(&cb, "onClick", &[]);
    }
}
