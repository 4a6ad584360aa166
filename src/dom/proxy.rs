//! Node proxy - owns one native node and its diff/handler bookkeeping.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use tracing::trace;

use crate::props::{apply_payload, PropMap, PropValue, Props, StyleObject, UpdatePayload};
use crate::reconciler::ChildList;
use crate::scene::{NativeClass, NodeId, Scene};
use crate::style::{effective_style, StyleSheet};

use super::handlers::HandlerSlots;

// =============================================================================
// Widget
// =============================================================================

/// Everything a widget needs to apply one committed update.
pub struct UpdateContext<'a> {
    pub scene: &'a Scene,
    pub node: NodeId,
    /// Changed props. `Null` means the prop was removed.
    pub payload: &'a UpdatePayload,
    /// Full committed prop set after this update.
    pub props: &'a PropMap,
    /// Effective style after this update (class styles + inline style).
    pub style: &'a StyleObject,
    /// Style keys whose value changed. `Null` means the key was removed.
    pub style_changes: &'a StyleObject,
    /// The `class` prop is part of this update.
    pub class_update: bool,
    pub handlers: &'a mut HandlerSlots,
}

impl UpdateContext<'_> {
    /// Changed prop value, if `key` is part of the payload.
    pub fn changed(&self, key: &str) -> Option<&PropValue> {
        self.payload.get(key)
    }

    /// Changed style value, if `key` changed.
    pub fn style_changed(&self, key: &str) -> Option<&PropValue> {
        self.style_changes.get(key)
    }

    pub fn any_style_changed(&self, keys: &[&str]) -> bool {
        keys.iter().any(|k| self.style_changes.contains_key(*k))
    }

    /// Current effective style value.
    pub fn style_value(&self, key: &str) -> Option<&PropValue> {
        self.style.get(key).filter(|v| !v.is_null())
    }
}

/// Behavior of one element kind.
///
/// A widget decides which native class backs the element and how prop and
/// style updates translate into native mutations.
pub trait Widget {
    fn class(&self) -> NativeClass;

    /// One-time setup after the native node is created.
    fn init(&mut self, _scene: &Scene, _node: NodeId) {}

    fn update(&mut self, ctx: &mut UpdateContext<'_>);
}

// =============================================================================
// Node Proxy
// =============================================================================

pub struct NodeProxy {
    kind: String,
    node: NodeId,
    scene: Scene,
    sheet: StyleSheet,
    widget: Box<dyn Widget>,
    props: Props,
    style: StyleObject,
    handlers: HandlerSlots,
    pub(crate) children: ChildList<ProxyHandle>,
    freed: bool,
}

impl NodeProxy {
    /// Create the native node for `widget` and commit `props` as the first
    /// update.
    pub fn new(
        kind: impl Into<String>,
        mut widget: Box<dyn Widget>,
        scene: &Scene,
        sheet: &StyleSheet,
        props: &Props,
    ) -> Self {
        let node = scene.create(widget.class());
        widget.init(scene, node);

        let mut proxy = Self {
            kind: kind.into(),
            node,
            scene: scene.clone(),
            sheet: sheet.clone(),
            widget,
            props: Rc::new(PropMap::new()),
            style: StyleObject::new(),
            handlers: HandlerSlots::new(),
            children: ChildList::new(),
            freed: false,
        };
        proxy.update_props(props);
        proxy
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Last committed prop set.
    pub fn props(&self) -> &Props {
        &self.props
    }

    /// Effective style last applied.
    pub fn style(&self) -> &StyleObject {
        &self.style
    }

    pub fn handlers(&self) -> &HandlerSlots {
        &self.handlers
    }

    pub fn is_freed(&self) -> bool {
        self.freed
    }

    pub fn children(&self) -> &[ProxyHandle] {
        self.children.as_slice()
    }

    /// Commit an update payload.
    pub fn update_props(&mut self, payload: &UpdatePayload) {
        if self.freed {
            trace!(kind = %self.kind, node = %self.node, "update on freed proxy ignored");
            return;
        }
        if payload.is_empty() {
            return;
        }

        let merged = apply_payload(&self.props, payload);
        let class_update = payload.contains_key("class");
        let style = if class_update || payload.contains_key("style") {
            effective_style(
                &self.sheet,
                merged.get("class").and_then(PropValue::as_str),
                merged.get("style"),
            )
        } else {
            self.style.clone()
        };
        let style_changes = style_delta(&self.style, &style);

        let mut ctx = UpdateContext {
            scene: &self.scene,
            node: self.node,
            payload,
            props: &merged,
            style: &style,
            style_changes: &style_changes,
            class_update,
            handlers: &mut self.handlers,
        };
        self.widget.update(&mut ctx);

        self.props = Rc::new(merged);
        self.style = style;
    }

    /// Replace the text of a text-bearing node.
    pub fn set_text(&mut self, text: &str) {
        let mut payload = UpdatePayload::new();
        payload.insert("children".into(), text.into());
        self.update_props(&payload);
    }

    /// Detach every handler and mark this proxy and its descendants freed.
    /// The native node itself is freed by the caller.
    pub(crate) fn release(&mut self) {
        self.handlers.detach_all();
        self.freed = true;
        for child in self.children.clear() {
            child.borrow_mut().release();
        }
    }
}

impl fmt::Debug for NodeProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeProxy")
            .field("kind", &self.kind)
            .field("node", &self.node)
            .field("freed", &self.freed)
            .field("children", &self.children.len())
            .finish()
    }
}

/// Keys whose value differs between two effective styles; removed keys map
/// to `Null`.
fn style_delta(prev: &StyleObject, next: &StyleObject) -> StyleObject {
    let mut delta = StyleObject::new();
    for (key, value) in next {
        if !prev.get(key).is_some_and(|old| old.shallow_eq(value)) {
            delta.insert(key.clone(), value.clone());
        }
    }
    for key in prev.keys() {
        if !next.contains_key(key) {
            delta.insert(key.clone(), PropValue::Null);
        }
    }
    delta
}

// =============================================================================
// Proxy Handle
// =============================================================================

/// Shared handle to a node proxy. Equality is identity.
#[derive(Clone)]
pub struct ProxyHandle(Rc<RefCell<NodeProxy>>);

impl ProxyHandle {
    pub fn new(proxy: NodeProxy) -> Self {
        Self(Rc::new(RefCell::new(proxy)))
    }

    pub fn borrow(&self) -> Ref<'_, NodeProxy> {
        self.0.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, NodeProxy> {
        self.0.borrow_mut()
    }

    pub fn node(&self) -> NodeId {
        self.0.borrow().node
    }
}

impl PartialEq for ProxyHandle {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ProxyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0.borrow(), f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{prop_map, props};
    use std::cell::Cell;

    /// Records what it sees on every update.
    struct Probe {
        updates: Rc<Cell<usize>>,
        last_changes: Rc<RefCell<Vec<String>>>,
        class_updates: Rc<Cell<usize>>,
    }

    impl Widget for Probe {
        fn class(&self) -> NativeClass {
            NativeClass::Control
        }

        fn update(&mut self, ctx: &mut UpdateContext<'_>) {
            self.updates.set(self.updates.get() + 1);
            if ctx.class_update {
                self.class_updates.set(self.class_updates.get() + 1);
            }
            *self.last_changes.borrow_mut() = ctx.style_changes.keys().cloned().collect();
        }
    }

    struct Fixture {
        scene: Scene,
        proxy: NodeProxy,
        updates: Rc<Cell<usize>>,
        changes: Rc<RefCell<Vec<String>>>,
        class_updates: Rc<Cell<usize>>,
    }

    fn setup(props: &Props) -> Fixture {
        let scene = Scene::new();
        let updates = Rc::new(Cell::new(0));
        let changes = Rc::new(RefCell::new(Vec::new()));
        let class_updates = Rc::new(Cell::new(0));
        let probe = Probe {
            updates: updates.clone(),
            last_changes: changes.clone(),
            class_updates: class_updates.clone(),
        };
        let proxy = NodeProxy::new("probe", Box::new(probe), &scene, &StyleSheet::default(), props);
        Fixture {
            scene,
            proxy,
            updates,
            changes,
            class_updates,
        }
    }

    #[test]
    fn test_first_commit_applies_everything() {
        let fx = setup(&props! { "class" => "p-2 hidden", "tooltip" => "hi" });
        assert_eq!(fx.updates.get(), 1);
        assert_eq!(fx.class_updates.get(), 1);
        assert_eq!(fx.proxy.style()["padding"].as_f64(), Some(8.0));
        assert_eq!(fx.proxy.props().len(), 2);
        assert!(fx.scene.is_alive(fx.proxy.node()));
    }

    #[test]
    fn test_inline_style_wins_and_delta_is_minimal() {
        let mut fx = setup(&props! { "class" => "p-2 gap-1" });
        let mut payload = UpdatePayload::new();
        payload.insert("style".into(), prop_map! { "padding" => 1 }.into());
        fx.proxy.update_props(&payload);

        assert_eq!(fx.proxy.style()["padding"].as_f64(), Some(1.0));
        assert_eq!(*fx.changes.borrow(), vec!["padding".to_string()]);
        assert_eq!(fx.class_updates.get(), 1);
    }

    #[test]
    fn test_removed_class_reports_null_style_keys() {
        let mut fx = setup(&props! { "class" => "hidden" });
        let mut payload = UpdatePayload::new();
        payload.insert("class".into(), PropValue::Null);
        fx.proxy.update_props(&payload);

        assert!(fx.proxy.style().is_empty());
        assert_eq!(*fx.changes.borrow(), vec!["visible".to_string()]);
        assert!(!fx.proxy.props().contains_key("class"));
    }

    #[test]
    fn test_empty_payload_is_skipped() {
        let mut fx = setup(&props! { "tooltip" => "x" });
        fx.proxy.update_props(&UpdatePayload::new());
        assert_eq!(fx.updates.get(), 1);
    }

    #[test]
    fn test_freed_proxy_ignores_updates() {
        let mut fx = setup(&props! { "tooltip" => "x" });
        fx.proxy.release();
        fx.proxy.set_text("late");
        assert!(fx.proxy.is_freed());
        assert_eq!(fx.updates.get(), 1);
    }

    #[test]
    fn test_handle_identity() {
        let a = ProxyHandle::new(setup(&props! {}).proxy);
        let b = ProxyHandle::new(setup(&props! {}).proxy);
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }
}
