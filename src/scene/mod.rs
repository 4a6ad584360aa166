//! Scene - the retained-mode native scene graph.
//!
//! A node arena with ordered children, per-node properties, theme overrides
//! and signal connections. It plays the part of the host engine: node
//! proxies mutate it, and user input enters through [`Scene::emit`] and
//! the input helpers ([`Scene::press`], [`Scene::click`], ...).
//!
//! Node slots are recycled through a free list, as a component registry
//! would. A freed [`NodeId`] never aliases the node that later reuses its
//! slot: lenient mutations on it are no-ops, strict lookups return
//! [`Error::FreedNode`].
//!
//! # Example
//!
//! ```
//! use spark_bridge::scene::{NativeClass, Scene, SceneSignal, SignalArgs};
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let scene = Scene::new();
//! let button = scene.create(NativeClass::Button);
//! scene.add_child(scene.root(), button);
//!
//! let presses = Rc::new(Cell::new(0));
//! let counter = presses.clone();
//! scene.connect(button, SceneSignal::Pressed, move |_, _| counter.set(counter.get() + 1)).unwrap();
//!
//! scene.press(button);
//! assert_eq!(presses.get(), 1);
//!
//! scene.free(button);
//! assert!(!scene.is_alive(button));
//! scene.press(button); // no-op
//! assert_eq!(presses.get(), 1);
//! ```

mod node;
mod signal;

pub use node::{NativeClass, NodeId, StyleBox, ThemeOverrides, Variant};
pub use signal::{ConnectionId, InputEvent, MouseButton, SceneSignal, SignalArgs, SignalHandler};

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{trace, warn};

use crate::error::{Error, Result};
use crate::types::{Rgba, Vec2};

use node::{Connection, NativeNode};

// =============================================================================
// Tree Storage
// =============================================================================

struct SceneTree {
    nodes: Vec<Option<NativeNode>>,
    generations: Vec<u32>,
    free: Vec<u32>,
    next_connection: u64,
    root: NodeId,
}

impl SceneTree {
    fn node(&self, id: NodeId) -> Option<&NativeNode> {
        let index = id.index as usize;
        if self.generations.get(index) != Some(&id.generation) {
            return None;
        }
        self.nodes.get(index)?.as_ref()
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut NativeNode> {
        let index = id.index as usize;
        if self.generations.get(index) != Some(&id.generation) {
            return None;
        }
        self.nodes.get_mut(index)?.as_mut()
    }

    fn allocate(&mut self, class: NativeClass) -> NodeId {
        let node = NativeNode::new(class);
        if let Some(index) = self.free.pop() {
            self.nodes[index as usize] = Some(node);
            return NodeId {
                index,
                generation: self.generations[index as usize],
            };
        }
        let index = self.nodes.len() as u32;
        self.nodes.push(Some(node));
        self.generations.push(0);
        NodeId { index, generation: 0 }
    }

    fn release(&mut self, id: NodeId) {
        let Some(node) = self.node_mut(id) else { return };
        let children = std::mem::take(&mut node.children);
        for child in children {
            self.release(child);
        }
        let index = id.index as usize;
        self.nodes[index] = None;
        self.generations[index] = self.generations[index].wrapping_add(1);
        self.free.push(id.index);
    }

    fn is_ancestor(&self, ancestor: NodeId, mut node: NodeId) -> bool {
        while let Some(parent) = self.node(node).and_then(|n| n.parent) {
            if parent == ancestor {
                return true;
            }
            node = parent;
        }
        false
    }
}

// =============================================================================
// Scene
// =============================================================================

/// Shared handle to a scene graph. Cloning shares the scene.
#[derive(Clone)]
pub struct Scene {
    tree: Rc<RefCell<SceneTree>>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Empty scene containing only the root node.
    pub fn new() -> Self {
        let mut tree = SceneTree {
            nodes: Vec::new(),
            generations: Vec::new(),
            free: Vec::new(),
            next_connection: 0,
            root: NodeId { index: 0, generation: 0 },
        };
        tree.root = tree.allocate(NativeClass::Root);
        Self {
            tree: Rc::new(RefCell::new(tree)),
        }
    }

    pub fn root(&self) -> NodeId {
        self.tree.borrow().root
    }

    pub fn create(&self, class: NativeClass) -> NodeId {
        self.tree.borrow_mut().allocate(class)
    }

    pub fn is_alive(&self, id: NodeId) -> bool {
        self.tree.borrow().node(id).is_some()
    }

    /// Live nodes, root included.
    pub fn node_count(&self) -> usize {
        self.tree.borrow().nodes.iter().filter(|n| n.is_some()).count()
    }

    pub fn class(&self, id: NodeId) -> Result<NativeClass> {
        self.tree
            .borrow()
            .node(id)
            .map(|n| n.class.clone())
            .ok_or(Error::FreedNode(id))
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.tree.borrow().node(id)?.parent
    }

    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.tree
            .borrow()
            .node(id)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    // =========================================================================
    // Hierarchy
    // =========================================================================

    /// Append `child` as the last child of `parent`, detaching it from any
    /// previous parent first.
    pub fn add_child(&self, parent: NodeId, child: NodeId) {
        let previous = {
            let tree = self.tree.borrow();
            if tree.node(parent).is_none() || tree.node(child).is_none() {
                trace!(%parent, %child, "add_child on freed node ignored");
                return;
            }
            if parent == child || tree.is_ancestor(child, parent) {
                warn!(%parent, %child, "add_child would create a cycle");
                return;
            }
            tree.node(child).and_then(|n| n.parent)
        };

        if let Some(previous) = previous {
            self.remove_child(previous, child);
        }

        {
            let mut tree = self.tree.borrow_mut();
            if let Some(node) = tree.node_mut(child) {
                node.parent = Some(parent);
            }
            if let Some(node) = tree.node_mut(parent) {
                node.children.push(child);
            }
        }
        self.emit(parent, SceneSignal::ChildEnteredTree, SignalArgs::Node(child));
    }

    /// Move `child` to position `index` among its siblings (clamped).
    pub fn move_child(&self, parent: NodeId, child: NodeId, index: usize) {
        let mut tree = self.tree.borrow_mut();
        let Some(node) = tree.node_mut(parent) else { return };
        let Some(from) = node.children.iter().position(|c| *c == child) else {
            trace!(%parent, %child, "move_child on non-child ignored");
            return;
        };
        let moved = node.children.remove(from);
        let to = index.min(node.children.len());
        node.children.insert(to, moved);
    }

    /// Detach `child` from `parent`. The child stays alive.
    pub fn remove_child(&self, parent: NodeId, child: NodeId) {
        let is_child = self
            .tree
            .borrow()
            .node(parent)
            .is_some_and(|n| n.children.contains(&child));
        if !is_child {
            trace!(%parent, %child, "remove_child on non-child ignored");
            return;
        }

        self.emit(parent, SceneSignal::ChildExitingTree, SignalArgs::Node(child));

        let mut tree = self.tree.borrow_mut();
        if let Some(node) = tree.node_mut(parent) {
            node.children.retain(|c| *c != child);
        }
        if let Some(node) = tree.node_mut(child) {
            node.parent = None;
        }
    }

    /// Detach and free a node and its whole subtree.
    pub fn free(&self, id: NodeId) {
        if id == self.root() {
            warn!("the scene root cannot be freed");
            return;
        }
        if let Some(parent) = self.parent(id) {
            self.remove_child(parent, id);
        }
        self.tree.borrow_mut().release(id);
    }

    // =========================================================================
    // Properties
    // =========================================================================

    pub fn set(&self, id: NodeId, key: &str, value: impl Into<Variant>) {
        match self.tree.borrow_mut().node_mut(id) {
            Some(node) => {
                node.properties.insert(key.to_string(), value.into());
            }
            None => trace!(node = %id, key, "set on freed node ignored"),
        }
    }

    pub fn unset(&self, id: NodeId, key: &str) {
        if let Some(node) = self.tree.borrow_mut().node_mut(id) {
            node.properties.shift_remove(key);
        }
    }

    pub fn get(&self, id: NodeId, key: &str) -> Option<Variant> {
        self.tree.borrow().node(id)?.properties.get(key).cloned()
    }

    /// Strict property lookup: fails on a freed node.
    pub fn try_get(&self, id: NodeId, key: &str) -> Result<Option<Variant>> {
        let tree = self.tree.borrow();
        let node = tree.node(id).ok_or(Error::FreedNode(id))?;
        Ok(node.properties.get(key).cloned())
    }

    // =========================================================================
    // Theme Overrides
    // =========================================================================

    fn with_theme(&self, id: NodeId, f: impl FnOnce(&mut ThemeOverrides)) {
        if let Some(node) = self.tree.borrow_mut().node_mut(id) {
            f(&mut node.theme);
        }
    }

    pub fn set_theme_constant(&self, id: NodeId, name: &str, value: i64) {
        self.with_theme(id, |t| {
            t.constants.insert(name.to_string(), value);
        });
    }

    pub fn clear_theme_constant(&self, id: NodeId, name: &str) {
        self.with_theme(id, |t| {
            t.constants.remove(name);
        });
    }

    pub fn theme_constant(&self, id: NodeId, name: &str) -> Option<i64> {
        self.tree.borrow().node(id)?.theme.constants.get(name).copied()
    }

    pub fn set_theme_color(&self, id: NodeId, name: &str, value: Rgba) {
        self.with_theme(id, |t| {
            t.colors.insert(name.to_string(), value);
        });
    }

    pub fn clear_theme_color(&self, id: NodeId, name: &str) {
        self.with_theme(id, |t| {
            t.colors.remove(name);
        });
    }

    pub fn theme_color(&self, id: NodeId, name: &str) -> Option<Rgba> {
        self.tree.borrow().node(id)?.theme.colors.get(name).copied()
    }

    pub fn set_theme_font_size(&self, id: NodeId, name: &str, value: i64) {
        self.with_theme(id, |t| {
            t.font_sizes.insert(name.to_string(), value);
        });
    }

    pub fn clear_theme_font_size(&self, id: NodeId, name: &str) {
        self.with_theme(id, |t| {
            t.font_sizes.remove(name);
        });
    }

    pub fn theme_font_size(&self, id: NodeId, name: &str) -> Option<i64> {
        self.tree.borrow().node(id)?.theme.font_sizes.get(name).copied()
    }

    pub fn set_theme_stylebox(&self, id: NodeId, name: &str, value: StyleBox) {
        self.with_theme(id, |t| {
            t.styleboxes.insert(name.to_string(), value);
        });
    }

    pub fn clear_theme_stylebox(&self, id: NodeId, name: &str) {
        self.with_theme(id, |t| {
            t.styleboxes.remove(name);
        });
    }

    pub fn theme_stylebox(&self, id: NodeId, name: &str) -> Option<StyleBox> {
        self.tree.borrow().node(id)?.theme.styleboxes.get(name).cloned()
    }

    // =========================================================================
    // Geometry
    // =========================================================================

    pub fn size(&self, id: NodeId) -> Vec2 {
        self.tree.borrow().node(id).map(|n| n.size).unwrap_or_default()
    }

    /// Resize a node. Emits [`SceneSignal::Resized`] when the size changes.
    pub fn set_size(&self, id: NodeId, size: Vec2) {
        let changed = match self.tree.borrow_mut().node_mut(id) {
            Some(node) if node.size != size => {
                node.size = size;
                true
            }
            _ => false,
        };
        if changed {
            self.emit(id, SceneSignal::Resized, SignalArgs::None);
        }
    }

    pub fn min_size(&self, id: NodeId) -> Vec2 {
        self.tree.borrow().node(id).map(|n| n.min_size).unwrap_or_default()
    }

    pub fn set_min_size(&self, id: NodeId, min_size: Vec2) {
        if let Some(node) = self.tree.borrow_mut().node_mut(id) {
            node.min_size = min_size;
        }
    }

    // =========================================================================
    // Signals
    // =========================================================================

    /// Connect a handler. Fails when the node is freed or its class never
    /// emits `signal`.
    pub fn connect(
        &self,
        id: NodeId,
        signal: SceneSignal,
        handler: impl Fn(&Scene, &SignalArgs) + 'static,
    ) -> Result<ConnectionId> {
        let mut tree = self.tree.borrow_mut();
        let connection = ConnectionId(tree.next_connection);
        let node = tree.node_mut(id).ok_or(Error::FreedNode(id))?;
        if !signal.is_supported_by(&node.class) {
            return Err(Error::UnsupportedSignal {
                class: node.class.clone(),
                signal,
            });
        }
        node.connections.push(Connection {
            id: connection,
            signal,
            handler: Rc::new(handler),
        });
        tree.next_connection += 1;
        Ok(connection)
    }

    pub fn disconnect(&self, id: NodeId, connection: ConnectionId) {
        if let Some(node) = self.tree.borrow_mut().node_mut(id) {
            node.connections.retain(|c| c.id != connection);
        }
    }

    pub fn connection_count(&self, id: NodeId, signal: SceneSignal) -> usize {
        self.tree
            .borrow()
            .node(id)
            .map(|n| n.connections.iter().filter(|c| c.signal == signal).count())
            .unwrap_or(0)
    }

    /// Invoke every handler connected to `signal` on `id`, in connection
    /// order. Handlers run with no borrow held and may mutate the scene.
    pub fn emit(&self, id: NodeId, signal: SceneSignal, args: SignalArgs) {
        let handlers: Vec<SignalHandler> = {
            let tree = self.tree.borrow();
            let Some(node) = tree.node(id) else { return };
            node.connections
                .iter()
                .filter(|c| c.signal == signal)
                .map(|c| Rc::clone(&c.handler))
                .collect()
        };
        for handler in handlers {
            handler(self, &args);
        }
    }

    // =========================================================================
    // Input Helpers
    // =========================================================================

    /// Activate a button.
    pub fn press(&self, id: NodeId) {
        self.emit(id, SceneSignal::Pressed, SignalArgs::None);
    }

    /// Left-button press and release over a control.
    pub fn click(&self, id: NodeId) {
        for pressed in [true, false] {
            let event = InputEvent::MouseButton {
                button: MouseButton::Left,
                pressed,
                position: Vec2::ZERO,
            };
            self.emit(id, SceneSignal::GuiInput, SignalArgs::Input(event));
        }
    }

    /// Set a slider's value, clamped to its range and snapped to its step.
    /// Emits [`SceneSignal::ValueChanged`] when the value changes.
    pub fn set_value(&self, id: NodeId, value: f64) {
        let read = |key: &str, default: f64| {
            self.get(id, key).and_then(|v| v.as_f64()).unwrap_or(default)
        };
        let min = read("min_value", 0.0);
        let max = read("max_value", 100.0).max(min);
        let step = read("step", 1.0);
        let current = read("value", min);

        let mut next = value.clamp(min, max);
        if step > 0.0 {
            next = (min + ((next - min) / step).round() * step).min(max);
        }
        if !next.is_finite() || next == current {
            return;
        }
        self.set(id, "value", next);
        self.emit(id, SceneSignal::ValueChanged, SignalArgs::Float(next));
    }

    /// Replace a text field's content as if typed. Emits
    /// [`SceneSignal::TextChanged`].
    pub fn input_text(&self, id: NodeId, text: &str) {
        if !self.is_alive(id) {
            return;
        }
        self.set(id, "text", text);
        self.emit(id, SceneSignal::TextChanged, SignalArgs::Text(text.to_string()));
    }

    /// Submit a text field (enter key).
    pub fn submit_text(&self, id: NodeId) {
        let text = self
            .get(id, "text")
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default();
        self.emit(id, SceneSignal::TextSubmitted, SignalArgs::Text(text));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    fn setup() -> (Scene, NodeId) {
        let scene = Scene::new();
        let root = scene.root();
        (scene, root)
    }

    // =========================================================================
    // Hierarchy
    // =========================================================================

    #[test]
    fn test_add_and_order_children() {
        let (scene, root) = setup();
        let a = scene.create(NativeClass::Label);
        let b = scene.create(NativeClass::Button);
        scene.add_child(root, a);
        scene.add_child(root, b);
        assert_eq!(scene.children(root), vec![a, b]);

        scene.move_child(root, b, 0);
        assert_eq!(scene.children(root), vec![b, a]);

        scene.move_child(root, b, 99);
        assert_eq!(scene.children(root), vec![a, b]);
    }

    #[test]
    fn test_reparent_detaches_from_old_parent() {
        let (scene, root) = setup();
        let vbox = scene.create(NativeClass::VBox);
        let label = scene.create(NativeClass::Label);
        scene.add_child(root, vbox);
        scene.add_child(root, label);
        scene.add_child(vbox, label);
        assert_eq!(scene.children(root), vec![vbox]);
        assert_eq!(scene.parent(label), Some(vbox));
    }

    #[test]
    fn test_cycles_rejected() {
        let (scene, root) = setup();
        let outer = scene.create(NativeClass::VBox);
        let inner = scene.create(NativeClass::HBox);
        scene.add_child(root, outer);
        scene.add_child(outer, inner);
        scene.add_child(inner, outer);
        assert_eq!(scene.parent(outer), Some(root));
    }

    #[test]
    fn test_free_is_recursive_and_reuses_slots() {
        let (scene, root) = setup();
        let vbox = scene.create(NativeClass::VBox);
        let label = scene.create(NativeClass::Label);
        scene.add_child(root, vbox);
        scene.add_child(vbox, label);
        assert_eq!(scene.node_count(), 3);

        scene.free(vbox);
        assert!(!scene.is_alive(vbox));
        assert!(!scene.is_alive(label));
        assert!(scene.children(root).is_empty());
        assert_eq!(scene.node_count(), 1);

        let reused = scene.create(NativeClass::Control);
        assert!(reused.index == vbox.index || reused.index == label.index);
        assert!(!scene.is_alive(vbox) && !scene.is_alive(label));
    }

    #[test]
    fn test_freed_node_strict_and_lenient() {
        let (scene, _) = setup();
        let label = scene.create(NativeClass::Label);
        scene.free(label);
        scene.set(label, "text", "ghost");
        assert!(scene.get(label, "text").is_none());
        assert!(matches!(scene.try_get(label, "text"), Err(Error::FreedNode(id)) if id == label));
        assert!(matches!(scene.class(label), Err(Error::FreedNode(_))));
    }

    // =========================================================================
    // Signals
    // =========================================================================

    #[test]
    fn test_child_signals_order() {
        let (scene, root) = setup();
        let log = Rc::new(RefCell::new(Vec::new()));
        let entered = log.clone();
        scene
            .connect(root, SceneSignal::ChildEnteredTree, move |scene, args| {
                if let SignalArgs::Node(child) = args {
                    entered.borrow_mut().push(("enter", scene.parent(*child).is_some()));
                }
            })
            .unwrap();
        let exiting = log.clone();
        scene
            .connect(root, SceneSignal::ChildExitingTree, move |scene, args| {
                if let SignalArgs::Node(child) = args {
                    exiting.borrow_mut().push(("exit", scene.parent(*child).is_some()));
                }
            })
            .unwrap();

        let label = scene.create(NativeClass::Label);
        scene.add_child(root, label);
        scene.free(label);
        // Entered after attach, exiting before detach.
        assert_eq!(*log.borrow(), vec![("enter", true), ("exit", true)]);
    }

    #[test]
    fn test_unsupported_signal() {
        let (scene, _) = setup();
        let label = scene.create(NativeClass::Label);
        let result = scene.connect(label, SceneSignal::Pressed, |_, _| {});
        assert!(matches!(result, Err(Error::UnsupportedSignal { .. })));
    }

    #[test]
    fn test_disconnect() {
        let (scene, _) = setup();
        let button = scene.create(NativeClass::Button);
        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        let conn = scene
            .connect(button, SceneSignal::Pressed, move |_, _| counter.set(counter.get() + 1))
            .unwrap();
        scene.press(button);
        scene.disconnect(button, conn);
        scene.press(button);
        assert_eq!(hits.get(), 1);
        assert_eq!(scene.connection_count(button, SceneSignal::Pressed), 0);
    }

    #[test]
    fn test_handlers_may_mutate_scene() {
        let (scene, root) = setup();
        let button = scene.create(NativeClass::Button);
        scene.add_child(root, button);
        scene
            .connect(button, SceneSignal::Pressed, |scene, _| {
                let label = scene.create(NativeClass::Label);
                scene.add_child(scene.root(), label);
            })
            .unwrap();
        scene.press(button);
        assert_eq!(scene.children(root).len(), 2);
    }

    #[test]
    fn test_resized_only_on_change() {
        let (scene, _) = setup();
        let vbox = scene.create(NativeClass::VBox);
        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        scene
            .connect(vbox, SceneSignal::Resized, move |_, _| counter.set(counter.get() + 1))
            .unwrap();
        scene.set_size(vbox, Vec2::new(100.0, 20.0));
        scene.set_size(vbox, Vec2::new(100.0, 20.0));
        assert_eq!(hits.get(), 1);
    }

    // =========================================================================
    // Input helpers
    // =========================================================================

    #[test]
    fn test_slider_value_clamps_and_snaps() {
        let (scene, _) = setup();
        let slider = scene.create(NativeClass::Slider);
        scene.set(slider, "min_value", 0.0);
        scene.set(slider, "max_value", 10.0);
        scene.set(slider, "step", 0.5);

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        scene
            .connect(slider, SceneSignal::ValueChanged, move |_, args| {
                if let SignalArgs::Float(v) = args {
                    sink.borrow_mut().push(*v);
                }
            })
            .unwrap();

        scene.set_value(slider, 3.3);
        scene.set_value(slider, 42.0);
        scene.set_value(slider, 10.0);
        assert_eq!(*seen.borrow(), vec![3.5, 10.0]);
    }

    #[test]
    fn test_text_input_helpers() {
        let (scene, _) = setup();
        let edit = scene.create(NativeClass::LineEdit);
        let submitted = Rc::new(RefCell::new(String::new()));
        let sink = submitted.clone();
        scene
            .connect(edit, SceneSignal::TextSubmitted, move |_, args| {
                if let SignalArgs::Text(text) = args {
                    *sink.borrow_mut() = text.clone();
                }
            })
            .unwrap();
        scene.input_text(edit, "hello");
        scene.submit_text(edit);
        assert_eq!(*submitted.borrow(), "hello");
    }

    #[test]
    fn test_theme_overrides() {
        let (scene, _) = setup();
        let hbox = scene.create(NativeClass::HBox);
        scene.set_theme_constant(hbox, "separation", 8);
        assert_eq!(scene.theme_constant(hbox, "separation"), Some(8));
        scene.clear_theme_constant(hbox, "separation");
        assert_eq!(scene.theme_constant(hbox, "separation"), None);
    }
}
