//! Document - the root container and the host side of reconciliation.

use std::cell::{Ref, RefCell};

use tracing::{debug, trace};

use crate::config::DocumentConfig;
use crate::dom::{NodeProxy, ProxyHandle, Widget, WidgetRegistry};
use crate::props::{prepare_update, PropMap, PropValue, Props, UpdatePayload};
use crate::scene::{NodeId, Scene};
use crate::style::StyleSheet;

use super::children::ChildList;
use super::host_config::HostConfig;

/// Root container plus everything a proxy needs to be created: the scene,
/// the shared style sheet and the widget registry.
///
/// Top-level proxies are kept in a [`ChildList`] and mirrored 1:1 into the
/// children of the document's native root node.
pub struct Document {
    scene: Scene,
    root: NodeId,
    config: DocumentConfig,
    sheet: StyleSheet,
    registry: RefCell<WidgetRegistry>,
    children: RefCell<ChildList<ProxyHandle>>,
}

impl Document {
    /// Document rooted at the scene root, with default settings.
    pub fn new(scene: &Scene) -> Self {
        Self::with_config(scene, DocumentConfig::default())
    }

    pub fn with_config(scene: &Scene, config: DocumentConfig) -> Self {
        Self::with_root(scene, scene.root(), config)
    }

    /// Document mounted under an existing native node.
    pub fn with_root(scene: &Scene, root: NodeId, config: DocumentConfig) -> Self {
        let sheet = config.style_sheet();
        let mut registry = WidgetRegistry::with_builtins();
        registry.set_fallback(&config.fallback_kind);
        Self {
            scene: scene.clone(),
            root,
            config,
            sheet,
            registry: RefCell::new(registry),
            children: RefCell::new(ChildList::new()),
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn config(&self) -> &DocumentConfig {
        &self.config
    }

    pub fn style_sheet(&self) -> &StyleSheet {
        &self.sheet
    }

    /// Top-level proxies in container order.
    pub fn children(&self) -> Ref<'_, [ProxyHandle]> {
        Ref::map(self.children.borrow(), ChildList::as_slice)
    }

    /// Register (or replace) the widget for an element kind.
    pub fn register_widget(&self, kind: &str, factory: impl Fn(&PropMap) -> Box<dyn Widget> + 'static) {
        debug!(kind, "widget registered");
        self.registry.borrow_mut().register(kind, factory);
    }

    /// Mirror a proxy list position into the native tree.
    fn place(&self, parent: NodeId, child: NodeId, index: usize) {
        if self.scene.parent(child) != Some(parent) {
            self.scene.add_child(parent, child);
        }
        self.scene.move_child(parent, child, index);
    }

    /// Release a proxy subtree and free its native nodes.
    fn destroy(&self, child: &ProxyHandle) {
        let node = child.node();
        child.borrow_mut().release();
        self.scene.free(node);
    }
}

impl HostConfig for Document {
    type Instance = ProxyHandle;

    fn create_instance(&self, kind: &str, props: &Props) -> ProxyHandle {
        let widget = self.registry.borrow().create(kind, props);
        let proxy = NodeProxy::new(kind, widget, &self.scene, &self.sheet, props);
        trace!(kind, node = %proxy.node(), "instance created");
        ProxyHandle::new(proxy)
    }

    fn create_text_instance(&self, text: &str) -> ProxyHandle {
        let props = crate::props! { "children" => text };
        self.create_instance("label", &props)
    }

    fn should_set_text_content(&self, kind: &str, props: &Props) -> bool {
        self.config.is_text_kind(kind) && props.get("children").is_some_and(PropValue::is_all_text)
    }

    fn append_child(&self, parent: &ProxyHandle, child: &ProxyHandle) {
        let index = parent.borrow_mut().children.append(child.clone());
        self.place(parent.node(), child.node(), index);
    }

    fn append_child_to_container(&self, child: &ProxyHandle) {
        let index = self.children.borrow_mut().append(child.clone());
        self.place(self.root, child.node(), index);
    }

    fn insert_before(&self, parent: &ProxyHandle, child: &ProxyHandle, before: &ProxyHandle) {
        let index = parent.borrow_mut().children.insert_before(child.clone(), before);
        self.place(parent.node(), child.node(), index);
    }

    fn insert_in_container_before(&self, child: &ProxyHandle, before: &ProxyHandle) {
        let index = self.children.borrow_mut().insert_before(child.clone(), before);
        self.place(self.root, child.node(), index);
    }

    fn remove_child(&self, parent: &ProxyHandle, child: &ProxyHandle) {
        if parent.borrow_mut().children.remove(child).is_none() {
            trace!(parent = %parent.node(), child = %child.node(), "removing a proxy that was not attached");
        }
        self.destroy(child);
    }

    fn remove_child_from_container(&self, child: &ProxyHandle) {
        if self.children.borrow_mut().remove(child).is_none() {
            trace!(child = %child.node(), "removing a proxy that was not in the container");
        }
        self.destroy(child);
    }

    fn clear_container(&self) {
        let children = self.children.borrow_mut().clear();
        for child in children.iter().rev() {
            self.destroy(child);
        }
    }

    fn prepare_update(&self, _instance: &ProxyHandle, old: Option<&Props>, new: &Props) -> UpdatePayload {
        prepare_update(old, new)
    }

    fn commit_update(&self, instance: &ProxyHandle, payload: &UpdatePayload) {
        instance.borrow_mut().update_props(payload);
    }

    fn commit_text_update(&self, instance: &ProxyHandle, text: &str) {
        instance.borrow_mut().set_text(text);
    }
}
