//! Virtual nodes and a positional renderer over any [`HostConfig`].
//!
//! The renderer is the smallest engine that speaks the host contract: it
//! keeps the previously rendered tree, matches new nodes to old ones by
//! position and kind, and issues create/insert/remove/commit operations for
//! the differences. Unkeyed, so a node that changes kind is replaced.

use std::rc::Rc;

use crate::props::{PropValue, Props};

use super::host_config::HostConfig;

/// Immutable description of one element, produced per render pass.
#[derive(Debug, Clone)]
pub enum VNode {
    Element {
        kind: String,
        props: Props,
        children: Vec<VNode>,
    },
    Text(String),
}

impl VNode {
    pub fn element(kind: impl Into<String>, props: Props, children: Vec<VNode>) -> Self {
        Self::Element {
            kind: kind.into(),
            props,
            children,
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }
}

/// One rendered node and the host instance behind it.
struct Mounted<I> {
    kind: Option<String>,
    props: Props,
    text: String,
    instance: I,
    children: Vec<Mounted<I>>,
}

impl<I> Mounted<I> {
    fn matches(&self, vnode: &VNode) -> bool {
        match vnode {
            VNode::Element { kind, .. } => self.kind.as_deref() == Some(kind.as_str()),
            VNode::Text(_) => self.kind.is_none(),
        }
    }
}

/// Where a list of children lives.
enum Parent<'a, I> {
    Container,
    Instance(&'a I),
}

impl<I> Parent<'_, I> {
    fn append<H: HostConfig<Instance = I>>(&self, host: &H, child: &I) {
        match self {
            Self::Container => host.append_child_to_container(child),
            Self::Instance(parent) => host.append_child(parent, child),
        }
    }

    fn insert_before<H: HostConfig<Instance = I>>(&self, host: &H, child: &I, before: &I) {
        match self {
            Self::Container => host.insert_in_container_before(child, before),
            Self::Instance(parent) => host.insert_before(parent, child, before),
        }
    }

    fn remove<H: HostConfig<Instance = I>>(&self, host: &H, child: &I) {
        match self {
            Self::Container => host.remove_child_from_container(child),
            Self::Instance(parent) => host.remove_child(parent, child),
        }
    }
}

pub struct Renderer<H: HostConfig> {
    host: H,
    roots: Vec<Mounted<H::Instance>>,
}

impl<H: HostConfig> Renderer<H> {
    pub fn new(host: H) -> Self {
        Self {
            host,
            roots: Vec::new(),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Instances of the top-level nodes, in order.
    pub fn roots(&self) -> impl Iterator<Item = &H::Instance> {
        self.roots.iter().map(|m| &m.instance)
    }

    /// Bring the host tree in line with `nodes`.
    pub fn render(&mut self, nodes: &[VNode]) {
        let previous = std::mem::take(&mut self.roots);
        self.roots = reconcile_children(&self.host, Parent::Container, previous, nodes);
    }

    /// Remove everything this renderer mounted.
    pub fn unmount(&mut self) {
        self.roots.clear();
        self.host.clear_container();
    }
}

/// Props as the host sees them: all-text children are folded into a
/// `children` prop.
fn element_props(props: &Props, children: &[VNode]) -> Props {
    let texts: Option<Vec<&str>> = children
        .iter()
        .map(|child| match child {
            VNode::Text(text) => Some(text.as_str()),
            VNode::Element { .. } => None,
        })
        .collect();
    match texts {
        Some(texts) if !texts.is_empty() => {
            let value = match texts.as_slice() {
                [single] => PropValue::from(*single),
                many => PropValue::from(many.iter().map(|t| PropValue::from(*t)).collect::<Vec<_>>()),
            };
            let mut merged = props.as_ref().clone();
            merged.insert("children".into(), value);
            Rc::new(merged)
        }
        _ => Rc::clone(props),
    }
}

fn mount<H: HostConfig>(host: &H, vnode: &VNode) -> Mounted<H::Instance> {
    match vnode {
        VNode::Text(text) => Mounted {
            kind: None,
            props: Props::default(),
            text: text.clone(),
            instance: host.create_text_instance(text),
            children: Vec::new(),
        },
        VNode::Element { kind, props, children } => {
            let props = element_props(props, children);
            let instance = host.create_instance(kind, &props);
            let mut mounted_children = Vec::new();
            if !host.should_set_text_content(kind, &props) {
                for child in children {
                    let child = mount(host, child);
                    host.append_initial_child(&instance, &child.instance);
                    mounted_children.push(child);
                }
            }
            Mounted {
                kind: Some(kind.clone()),
                props,
                text: String::new(),
                instance,
                children: mounted_children,
            }
        }
    }
}

fn update<H: HostConfig>(host: &H, mut mounted: Mounted<H::Instance>, vnode: &VNode) -> Mounted<H::Instance> {
    match vnode {
        VNode::Text(text) => {
            if mounted.text != *text {
                host.commit_text_update(&mounted.instance, text);
                mounted.text = text.clone();
            }
        }
        VNode::Element { kind, props, children } => {
            let props = element_props(props, children);
            let payload = host.prepare_update(&mounted.instance, Some(&mounted.props), &props);
            if !payload.is_empty() {
                host.commit_update(&mounted.instance, &payload);
            }
            let previous = std::mem::take(&mut mounted.children);
            let parent = Parent::Instance(&mounted.instance);
            mounted.children = if host.should_set_text_content(kind, &props) {
                for child in &previous {
                    parent.remove(host, &child.instance);
                }
                Vec::new()
            } else {
                reconcile_children(host, parent, previous, children)
            };
            mounted.props = props;
        }
    }
    mounted
}

fn reconcile_children<H: HostConfig>(
    host: &H,
    parent: Parent<'_, H::Instance>,
    previous: Vec<Mounted<H::Instance>>,
    next: &[VNode],
) -> Vec<Mounted<H::Instance>> {
    let mut previous = previous.into_iter();
    let mut result = Vec::with_capacity(next.len());

    for vnode in next {
        let mounted = match previous.next() {
            Some(old) if old.matches(vnode) => update(host, old, vnode),
            Some(old) => {
                let fresh = mount(host, vnode);
                parent.insert_before(host, &fresh.instance, &old.instance);
                parent.remove(host, &old.instance);
                fresh
            }
            None => {
                let fresh = mount(host, vnode);
                parent.append(host, &fresh.instance);
                fresh
            }
        };
        result.push(mounted);
    }
    for old in previous {
        parent.remove(host, &old.instance);
    }
    result
}
