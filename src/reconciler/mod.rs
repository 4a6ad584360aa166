//! Reconciler - the seam between a declarative renderer and the scene.
//!
//! - [`HostConfig`] - create/append/insert/remove/commit operation set
//! - [`Document`] - the host side of that contract over a [`Scene`](crate::scene::Scene)
//! - [`Renderer`] / [`VNode`] - a positional renderer that drives any host
//! - [`ChildList`] - ordered children with move semantics
//!
//! # Example
//!
//! ```
//! use spark_bridge::props;
//! use spark_bridge::reconciler::{Document, Renderer, VNode};
//! use spark_bridge::scene::Scene;
//!
//! let scene = Scene::new();
//! let mut renderer = Renderer::new(Document::new(&scene));
//!
//! renderer.render(&[VNode::element(
//!     "vbox",
//!     props! { "class" => "gap-2 p-4" },
//!     vec![VNode::element("label", props! {}, vec![VNode::text("Score: 0")])],
//! )]);
//!
//! assert_eq!(scene.children(scene.root()).len(), 1);
//! ```

mod children;
mod document;
mod host_config;
mod render;

pub use children::ChildList;
pub use document::Document;
pub use host_config::HostConfig;
pub use render::{Renderer, VNode};
