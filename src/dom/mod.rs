//! DOM - node proxies and the widgets behind them.
//!
//! - [`NodeProxy`] - owns one native node, its committed props, its
//!   effective style and its attached callbacks
//! - [`Widget`] - per-kind translation of props and style into native state
//! - [`WidgetRegistry`] - open kind → widget factory mapping
//! - [`HandlerSlots`] - named callback slots, detached before re-attaching
//!
//! Widgets receive an [`UpdateContext`] holding only what changed, so every
//! native mutation corresponds to a prop or style key that actually moved.

mod control;
mod handlers;
mod layout;
mod proxy;
mod registry;
mod widgets;

pub use handlers::{bind_callback, connect, invoke, HandlerSlots, Unsubscribe};
pub use proxy::{NodeProxy, ProxyHandle, UpdateContext, Widget};
pub use registry::{WidgetFactory, WidgetRegistry};
pub use widgets::{
    BoxWidget, ButtonWidget, ContainerWidget, LabelWidget, MarginWidget, PanelWidget, SliderWidget,
    TextInputWidget, TextureWidget,
};
pub use control::apply_control_props;
