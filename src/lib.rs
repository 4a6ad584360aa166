//! # spark-bridge
//!
//! Drive a retained-mode native scene graph from a declarative UI, and keep
//! application state and events in sync between the host and the UI runtime.
//!
//! Built on [spark-signals](https://github.com/RLabs-Inc/spark-signals) for the
//! reactive view of bridge state.
//!
//! ## Architecture
//!
//! A renderer produces virtual trees; the reconciler turns the differences
//! into create/insert/remove/commit operations against a [`Document`]. Each
//! live element is a [`NodeProxy`] owning one native node. Props are diffed
//! into minimal payloads, utility classes compile into style objects through
//! a shared memoized [`StyleSheet`], and widgets translate both into native
//! properties and theme overrides.
//!
//! ```text
//! VNode tree → Renderer → HostConfig (Document) → NodeProxy → Widget → Scene
//!                                                     ↑
//!                             class tokens → StyleSheet → effective style
//! ```
//!
//! The bridge runs beside it:
//!
//! ```text
//! host tick: StateStore / HostBridge::emit ──► (version, state) + event queue
//! UI frame:  PollLoop ──► drain events ──► notify state listeners ──► re-render
//! UI → host: BridgeClient::dispatch ──► HostBridge listeners
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Colors, size flags, alignment and layout directives
//! - [`props`] - Prop values and the prop diff engine
//! - [`style`] - Utility-class compiler and the memoized style sheet
//! - [`scene`] - Reference retained-mode scene graph
//! - [`dom`] - Node proxies, widgets and the widget registry
//! - [`reconciler`] - Host mutation contract, document and renderer
//! - [`bridge`] - Versioned state/event bridge and the UI poll loop
//! - [`scheduler`] - Timer queue and per-frame callbacks
//! - [`config`] - Document configuration

pub mod bridge;
pub mod config;
pub mod dom;
pub mod error;
pub mod props;
pub mod reconciler;
pub mod scene;
pub mod scheduler;
pub mod style;
pub mod types;

pub use types::*;

pub use error::{Error, Result};

pub use props::{prepare_update, Callback, PropMap, PropValue, Props, Resource, StyleObject, UpdatePayload};

pub use style::{compile_class_token, Compiler, StyleSheet};

pub use scene::{NativeClass, NodeId, Scene, SceneSignal};

pub use dom::{NodeProxy, ProxyHandle, Widget, WidgetRegistry};

pub use reconciler::{Document, HostConfig, Renderer, VNode};

pub use bridge::{
    default_bridge, set_default_bridge, BridgeClient, BridgeEvent, BridgeState, DispatchAction,
    HostBridge, PollLoop, StateStore,
};

pub use scheduler::{FrameScheduler, Scheduler};

pub use config::DocumentConfig;
