//! Bridge - state and events between the host and the UI runtime.
//!
//! Host side:
//! - [`HostBridge`] - versioned snapshot, event queue, dispatch listeners
//! - [`StateStore`] - named slices merged into one published snapshot
//!
//! UI side:
//! - [`BridgeClient`] - cached snapshot reads, event draining, dispatch
//! - [`PollLoop`] - per-frame change detection, active only while subscribed
//! - [`BridgeState`] - the snapshot as a reactive signal
//!
//! The wire format is JSON text; see [`BridgeEvent`] and [`DispatchAction`].

mod client;
mod host;
mod poll;
mod state;
mod store;
mod wire;

pub use client::BridgeClient;
pub use host::{default_bridge, set_default_bridge, DispatchListener, HostBridge, ListenerId};
pub use poll::{PollLoop, Unsubscribe};
pub use state::BridgeState;
pub use store::StateStore;
pub use wire::{BridgeEvent, DispatchAction};
