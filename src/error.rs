//! Crate error type.
//!
//! Only configuration loading and strict scene lookups return these. The
//! reconciler, style and bridge operations recover locally and never
//! surface an error to their caller.

use crate::scene::{NativeClass, NodeId, SceneSignal};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("malformed json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("native node {0} has been freed")]
    FreedNode(NodeId),

    #[error("{class:?} does not emit {signal:?}")]
    UnsupportedSignal {
        class: NativeClass,
        signal: SceneSignal,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
