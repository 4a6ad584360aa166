//! Props - dynamic prop values and the prop diff engine.
//!
//! - [`PropValue`] / [`PropMap`] / [`Props`] - the data a virtual node carries
//! - [`prepare_update`] - minimal payload between two committed prop sets
//!
//! # Example
//!
//! ```
//! use spark_bridge::props;
//! use spark_bridge::props::prepare_update;
//!
//! let before = props! { "class" => "p-4", "text" => "Ready" };
//! let after = props! { "class" => "p-4", "text" => "Go!" };
//!
//! let payload = prepare_update(Some(&before), &after);
//! assert_eq!(payload.len(), 1);
//! assert!(payload.contains_key("text"));
//! ```

mod diff;
mod value;

pub use diff::{apply_payload, prepare_update, UpdatePayload};
pub use value::{Callback, PropMap, PropValue, Props, Resource, StyleObject};
