//! Wire records exchanged across the bridge.
//!
//! Event records serialize as `{"type": <string>, "payload": <any>}`,
//! dispatch actions as `{"type": <string>, "payload"?: <any>}`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// One-shot host → UI notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeEvent {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub payload: Value,
}

impl BridgeEvent {
    pub fn new(kind: impl Into<String>, payload: Value) -> Self {
        Self {
            kind: kind.into(),
            payload,
        }
    }
}

/// One-shot UI → host command.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DispatchAction {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

impl DispatchAction {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            payload: None,
        }
    }

    pub fn with_payload(kind: impl Into<String>, payload: Value) -> Self {
        Self {
            kind: kind.into(),
            payload: Some(payload),
        }
    }

    /// Parse an action, tolerating malformed fields: a missing or non-string
    /// `type` becomes `""`, a missing or null `payload` becomes `None`, and
    /// text that is not a JSON object yields the empty action.
    pub fn from_json(text: &str) -> Self {
        match serde_json::from_str::<Value>(text) {
            Ok(value) => Self::from_value(&value),
            Err(err) => {
                debug!(%err, "malformed dispatch action");
                Self::default()
            }
        }
    }

    pub fn from_value(value: &Value) -> Self {
        let Some(object) = value.as_object() else {
            debug!("dispatch action is not an object");
            return Self::default();
        };
        Self {
            kind: object.get("type").and_then(Value::as_str).unwrap_or_default().to_string(),
            payload: object.get("payload").filter(|p| !p.is_null()).cloned(),
        }
    }

    pub fn is(&self, kind: &str) -> bool {
        self.kind == kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_wire_shape() {
        let event = BridgeEvent::new("levelUp", json!({ "level": 3 }));
        let text = serde_json::to_string(&event).unwrap();
        assert_eq!(text, r#"{"type":"levelUp","payload":{"level":3}}"#);
    }

    #[test]
    fn test_event_without_payload_parses() {
        let event: BridgeEvent = serde_json::from_str(r#"{"type":"ping"}"#).unwrap();
        assert_eq!(event.payload, Value::Null);
    }

    #[test]
    fn test_action_tolerates_malformed_fields() {
        assert_eq!(DispatchAction::from_json("not json"), DispatchAction::default());
        assert_eq!(DispatchAction::from_json("[1, 2]"), DispatchAction::default());

        let action = DispatchAction::from_json(r#"{"type": 7, "payload": null}"#);
        assert_eq!(action.kind, "");
        assert_eq!(action.payload, None);

        let action = DispatchAction::from_json(r#"{"type": "useItem", "payload": {"slot": 2}}"#);
        assert!(action.is("useItem"));
        assert_eq!(action.payload, Some(json!({ "slot": 2 })));
    }

    #[test]
    fn test_action_omits_missing_payload() {
        let text = serde_json::to_string(&DispatchAction::new("close")).unwrap();
        assert_eq!(text, r#"{"type":"close"}"#);
    }
}
