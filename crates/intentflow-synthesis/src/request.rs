//! Synthesis request types.
//!
//! The wire shape mirrors what mobile clients post:
//!
//! ```json
//! {
//!   "user_id": "u-1",
//!   "intent_text": "When I leave home, turn off wifi",
//!   "context": {
//!     "location_aliases": ["home"],
//!     "capabilities": ["wifi"],
//!     "time_window": {"tz": "Europe/Berlin", "now": "2026-10-16T08:00:00+02:00"},
//!     "metadata": {}
//!   },
//!   "session_token": "..."
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A free-text automation request plus the context it was made in.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IntentRequest {
    #[serde(default)]
    pub user_id: String,
    pub intent_text: String,
    #[serde(default)]
    pub context: IntentContext,
    #[serde(default)]
    pub session_token: String,
}

impl IntentRequest {
    /// A request with the given intent and an empty context.
    pub fn new(intent_text: impl Into<String>) -> Self {
        Self {
            intent_text: intent_text.into(),
            ..Self::default()
        }
    }

    /// Replace the context.
    pub fn with_context(mut self, context: IntentContext) -> Self {
        self.context = context;
        self
    }
}

/// What the caller knows about the device and user at request time.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IntentContext {
    /// Named places the user has saved ("home", "office", ...).
    #[serde(default)]
    pub location_aliases: Vec<String>,

    /// Capabilities the device reports ("camera", "sms", ...).
    #[serde(default)]
    pub capabilities: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_window: Option<TimeWindow>,

    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

/// The caller's local clock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// IANA time zone name.
    pub tz: String,
    /// Current local time, ISO-8601.
    pub now: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_full_wire_request() {
        let v = json!({
            "user_id": "u-1",
            "intent_text": "Mute my phone at work",
            "context": {
                "location_aliases": ["work"],
                "capabilities": ["sound"],
                "time_window": {"tz": "UTC", "now": "2026-10-16T09:00:00Z"},
                "metadata": {"device": "pixel"}
            },
            "session_token": "tok"
        });
        let req: IntentRequest = serde_json::from_value(v).unwrap();
        assert_eq!(req.context.location_aliases, ["work"]);
        assert_eq!(req.context.time_window.as_ref().unwrap().tz, "UTC");
        assert_eq!(req.context.metadata["device"], "pixel");
    }

    #[test]
    fn context_is_optional() {
        let req: IntentRequest = serde_json::from_value(json!({"intent_text": "hi"})).unwrap();
        assert_eq!(req, IntentRequest::new("hi"));
        let v = serde_json::to_value(&req).unwrap();
        assert!(v["context"].get("time_window").is_none());
    }
}
