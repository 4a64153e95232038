//! Omnibot event model.
//!
//! Omnibot forwards two kinds of payload to a receiving service, told apart
//! by the `omnibot_payload_type` field:
//!
//! ```text
//! { "omnibot_payload_type": "message", "match_type": "command", "args": "ping", ... }
//! { "omnibot_payload_type": "interactive_component", "callback_id": "ping", "type": "dialog_submission", ... }
//! ```
//!
//! Only the fields routing depends on are typed. Everything else omnibot
//! sends is kept in a free-form map and can be read by name.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::{RouterError, RouterResult};

/// The JSON key carrying the payload type discriminator.
pub const PAYLOAD_TYPE_KEY: &str = "omnibot_payload_type";

/// Kinds of payload omnibot delivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadType {
    /// A chat message addressed to, or matched for, the bot.
    Message,
    /// A callback from an interactive component (button, menu, dialog).
    InteractiveComponent,
}

impl PayloadType {
    /// Returns the wire name of this payload type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Message => "message",
            Self::InteractiveComponent => "interactive_component",
        }
    }

    /// Reads the payload type of a raw omnibot payload.
    ///
    /// A missing or unknown discriminator is reported as
    /// [`RouterError::UnsupportedPayload`].
    pub fn of(payload: &Value) -> RouterResult<Self> {
        match payload.get(PAYLOAD_TYPE_KEY) {
            Some(Value::String(name)) => match name.as_str() {
                "message" => Ok(Self::Message),
                "interactive_component" => Ok(Self::InteractiveComponent),
                other => Err(RouterError::unsupported(other)),
            },
            Some(other) => Err(RouterError::unsupported(other.to_string())),
            None => Err(RouterError::unsupported(format!("missing {PAYLOAD_TYPE_KEY}"))),
        }
    }
}

impl fmt::Display for PayloadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How omnibot matched a message to this bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    /// The message was addressed directly to the bot.
    Command,
    /// The message was seen in a channel and matched one of the bot's regexes.
    Regex,
}

impl MatchType {
    /// Returns the wire name of this match type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Command => "command",
            Self::Regex => "regex",
        }
    }
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A message payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageEvent {
    /// Which route table this message is matched against.
    pub match_type: MatchType,
    /// The text routes are matched against.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub args: String,
    /// Every other field omnibot sent.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MessageEvent {
    /// Creates a message event with no extra fields.
    pub fn new(match_type: MatchType, args: impl Into<String>) -> Self {
        Self {
            match_type,
            args: args.into(),
            extra: Map::new(),
        }
    }

    /// Parses a message body out of a raw payload.
    pub fn from_payload(payload: &Value) -> RouterResult<Self> {
        Self::deserialize(payload).map_err(|source| RouterError::MalformedPayload {
            payload_type: PayloadType::Message.as_str(),
            source,
        })
    }

    /// Adds an extra field (builder pattern).
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Returns an extra field by name.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    /// Returns an extra field by name if it is a string.
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(Value::as_str)
    }
}

/// An interactive component payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InteractiveEvent {
    /// The callback id the component was created with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_id: Option<String>,
    /// The interactive event type, e.g. `dialog_submission`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    /// Every other field omnibot sent.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl InteractiveEvent {
    /// Creates an interactive event for the given callback id.
    pub fn new(callback_id: impl Into<String>) -> Self {
        Self {
            callback_id: Some(callback_id.into()),
            ..Default::default()
        }
    }

    /// Parses an interactive component body out of a raw payload.
    pub fn from_payload(payload: &Value) -> RouterResult<Self> {
        Self::deserialize(payload).map_err(|source| RouterError::MalformedPayload {
            payload_type: PayloadType::InteractiveComponent.as_str(),
            source,
        })
    }

    /// Sets the interactive event type (builder pattern).
    pub fn with_event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = Some(event_type.into());
        self
    }

    /// Adds an extra field (builder pattern).
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Returns an extra field by name.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }
}

/// A parsed omnibot payload.
#[derive(Debug, Clone, PartialEq)]
pub enum OmnibotEvent {
    Message(MessageEvent),
    InteractiveComponent(InteractiveEvent),
}

impl OmnibotEvent {
    /// Parses a raw payload, dispatching on its `omnibot_payload_type`.
    pub fn from_payload(payload: &Value) -> RouterResult<Self> {
        match PayloadType::of(payload)? {
            PayloadType::Message => MessageEvent::from_payload(payload).map(Self::Message),
            PayloadType::InteractiveComponent => {
                InteractiveEvent::from_payload(payload).map(Self::InteractiveComponent)
            }
        }
    }

    /// Returns the payload type of this event.
    pub fn payload_type(&self) -> PayloadType {
        match self {
            Self::Message(_) => PayloadType::Message,
            Self::InteractiveComponent(_) => PayloadType::InteractiveComponent,
        }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_message_payload() {
        let payload = json!({
            "omnibot_payload_type": "message",
            "match_type": "command",
            "args": "ping",
            "channel": {"name": "general"},
        });

        let event = OmnibotEvent::from_payload(&payload).unwrap();
        let OmnibotEvent::Message(msg) = event else {
            panic!("expected a message event");
        };
        assert_eq!(msg.match_type, MatchType::Command);
        assert_eq!(msg.args, "ping");
        assert_eq!(msg.field("channel"), Some(&json!({"name": "general"})));
        assert_eq!(msg.str_field("omnibot_payload_type"), Some("message"));
    }

    #[test]
    fn test_missing_args_defaults_to_empty() {
        let payload = json!({"match_type": "regex", "args": null});
        let msg = MessageEvent::from_payload(&payload).unwrap();
        assert_eq!(msg.args, "");

        let payload = json!({"match_type": "regex"});
        let msg = MessageEvent::from_payload(&payload).unwrap();
        assert_eq!(msg.args, "");
    }

    #[test]
    fn test_parse_interactive_payload() {
        let payload = json!({
            "omnibot_payload_type": "interactive_component",
            "callback_id": "ping",
            "type": "dialog_submission",
        });

        let event = OmnibotEvent::from_payload(&payload).unwrap();
        assert_eq!(event.payload_type(), PayloadType::InteractiveComponent);
        let OmnibotEvent::InteractiveComponent(ev) = event else {
            panic!("expected an interactive event");
        };
        assert_eq!(ev.callback_id.as_deref(), Some("ping"));
        assert_eq!(ev.event_type.as_deref(), Some("dialog_submission"));
    }

    #[test]
    fn test_unknown_payload_type() {
        let payload = json!({"omnibot_payload_type": "slash_command"});
        let err = OmnibotEvent::from_payload(&payload).unwrap_err();
        assert!(matches!(err, RouterError::UnsupportedPayload(t) if t == "slash_command"));

        let err = PayloadType::of(&json!({"args": "ping"})).unwrap_err();
        assert!(matches!(err, RouterError::UnsupportedPayload(_)));
    }

    #[test]
    fn test_bad_match_type_is_malformed() {
        let payload = json!({
            "omnibot_payload_type": "message",
            "match_type": "shout",
        });
        let err = OmnibotEvent::from_payload(&payload).unwrap_err();
        assert!(matches!(
            err,
            RouterError::MalformedPayload {
                payload_type: "message",
                ..
            }
        ));
    }
}
