//! Extractor system.
//!
//! Handler arguments are pulled out of the [`RouteContext`] through the
//! [`FromContext`] trait, so a handler declares what it needs and nothing
//! more:
//!
//! ```rust,ignore
//! use omnibot_router::{Message, Params, PostMessage, Reply};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Find {
//!     user: String,
//! }
//!
//! fn find_user(msg: Message, Params(find): Params<Find>) -> Reply {
//!     PostMessage::new(format!("looking for {} in {:?}", find.user, msg.field("channel"))).build()
//! }
//! ```
//!
//! If extraction fails the handler is not called and dispatch returns
//! [`RouterError::Extraction`](omnibot_core::RouterError::Extraction).

use std::ops::Deref;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use omnibot_core::{ExtractError, ExtractResult, InteractiveEvent, MessageEvent, Reply};

use crate::context::{EventRef, RouteContext};
use crate::pattern::Captures;

/// A trait for types that can be extracted from a [`RouteContext`].
///
/// # Example
///
/// ```rust,ignore
/// use omnibot_router::{FromContext, RouteContext, EventRef};
/// use omnibot_core::ExtractError;
///
/// struct UserId(String);
///
/// impl FromContext for UserId {
///     fn from_context(ctx: &RouteContext<'_>) -> Result<Self, ExtractError> {
///         match ctx.event() {
///             EventRef::Message(msg) => msg
///                 .str_field("user")
///                 .map(|u| UserId(u.to_string()))
///                 .ok_or_else(|| ExtractError::custom("message has no user")),
///             _ => Err(ExtractError::custom("not a message")),
///         }
///     }
/// }
/// ```
pub trait FromContext: Sized {
    /// Attempts to extract this type from the given context.
    fn from_context(ctx: &RouteContext<'_>) -> ExtractResult<Self>;
}

/// Optional arguments never fail; they are `None` when extraction fails.
impl<T: FromContext> FromContext for Option<T> {
    fn from_context(ctx: &RouteContext<'_>) -> ExtractResult<Self> {
        Ok(T::from_context(ctx).ok())
    }
}

/// The message being routed.
#[derive(Debug, Clone)]
pub struct Message(pub MessageEvent);

impl Deref for Message {
    type Target = MessageEvent;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromContext for Message {
    fn from_context(ctx: &RouteContext<'_>) -> ExtractResult<Self> {
        match ctx.event() {
            EventRef::Message(msg) => Ok(Message(msg.clone())),
            other => Err(ExtractError::EventTypeMismatch {
                expected: "message",
                got: other.kind(),
            }),
        }
    }
}

/// The interactive component event being routed.
#[derive(Debug, Clone)]
pub struct Interactive(pub InteractiveEvent);

impl Deref for Interactive {
    type Target = InteractiveEvent;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromContext for Interactive {
    fn from_context(ctx: &RouteContext<'_>) -> ExtractResult<Self> {
        match ctx.event() {
            EventRef::Interactive(ev) => Ok(Interactive(ev.clone())),
            other => Err(ExtractError::EventTypeMismatch {
                expected: "interactive_component",
                got: other.kind(),
            }),
        }
    }
}

/// All named values captured by the matched route.
impl FromContext for Captures {
    fn from_context(ctx: &RouteContext<'_>) -> ExtractResult<Self> {
        Ok(ctx.captures().clone())
    }
}

/// Named captures deserialized into `T`.
///
/// Every capture is a string, so `T` is usually a struct of `String` fields
/// named after the placeholders in the route.
#[derive(Debug, Clone)]
pub struct Params<T>(pub T);

impl<T> Deref for Params<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T: DeserializeOwned> FromContext for Params<T> {
    fn from_context(ctx: &RouteContext<'_>) -> ExtractResult<Self> {
        let map: Map<String, Value> = ctx
            .captures()
            .iter()
            .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
            .collect();
        serde_json::from_value(Value::Object(map))
            .map(Params)
            .map_err(|e| ExtractError::InvalidParams(e.to_string()))
    }
}

/// The event as raw JSON, including every field omnibot sent.
#[derive(Debug, Clone)]
pub struct Payload(pub Value);

impl FromContext for Payload {
    fn from_context(ctx: &RouteContext<'_>) -> ExtractResult<Self> {
        let value = match ctx.event() {
            EventRef::Message(msg) => serde_json::to_value(msg),
            EventRef::Interactive(ev) => serde_json::to_value(ev),
        };
        value
            .map(Payload)
            .map_err(|e| ExtractError::custom(e.to_string()))
    }
}

/// The help reply generated for the router handling this message.
///
/// Lets a custom help handler add to the generated help instead of
/// replacing it.
#[derive(Debug, Clone)]
pub struct GeneratedHelp(pub Reply);

impl FromContext for GeneratedHelp {
    fn from_context(ctx: &RouteContext<'_>) -> ExtractResult<Self> {
        ctx.message_router()
            .map(|router| GeneratedHelp(router.get_help()))
            .ok_or(ExtractError::MessageOnly("GeneratedHelp"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::MessageRouter;
    use omnibot_core::MatchType;
    use serde::Deserialize;
    use serde_json::json;

    fn captures(pairs: &[(&str, &str)]) -> Captures {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_extract_message() {
        let router = MessageRouter::new("");
        let event = MessageEvent::new(MatchType::Command, "ping");
        let ctx = RouteContext::message(&event, Captures::new(), &router);

        let Message(msg) = Message::from_context(&ctx).unwrap();
        assert_eq!(msg.args, "ping");

        let err = Interactive::from_context(&ctx).unwrap_err();
        assert!(matches!(
            err,
            ExtractError::EventTypeMismatch {
                expected: "interactive_component",
                got: "message"
            }
        ));
        assert!(Option::<Interactive>::from_context(&ctx).unwrap().is_none());
    }

    #[test]
    fn test_extract_params() {
        #[derive(Deserialize)]
        struct Route {
            a: String,
            b: String,
        }

        let router = MessageRouter::new("");
        let event = MessageEvent::new(MatchType::Command, "1 to 2");
        let ctx = RouteContext::message(&event, captures(&[("a", "1"), ("b", "2")]), &router);

        let Params(route) = Params::<Route>::from_context(&ctx).unwrap();
        assert_eq!(route.a, "1");
        assert_eq!(route.b, "2");
    }

    #[test]
    fn test_extract_params_missing_field() {
        #[derive(Debug, Deserialize)]
        #[allow(dead_code)]
        struct Route {
            user: String,
        }

        let router = MessageRouter::new("");
        let event = MessageEvent::new(MatchType::Command, "ping");
        let ctx = RouteContext::message(&event, Captures::new(), &router);

        let err = Params::<Route>::from_context(&ctx).unwrap_err();
        assert!(matches!(err, ExtractError::InvalidParams(_)));
    }

    #[test]
    fn test_extract_payload_keeps_extra_fields() {
        let event = InteractiveEvent::new("ping").with_field("user", json!({"id": "U1"}));
        let ctx = RouteContext::interactive(&event);

        let Payload(value) = Payload::from_context(&ctx).unwrap();
        assert_eq!(value, json!({"callback_id": "ping", "user": {"id": "U1"}}));
    }

    #[test]
    fn test_generated_help_needs_message_router() {
        let event = InteractiveEvent::new("ping");
        let ctx = RouteContext::interactive(&event);
        let err = GeneratedHelp::from_context(&ctx).unwrap_err();
        assert!(matches!(err, ExtractError::MessageOnly("GeneratedHelp")));
    }
}
