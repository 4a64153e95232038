//! Top-level event router.
//!
//! [`OmnibotRouter`] lets a service receive every omnibot payload through a
//! single entry point. It reads `omnibot_payload_type` and hands the event to
//! the configured [`MessageRouter`] or [`InteractiveRouter`].
//!
//! ```rust,ignore
//! let router = OmnibotRouter::new()
//!     .with_message_router(message_router)
//!     .with_interactive_router(interactive_router);
//!
//! // In the HTTP handler receiving omnibot's POST:
//! let reply = router.handle_event(&body)?;
//! ```

use serde_json::Value;
use tracing::{Level, debug, span};

use omnibot_core::{
    InteractiveEvent, MessageEvent, OmnibotEvent, PayloadType, Reply, RouterError, RouterResult,
};

use crate::interactive::InteractiveRouter;
use crate::message::MessageRouter;

/// Dispatches omnibot payloads to the router for their payload type.
#[derive(Debug, Clone, Default)]
pub struct OmnibotRouter {
    message_router: Option<MessageRouter>,
    interactive_router: Option<InteractiveRouter>,
}

impl OmnibotRouter {
    /// Creates a router with no sub-routers; every payload is unsupported.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the message router (builder pattern).
    pub fn with_message_router(mut self, router: MessageRouter) -> Self {
        self.message_router = Some(router);
        self
    }

    /// Sets the interactive component router (builder pattern).
    pub fn with_interactive_router(mut self, router: InteractiveRouter) -> Self {
        self.interactive_router = Some(router);
        self
    }

    /// Returns the message router, if configured.
    pub fn message_router(&self) -> Option<&MessageRouter> {
        self.message_router.as_ref()
    }

    /// Returns the interactive component router, if configured.
    pub fn interactive_router(&self) -> Option<&InteractiveRouter> {
        self.interactive_router.as_ref()
    }

    /// Returns `true` if payloads of `payload_type` can be routed.
    pub fn supports(&self, payload_type: PayloadType) -> bool {
        match payload_type {
            PayloadType::Message => self.message_router.is_some(),
            PayloadType::InteractiveComponent => self.interactive_router.is_some(),
        }
    }

    /// Routes a raw omnibot payload.
    ///
    /// Fails with [`RouterError::UnsupportedPayload`] if the payload type is
    /// unknown or no router is configured for it. The payload body is only
    /// parsed once a router for it is known to exist.
    pub fn handle_event(&self, payload: &Value) -> RouterResult<Reply> {
        let payload_type = PayloadType::of(payload)?;
        let span = span!(Level::DEBUG, "dispatch", payload_type = %payload_type);
        let _enter = span.enter();

        match (payload_type, &self.message_router, &self.interactive_router) {
            (PayloadType::Message, Some(router), _) => {
                router.handle_message(&MessageEvent::from_payload(payload)?)
            }
            (PayloadType::InteractiveComponent, _, Some(router)) => {
                router.handle_interactive_component(&InteractiveEvent::from_payload(payload)?)
            }
            _ => {
                debug!("No router configured for payload type");
                Err(RouterError::unsupported(payload_type.as_str()))
            }
        }
    }

    /// Routes an already parsed event.
    pub fn handle(&self, event: &OmnibotEvent) -> RouterResult<Reply> {
        let span = span!(Level::DEBUG, "dispatch", payload_type = %event.payload_type());
        let _enter = span.enter();

        match (event, &self.message_router, &self.interactive_router) {
            (OmnibotEvent::Message(msg), Some(router), _) => router.handle_message(msg),
            (OmnibotEvent::InteractiveComponent(ev), _, Some(router)) => {
                router.handle_interactive_component(ev)
            }
            _ => Err(RouterError::unsupported(event.payload_type().as_str())),
        }
    }
}
