//! The context handed to handlers during dispatch.

use omnibot_core::{InteractiveEvent, MessageEvent};

use crate::message::MessageRouter;
use crate::pattern::Captures;

/// The event being routed.
#[derive(Debug, Clone, Copy)]
pub enum EventRef<'a> {
    Message(&'a MessageEvent),
    Interactive(&'a InteractiveEvent),
}

impl EventRef<'_> {
    /// Returns a short name for the kind of event, used in errors and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Message(_) => "message",
            Self::Interactive(_) => "interactive_component",
        }
    }
}

/// Everything a handler can extract its arguments from.
///
/// One context is built per dispatch, after a route has been chosen. It
/// borrows the event and, for message routes, the router that matched it.
#[derive(Debug)]
pub struct RouteContext<'a> {
    event: EventRef<'a>,
    captures: Captures,
    router: Option<&'a MessageRouter>,
}

impl<'a> RouteContext<'a> {
    /// Creates a context for a matched message route.
    pub(crate) fn message(
        event: &'a MessageEvent,
        captures: Captures,
        router: &'a MessageRouter,
    ) -> Self {
        Self {
            event: EventRef::Message(event),
            captures,
            router: Some(router),
        }
    }

    /// Creates a context for a matched interactive route.
    pub(crate) fn interactive(event: &'a InteractiveEvent) -> Self {
        Self {
            event: EventRef::Interactive(event),
            captures: Captures::new(),
            router: None,
        }
    }

    /// Returns the event being routed.
    pub fn event(&self) -> EventRef<'a> {
        self.event
    }

    /// Returns the values captured by the matched route.
    pub fn captures(&self) -> &Captures {
        &self.captures
    }

    /// Returns the message router handling this event, if any.
    pub fn message_router(&self) -> Option<&'a MessageRouter> {
        self.router
    }
}
