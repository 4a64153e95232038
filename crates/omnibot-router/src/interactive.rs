//! Interactive component router.
//!
//! Interactive events are routed on exact `callback_id` equality. Several
//! kinds of component can share a callback id, so a route may be scoped to
//! one interactive event `type` (e.g. `dialog_submission`). Scoped routes
//! are tried before unscoped ones.
//!
//! ```rust
//! use omnibot_core::{InteractiveEvent, SimpleResponse};
//! use omnibot_router::InteractiveRouter;
//!
//! let mut router = InteractiveRouter::new();
//! router
//!     .route("ping_callback", || SimpleResponse::new("pong"))?
//!     .route_for("ping_callback", "dialog_submission", || SimpleResponse::new("dialog pong"))?;
//!
//! let event = InteractiveEvent::new("ping_callback").with_event_type("dialog_submission");
//! let reply = router.handle_interactive_component(&event)?;
//! assert_eq!(reply.responses[0].text, "dialog pong");
//! # Ok::<(), omnibot_core::RouterError>(())
//! ```

use std::collections::HashMap;
use std::fmt;

use tracing::{debug, warn};

use omnibot_core::{InteractiveEvent, Reply, RouterError, RouterResult};

use crate::context::RouteContext;
use crate::handler::{BoxedHandler, Handler, into_handler};

#[derive(Clone)]
struct InteractiveRule {
    callback_id: String,
    handler: BoxedHandler,
}

/// Routes interactive component payloads to handlers.
#[derive(Clone, Default)]
pub struct InteractiveRouter {
    default_handler: Option<BoxedHandler>,
    /// Routes for any event type.
    unscoped: Vec<InteractiveRule>,
    /// Routes keyed by interactive event type.
    scoped: HashMap<String, Vec<InteractiveRule>>,
}

impl InteractiveRouter {
    /// Creates an empty router.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of registered routes, scoped and unscoped.
    pub fn route_count(&self) -> usize {
        self.unscoped.len() + self.scoped.values().map(Vec::len).sum::<usize>()
    }

    /// Registers a pre-built handler for `callback_id`.
    ///
    /// With `event_type` set, the route only applies to events of that type.
    /// Fails with [`RouterError::RouteAlreadyDefined`] if the callback id is
    /// already registered in the same scope.
    pub fn add_event_callback_boxed(
        &mut self,
        callback_id: &str,
        handler: BoxedHandler,
        event_type: Option<&str>,
    ) -> RouterResult<()> {
        let rules = match event_type {
            Some(event_type) => self.scoped.entry(event_type.to_string()).or_default(),
            None => &mut self.unscoped,
        };

        if rules.iter().any(|r| r.callback_id == callback_id) {
            return Err(RouterError::already_defined(format!(
                "{callback_id} is already defined"
            )));
        }

        debug!(
            callback_id,
            event_type = event_type.unwrap_or("*"),
            "Registered interactive route"
        );
        rules.push(InteractiveRule {
            callback_id: callback_id.to_string(),
            handler,
        });
        Ok(())
    }

    /// Registers a handler for `callback_id`, optionally scoped to an event type.
    pub fn add_event_callback<F, T>(
        &mut self,
        callback_id: &str,
        handler: F,
        event_type: Option<&str>,
    ) -> RouterResult<()>
    where
        F: Handler<T>,
        T: 'static,
    {
        self.add_event_callback_boxed(callback_id, into_handler(handler), event_type)
    }

    /// Registers a handler for `callback_id` and any event type.
    pub fn route<F, T>(&mut self, callback_id: &str, handler: F) -> RouterResult<&mut Self>
    where
        F: Handler<T>,
        T: 'static,
    {
        self.add_event_callback(callback_id, handler, None)?;
        Ok(self)
    }

    /// Registers a handler for `callback_id` and one event type.
    pub fn route_for<F, T>(
        &mut self,
        callback_id: &str,
        event_type: &str,
        handler: F,
    ) -> RouterResult<&mut Self>
    where
        F: Handler<T>,
        T: 'static,
    {
        self.add_event_callback(callback_id, handler, Some(event_type))?;
        Ok(self)
    }

    /// Sets the handler for events no route matches. Only one can be set.
    pub fn set_default<F, T>(&mut self, handler: F) -> RouterResult<&mut Self>
    where
        F: Handler<T>,
        T: 'static,
    {
        if self.default_handler.is_some() {
            return Err(RouterError::already_defined(
                "a default route has already been set",
            ));
        }
        self.default_handler = Some(into_handler(handler));
        Ok(self)
    }

    fn find(&self, callback_id: &str, event_type: Option<&str>) -> Option<&BoxedHandler> {
        let scoped = event_type
            .and_then(|t| self.scoped.get(t))
            .map(Vec::as_slice)
            .unwrap_or_default();

        scoped
            .iter()
            .chain(self.unscoped.iter())
            .find(|rule| rule.callback_id == callback_id)
            .map(|rule| &rule.handler)
    }

    /// Routes an interactive event to the matching route, or the default.
    pub fn handle_interactive_component(&self, event: &InteractiveEvent) -> RouterResult<Reply> {
        let callback_id = event.callback_id.as_deref().unwrap_or_default();
        let event_type = event.event_type.as_deref();
        let ctx = RouteContext::interactive(event);

        let handler = event
            .callback_id
            .as_deref()
            .and_then(|id| self.find(id, event_type));

        if let Some(handler) = handler {
            debug!(callback_id, event_type, "Interactive route matched");
            return handler.handle(&ctx);
        }

        if let Some(handler) = &self.default_handler {
            debug!(callback_id, "No interactive route matched, using default route");
            return handler.handle(&ctx);
        }

        warn!(callback_id, "No interactive route matched and no default set");
        Err(RouterError::no_matched_route(
            callback_id,
            "interactive components",
        ))
    }
}

impl fmt::Debug for InteractiveRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InteractiveRouter")
            .field("unscoped", &self.unscoped.len())
            .field("scoped", &self.scoped.keys().collect::<Vec<_>>())
            .field("has_default", &self.default_handler.is_some())
            .finish()
    }
}
