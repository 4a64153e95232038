//! Handler system.
//!
//! Any function whose arguments implement [`FromContext`] and whose return
//! type implements [`IntoReply`] is a [`Handler`]:
//!
//! ```rust,ignore
//! use omnibot_router::{Captures, Message, PostMessage, Reply};
//!
//! // No arguments
//! fn pong() -> Reply {
//!     PostMessage::new("pong").build()
//! }
//!
//! // Extractors
//! fn echo(msg: Message) -> Reply {
//!     PostMessage::new(msg.args.clone()).build()
//! }
//!
//! // Fallible handlers
//! fn lookup(captures: Captures) -> Result<Reply, std::io::Error> {
//!     // ...
//! }
//! ```
//!
//! Handlers are type-erased into [`BoxedHandler`] when registered so routers
//! can store them side by side.

use std::fmt::Display;
use std::marker::PhantomData;
use std::sync::Arc;

use omnibot_core::{Action, PostMessage, Reply, Response, RouterError, RouterResult, SimpleResponse};

use crate::context::RouteContext;
use crate::extract::FromContext;

// ============================================================================
// IntoReply
// ============================================================================

/// Conversion from a handler's return value into a [`Reply`].
pub trait IntoReply {
    /// Converts `self` into a reply, or the error the handler failed with.
    fn into_reply(self) -> RouterResult<Reply>;
}

impl IntoReply for Reply {
    fn into_reply(self) -> RouterResult<Reply> {
        Ok(self)
    }
}

/// A handler returning nothing asks omnibot to do nothing.
impl IntoReply for () {
    fn into_reply(self) -> RouterResult<Reply> {
        Ok(Reply::default())
    }
}

impl IntoReply for Option<Reply> {
    fn into_reply(self) -> RouterResult<Reply> {
        Ok(self.unwrap_or_default())
    }
}

impl IntoReply for Action {
    fn into_reply(self) -> RouterResult<Reply> {
        Ok(Reply::from(self))
    }
}

impl IntoReply for Response {
    fn into_reply(self) -> RouterResult<Reply> {
        Ok(Reply::from(self))
    }
}

impl IntoReply for PostMessage {
    fn into_reply(self) -> RouterResult<Reply> {
        Ok(self.build())
    }
}

impl IntoReply for SimpleResponse {
    fn into_reply(self) -> RouterResult<Reply> {
        Ok(self.build())
    }
}

impl<T, E> IntoReply for Result<T, E>
where
    T: IntoReply,
    E: Display,
{
    fn into_reply(self) -> RouterResult<Reply> {
        match self {
            Ok(value) => value.into_reply(),
            Err(e) => Err(RouterError::Handler(e.to_string())),
        }
    }
}

// ============================================================================
// Handler Trait
// ============================================================================

/// The core trait for route handlers.
///
/// Implemented for every `Fn` taking up to eight [`FromContext`] arguments
/// and returning an [`IntoReply`] value. The type parameter `T` is the
/// argument tuple and only exists to keep the blanket implementations apart.
pub trait Handler<T>: Send + Sync + 'static {
    /// Extracts the arguments from `ctx` and calls the handler.
    fn call(&self, ctx: &RouteContext<'_>) -> RouterResult<Reply>;
}

impl<F, R> Handler<()> for F
where
    F: Fn() -> R + Send + Sync + 'static,
    R: IntoReply,
{
    fn call(&self, _ctx: &RouteContext<'_>) -> RouterResult<Reply> {
        (self)().into_reply()
    }
}

macro_rules! impl_handler {
    (
        $($ty:ident),*
    ) => {
        #[allow(non_snake_case)]
        impl<F, R, $($ty,)*> Handler<($($ty,)*)> for F
        where
            F: Fn($($ty,)*) -> R + Send + Sync + 'static,
            R: IntoReply,
            $( $ty: FromContext, )*
        {
            fn call(&self, ctx: &RouteContext<'_>) -> RouterResult<Reply> {
                $(
                    let $ty = $ty::from_context(ctx)?;
                )*
                (self)($($ty,)*).into_reply()
            }
        }
    };
}

impl_handler!(T1);
impl_handler!(T1, T2);
impl_handler!(T1, T2, T3);
impl_handler!(T1, T2, T3, T4);
impl_handler!(T1, T2, T3, T4, T5);
impl_handler!(T1, T2, T3, T4, T5, T6);
impl_handler!(T1, T2, T3, T4, T5, T6, T7);
impl_handler!(T1, T2, T3, T4, T5, T6, T7, T8);

// ============================================================================
// Type erasure
// ============================================================================

/// Type-erased handler trait for dynamic dispatch.
pub trait ErasedHandler: Send + Sync {
    /// Calls the handler with the given context.
    fn handle(&self, ctx: &RouteContext<'_>) -> RouterResult<Reply>;
}

/// A handler stored behind a trait object.
///
/// Cloning is cheap, so the same function can be registered for several
/// routes without being cloned itself.
pub type BoxedHandler = Arc<dyn ErasedHandler>;

/// Wraps a function so it can be stored as a [`BoxedHandler`].
pub struct HandlerFn<F, T> {
    f: F,
    _marker: PhantomData<fn() -> T>,
}

impl<F, T> HandlerFn<F, T> {
    /// Creates a new handler function wrapper.
    pub fn new(f: F) -> Self {
        Self {
            f,
            _marker: PhantomData,
        }
    }
}

impl<F, T> ErasedHandler for HandlerFn<F, T>
where
    F: Handler<T>,
    T: 'static,
{
    fn handle(&self, ctx: &RouteContext<'_>) -> RouterResult<Reply> {
        self.f.call(ctx)
    }
}

/// Converts a handler function into a [`BoxedHandler`].
pub fn into_handler<F, T>(f: F) -> BoxedHandler
where
    F: Handler<T>,
    T: 'static,
{
    Arc::new(HandlerFn::new(f))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::RouteContext;
    use crate::extract::{Interactive, Message};
    use crate::pattern::Captures;
    use omnibot_core::{ExtractError, InteractiveEvent, MatchType, MessageEvent};

    use crate::message::MessageRouter;

    fn call<F, T>(f: F, ctx: &RouteContext<'_>) -> RouterResult<Reply>
    where
        F: Handler<T>,
        T: 'static,
    {
        into_handler(f).handle(ctx)
    }

    #[test]
    fn test_unit_return_is_empty_reply() {
        let event = InteractiveEvent::new("ping");
        let ctx = RouteContext::interactive(&event);
        assert!(call(|| {}, &ctx).unwrap().is_empty());
    }

    #[test]
    fn test_extractor_arguments() {
        let router = MessageRouter::new("");
        let event = MessageEvent::new(MatchType::Command, "ping");
        let ctx = RouteContext::message(&event, Captures::new(), &router);

        let reply = call(
            |msg: Message, captures: Captures| {
                assert!(captures.is_empty());
                PostMessage::new(format!("{} received", msg.args))
            },
            &ctx,
        )
        .unwrap();
        assert_eq!(
            reply.actions[0].get("text"),
            Some(&serde_json::json!("ping received"))
        );
    }

    #[test]
    fn test_failed_extraction_skips_handler() {
        let event = InteractiveEvent::new("ping");
        let ctx = RouteContext::interactive(&event);

        let err = call(
            |_msg: Message| -> Reply { panic!("handler must not run") },
            &ctx,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            RouterError::Extraction(ExtractError::EventTypeMismatch { .. })
        ));
    }

    #[test]
    fn test_handler_error() {
        let event = InteractiveEvent::new("ping");
        let ctx = RouteContext::interactive(&event);

        let err = call(
            |_ev: Interactive| -> Result<Reply, String> { Err("lookup failed".to_string()) },
            &ctx,
        )
        .unwrap_err();
        assert!(matches!(err, RouterError::Handler(msg) if msg == "lookup failed"));
    }
}
