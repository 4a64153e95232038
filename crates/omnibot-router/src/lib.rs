//! # Omnibot Router
//!
//! Routes omnibot payloads to handler functions.
//!
//! This layer provides:
//! - [`MessageRouter`]: command and regex rules with `<name>` placeholders
//! - [`InteractiveRouter`]: callback id routes, optionally scoped by event type
//! - [`OmnibotRouter`]: a single entry point dispatching on `omnibot_payload_type`
//! - Axum-style handlers whose arguments are [`FromContext`] extractors
//!
//! Routers are built once at startup and are immutable while dispatching,
//! so they can be shared between threads behind an `Arc`.

pub mod context;
pub mod extract;
pub mod handler;
pub mod interactive;
pub mod message;
pub mod pattern;
pub mod router;

pub use context::{EventRef, RouteContext};
pub use extract::{FromContext, GeneratedHelp, Interactive, Message, Params, Payload};
pub use handler::{BoxedHandler, ErasedHandler, Handler, HandlerFn, IntoReply, into_handler};
pub use interactive::InteractiveRouter;
pub use message::MessageRouter;
pub use pattern::{Captures, RoutePattern};
pub use router::OmnibotRouter;

pub use omnibot_core::{
    Action, Attachment, AttachmentField, ExtractError, ExtractResult, InteractiveEvent, MatchType,
    MessageEvent, OmnibotEvent, PayloadType, PostMessage, Reply, Response, ResponseType,
    RouterError, RouterResult, SimpleResponse,
};
