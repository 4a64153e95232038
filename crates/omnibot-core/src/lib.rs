//! # Omnibot Core
//!
//! Shared types for services that receive payloads from omnibot:
//!
//! - [`event`]: the message and interactive component payloads
//! - [`reply`]: the actions and responses handed back to omnibot
//! - [`error`]: routing and extraction errors
//!
//! Routing itself lives in `omnibot-router`; this crate has no behaviour
//! beyond parsing and building payloads.

pub mod error;
pub mod event;
pub mod reply;

pub use error::{ExtractError, ExtractResult, RouterError, RouterResult};
pub use event::{
    InteractiveEvent, MatchType, MessageEvent, OmnibotEvent, PAYLOAD_TYPE_KEY, PayloadType,
};
pub use reply::{
    Action, Attachment, AttachmentField, POST_EPHEMERAL, POST_MESSAGE, PostMessage, Reply,
    Response, ResponseType, SimpleResponse,
};
