//! # Omnibot Receiver
//!
//! Build services that receive events from omnibot, the chat proxy.
//!
//! ## Overview
//!
//! omnibot forwards chat-platform events to a receiving service as JSON and
//! executes whatever actions and responses the service replies with. This
//! crate routes those events to plain functions and builds the replies.
//!
//! ```text
//! ┌─────────┐  JSON   ┌──────────┐     ┌───────────────┐     ┌──────────────────┐
//! │ omnibot │───────▶│ Receiver │────▶│ OmnibotRouter │──┬─▶│ MessageRouter    │──▶ handler
//! └─────────┘◀───────└──────────┘     └───────────────┘  └─▶│ InteractiveRouter│──▶ handler
//!            Reply                                           └──────────────────┘
//! ```
//!
//! - **Receiver**: parses request bodies and serializes replies
//! - **OmnibotRouter**: dispatches on `omnibot_payload_type`
//! - **MessageRouter**: command and regex rules with `<name>` placeholders
//! - **InteractiveRouter**: routes on `callback_id`, optionally per event type
//! - **Handlers**: functions taking extractors and returning anything
//!   [`IntoReply`](prelude::IntoReply)
//!
//! ## Quick Start
//!
//! ```rust
//! use omnibot_receiver::prelude::*;
//!
//! fn find(Params(find): Params<Find>) -> PostMessage {
//!     PostMessage::new(format!("looking for {}", find.user))
//! }
//!
//! #[derive(serde::Deserialize)]
//! struct Find {
//!     user: String,
//! }
//!
//! let mut messages = MessageRouter::new("Lookup bot");
//! messages
//!     .route("ping", MatchType::Command, || PostMessage::new("pong"))?
//!     .route_with_help("find <user>", MatchType::Command, "Find a user", find)?;
//!
//! let receiver = Receiver::new(OmnibotRouter::new().with_message_router(messages));
//! let reply = receiver.handle_json(
//!     r#"{"omnibot_payload_type": "message", "match_type": "command", "args": "find alice"}"#,
//! )?;
//! assert!(reply.contains("looking for alice"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Features
//!
//! - `toml-config` *(default)*: load `omnibot.toml`
//! - `yaml-config`: load `omnibot.yaml` / `omnibot.yml`
//! - `json-log`: JSON log output

pub use omnibot_core as core;
pub use omnibot_router as router;
pub use omnibot_runtime as runtime;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use omnibot_receiver::prelude::*;
/// ```
pub mod prelude {
    // Entry point
    pub use omnibot_runtime::{OmnibotConfig, Receiver, ReceiverError};

    // Routers
    pub use omnibot_router::{InteractiveRouter, MessageRouter, OmnibotRouter};

    // Handlers and extractors
    pub use omnibot_router::{
        Captures, FromContext, GeneratedHelp, Interactive, IntoReply, Message, Params, Payload,
    };

    // Events
    pub use omnibot_core::{InteractiveEvent, MatchType, MessageEvent, OmnibotEvent};

    // Replies
    pub use omnibot_core::{
        Action, Attachment, AttachmentField, PostMessage, Reply, Response, ResponseType,
        SimpleResponse,
    };

    // Errors
    pub use omnibot_core::{RouterError, RouterResult};
}
