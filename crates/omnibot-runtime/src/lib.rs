//! Omnibot Runtime - configuration, logging and the request entry point.
//!
//! This crate provides:
//! - Layered configuration loading and validation ([`config`])
//! - Logging setup for the `tracing` events routers emit ([`logging`])
//! - The [`Receiver`], which turns raw omnibot request bodies into reply bodies
//!
//! ```ignore
//! use omnibot_runtime::Receiver;
//!
//! let receiver = Receiver::builder().with_logging().build(|config| {
//!     let mut messages = config.router.message_router();
//!     messages.route("ping", MatchType::Command, || PostMessage::new("pong"))?;
//!     Ok(OmnibotRouter::new().with_message_router(messages))
//! })?;
//! ```
//!
//! Serving HTTP is left to the embedding service: pass each request body to
//! [`Receiver::handle_json`] and return what it produces.

pub mod config;
pub mod error;
pub mod logging;
pub mod receiver;

pub use config::{
    ConfigError, ConfigLoader, ConfigResult, LoggingConfig, OmnibotConfig, RouterConfig,
};
pub use error::{ReceiverError, ReceiverResult};
pub use logging::{LoggingBuilder, SpanEvents};
pub use receiver::{Receiver, ReceiverBuilder};

// Re-export tracing for use by other crates
pub use tracing;
pub use tracing_subscriber;

/// Prelude module for convenient imports.
///
/// This provides the commonly used logging macros and `Level` for spans.
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
