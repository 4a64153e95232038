//! The request entry point.
//!
//! A [`Receiver`] sits behind whatever HTTP endpoint omnibot posts to. It
//! takes the raw request body, routes it and returns the JSON reply body.
//!
//! ```rust,ignore
//! use omnibot_runtime::Receiver;
//!
//! let receiver = Receiver::builder()
//!     .profile("production")
//!     .with_logging()
//!     .build(|config| {
//!         let mut messages = config.router.message_router();
//!         messages.route("ping", MatchType::Command, || PostMessage::new("pong"))?;
//!         Ok(OmnibotRouter::new().with_message_router(messages))
//!     })?;
//!
//! // For each request:
//! let body = receiver.handle_json(&request_body)?;
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use serde_json::Value;
use tracing::{Level, debug, info, span, warn};

use omnibot_core::{PayloadType, Reply, RouterResult};
use omnibot_router::OmnibotRouter;

use crate::config::{ConfigLoader, OmnibotConfig};
use crate::error::ReceiverResult;
use crate::logging;

/// Routes raw omnibot request bodies.
///
/// Cloning is cheap; clones share the router.
#[derive(Debug, Clone)]
pub struct Receiver {
    router: Arc<OmnibotRouter>,
    config: Arc<OmnibotConfig>,
}

impl Receiver {
    /// Creates a receiver around an already built router.
    pub fn new(router: OmnibotRouter) -> Self {
        Self {
            router: Arc::new(router),
            config: Arc::new(OmnibotConfig::default()),
        }
    }

    /// Starts building a receiver from loaded configuration.
    pub fn builder() -> ReceiverBuilder {
        ReceiverBuilder::new()
    }

    /// Creates a receiver from `config`, building the router with `build`.
    pub fn from_config<F>(config: OmnibotConfig, build: F) -> ReceiverResult<Self>
    where
        F: FnOnce(&OmnibotConfig) -> RouterResult<OmnibotRouter>,
    {
        let router = build(&config)?;
        info!(
            messages = router.supports(PayloadType::Message),
            interactive = router.supports(PayloadType::InteractiveComponent),
            "Receiver ready"
        );
        Ok(Self {
            router: Arc::new(router),
            config: Arc::new(config),
        })
    }

    /// Returns the router.
    pub fn router(&self) -> &OmnibotRouter {
        &self.router
    }

    /// Returns the configuration the receiver was built from.
    pub fn config(&self) -> &OmnibotConfig {
        &self.config
    }

    /// Routes a parsed request body.
    pub fn handle_value(&self, payload: &Value) -> ReceiverResult<Reply> {
        match self.router.handle_event(payload) {
            Ok(reply) => {
                debug!(
                    actions = reply.actions.len(),
                    responses = reply.responses.len(),
                    "Event handled"
                );
                Ok(reply)
            }
            Err(e) => {
                warn!(error = %e, "Failed to handle event");
                Err(e.into())
            }
        }
    }

    /// Routes a raw JSON request body and returns the JSON reply body.
    pub fn handle_json(&self, body: &str) -> ReceiverResult<String> {
        let span = span!(Level::DEBUG, "receive", bytes = body.len());
        let _enter = span.enter();

        let payload: Value = serde_json::from_str(body)?;
        let reply = self.handle_value(&payload)?;
        Ok(serde_json::to_string(&reply)?)
    }
}

/// Builder loading configuration before the router is built.
pub struct ReceiverBuilder {
    loader: ConfigLoader,
    init_logging: bool,
}

impl Default for ReceiverBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReceiverBuilder {
    pub fn new() -> Self {
        Self {
            loader: ConfigLoader::new(),
            init_logging: false,
        }
    }

    /// Loads this file instead of searching for one.
    pub fn config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.loader = self.loader.file(path.into());
        self
    }

    /// Adds a directory to search for configuration files.
    pub fn search_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.loader = self.loader.search_path(path.into());
        self
    }

    /// Sets the configuration profile.
    pub fn profile(mut self, profile: impl AsRef<str>) -> Self {
        self.loader = self.loader.profile(profile);
        self
    }

    /// Ignores `OMNIBOT_*` environment variables.
    pub fn without_env(mut self) -> Self {
        self.loader = self.loader.without_env();
        self
    }

    /// Installs the global subscriber from the loaded logging config.
    pub fn with_logging(mut self) -> Self {
        self.init_logging = true;
        self
    }

    /// Loads the configuration and builds the receiver.
    pub fn build<F>(self, build: F) -> ReceiverResult<Receiver>
    where
        F: FnOnce(&OmnibotConfig) -> RouterResult<OmnibotRouter>,
    {
        let config = self.loader.load()?;
        if self.init_logging {
            logging::init_from_config(&config.logging);
        }
        Receiver::from_config(config, build)
    }
}
