//! Error types shared by the omnibot receiver crates.

use thiserror::Error;

/// Errors raised while registering routes or dispatching an event.
///
/// None of these are retried by the library. The caller decides whether to
/// reply with an error message or drop the event silently.
#[derive(Debug, Error)]
pub enum RouterError {
    /// The event matched no route and the router has no fallback.
    #[error("no route \"{route}\" for {scope} and no default route set")]
    NoMatchedRoute {
        /// The text or callback id that failed to match.
        route: String,
        /// Where the lookup happened, e.g. `match type "command"`.
        scope: String,
    },

    /// A route, default or help handler was registered twice.
    #[error("route already defined: {0}")]
    RouteAlreadyDefined(String),

    /// The payload type is unknown, or no router is configured for it.
    #[error("unsupported payload type: {0}")]
    UnsupportedPayload(String),

    /// The payload type is known but its body could not be parsed.
    #[error("malformed {payload_type} payload: {source}")]
    MalformedPayload {
        /// The payload type that was being parsed.
        payload_type: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// A route pattern did not compile into a regular expression.
    #[error("invalid route pattern '{pattern}': {source}")]
    InvalidPattern {
        /// The route as written by the caller.
        pattern: String,
        #[source]
        source: Box<regex::Error>,
    },

    /// A handler argument could not be extracted from the event.
    #[error(transparent)]
    Extraction(#[from] ExtractError),

    /// A handler returned an error.
    #[error("handler failed: {0}")]
    Handler(String),
}

impl RouterError {
    /// Creates a [`RouterError::NoMatchedRoute`].
    pub fn no_matched_route(route: impl Into<String>, scope: impl Into<String>) -> Self {
        Self::NoMatchedRoute {
            route: route.into(),
            scope: scope.into(),
        }
    }

    /// Creates a [`RouterError::RouteAlreadyDefined`].
    pub fn already_defined(what: impl Into<String>) -> Self {
        Self::RouteAlreadyDefined(what.into())
    }

    /// Creates a [`RouterError::UnsupportedPayload`].
    pub fn unsupported(payload_type: impl Into<String>) -> Self {
        Self::UnsupportedPayload(payload_type.into())
    }
}

/// Errors that can occur while extracting handler arguments.
#[derive(Debug, Clone, Error)]
pub enum ExtractError {
    /// The handler asked for an event of a different kind.
    #[error("event type mismatch: expected '{expected}', got '{got}'")]
    EventTypeMismatch {
        /// Expected event kind.
        expected: &'static str,
        /// Actual event kind.
        got: &'static str,
    },

    /// Route captures could not be deserialized into the requested type.
    #[error("invalid route parameters: {0}")]
    InvalidParams(String),

    /// The extractor is only available while routing a message.
    #[error("{0} is only available to message routes")]
    MessageOnly(&'static str),

    /// Custom extraction error.
    #[error("{0}")]
    Custom(String),
}

impl ExtractError {
    /// Creates a custom extraction error.
    pub fn custom(msg: impl Into<String>) -> Self {
        Self::Custom(msg.into())
    }
}

/// Result type for routing operations.
pub type RouterResult<T> = Result<T, RouterError>;

/// Result type for extraction operations.
pub type ExtractResult<T> = Result<T, ExtractError>;
