//! Reply payloads returned to omnibot.
//!
//! A [`Reply`] carries two lists. `actions` are chat platform API calls
//! omnibot performs on the bot's behalf; `responses` answer a slash command
//! or an interactive component through its response URL:
//!
//! ```json
//! {
//!   "actions": [
//!     {"action": "chat.postMessage", "kwargs": {"text": "pong"}},
//!     {"action": "reactions.add", "kwargs": {"name": "heart"}}
//!   ],
//!   "responses": [
//!     {"response_type": "ephemeral", "text": "done", "omnibot_parse": {}, "replace_original": false}
//!   ]
//! }
//! ```
//!
//! Empty lists are left out of the serialized form.
//!
//! # Example
//!
//! ```rust
//! use omnibot_core::{PostMessage, SimpleResponse};
//!
//! let mut reply = PostMessage::new("pong").thread(false).build();
//! reply.extend(SimpleResponse::new("ok").ephemeral(true).build());
//!
//! assert_eq!(reply.actions.len(), 1);
//! assert_eq!(reply.responses.len(), 1);
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// API method used to post a message.
pub const POST_MESSAGE: &str = "chat.postMessage";

/// API method used to post a message visible only to one user.
pub const POST_EPHEMERAL: &str = "chat.postEphemeral";

/// The document a handler returns to omnibot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Reply {
    /// Chat platform API calls to perform, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<Action>,
    /// Responses sent back through the event's response URL.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub responses: Vec<Response>,
}

impl Reply {
    /// Creates an empty reply.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an action (builder pattern).
    pub fn action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    /// Appends a response (builder pattern).
    pub fn response(mut self, response: Response) -> Self {
        self.responses.push(response);
        self
    }

    /// Appends an action.
    pub fn push_action(&mut self, action: Action) {
        self.actions.push(action);
    }

    /// Appends a response.
    pub fn push_response(&mut self, response: Response) {
        self.responses.push(response);
    }

    /// Appends the actions and responses of `other` to this reply.
    pub fn extend(&mut self, other: Reply) {
        self.actions.extend(other.actions);
        self.responses.extend(other.responses);
    }

    /// Returns `true` if the reply asks omnibot to do nothing.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty() && self.responses.is_empty()
    }
}

impl From<Action> for Reply {
    fn from(action: Action) -> Self {
        Self::new().action(action)
    }
}

impl From<Response> for Reply {
    fn from(response: Response) -> Self {
        Self::new().response(response)
    }
}

/// A single chat platform API call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// The API method, e.g. `chat.postMessage`.
    pub action: String,
    /// Arguments passed to the API method.
    #[serde(default)]
    pub kwargs: Map<String, Value>,
}

impl Action {
    /// Creates an action with no arguments.
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            kwargs: Map::new(),
        }
    }

    /// Creates a `chat.postMessage` action with the given text.
    pub fn post_message(text: impl Into<String>) -> Self {
        Self::new(POST_MESSAGE).kwarg("text", text.into())
    }

    /// Sets an argument (builder pattern).
    pub fn kwarg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.kwargs.insert(key.into(), value.into());
        self
    }

    /// Returns an argument by name.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.kwargs.get(key)
    }
}

/// Visibility of a [`Response`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseType {
    /// Visible to the whole channel.
    #[default]
    InChannel,
    /// Visible only to the user who triggered the event.
    Ephemeral,
}

impl ResponseType {
    fn from_ephemeral(ephemeral: bool) -> Self {
        if ephemeral {
            Self::Ephemeral
        } else {
            Self::InChannel
        }
    }
}

/// A response to a slash command or interactive component event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub response_type: ResponseType,
    pub text: String,
    /// Resources omnibot should parse before posting.
    #[serde(default = "empty_object")]
    pub omnibot_parse: Value,
    /// Whether to replace the message the event came from.
    #[serde(default)]
    pub replace_original: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

/// A message attachment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default)]
    pub fields: Vec<AttachmentField>,
}

impl Attachment {
    /// Creates an attachment with a title and no fields.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Appends a field (builder pattern).
    pub fn field(mut self, field: AttachmentField) -> Self {
        self.fields.push(field);
        self
    }
}

/// A titled value inside an [`Attachment`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttachmentField {
    pub title: String,
    pub value: String,
    /// Whether the field is short enough to sit next to another one.
    #[serde(default)]
    pub short: bool,
}

impl AttachmentField {
    /// Creates a full-width field.
    pub fn new(title: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            value: value.into(),
            short: false,
        }
    }
}

// ============================================================================
// Builders for frequently used replies
// ============================================================================

/// Builds a reply posting a single, simple text message.
///
/// By default the message is posted in the thread of the triggering message,
/// to the channel, with no `omnibot_parse` hints.
#[derive(Debug, Clone)]
pub struct PostMessage {
    text: String,
    thread: bool,
    omnibot_parse: Option<Value>,
    ephemeral: bool,
}

impl PostMessage {
    /// Creates a builder for the given text.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            thread: true,
            omnibot_parse: None,
            ephemeral: false,
        }
    }

    /// Sets whether to reply in a thread. `false` sends `thread_ts: null`.
    pub fn thread(mut self, thread: bool) -> Self {
        self.thread = thread;
        self
    }

    /// Sets the resources omnibot should parse before posting, e.g. `["all"]`.
    pub fn omnibot_parse(mut self, parse: impl Into<Value>) -> Self {
        self.omnibot_parse = Some(parse.into());
        self
    }

    /// Sets whether to post an ephemeral message.
    pub fn ephemeral(mut self, ephemeral: bool) -> Self {
        self.ephemeral = ephemeral;
        self
    }

    /// Builds the single action this message posts.
    pub fn into_action(self) -> Action {
        let method = if self.ephemeral {
            POST_EPHEMERAL
        } else {
            POST_MESSAGE
        };
        let mut action = Action::new(method).kwarg("text", self.text);
        if let Some(parse) = self.omnibot_parse {
            action = action.kwarg("omnibot_parse", parse);
        }
        if !self.thread {
            action = action.kwarg("thread_ts", Value::Null);
        }
        action
    }

    /// Builds the reply.
    pub fn build(self) -> Reply {
        Reply::from(self.into_action())
    }
}

impl From<PostMessage> for Reply {
    fn from(message: PostMessage) -> Self {
        message.build()
    }
}

/// Builds a reply answering a slash command or interactive component event.
#[derive(Debug, Clone)]
pub struct SimpleResponse {
    text: String,
    omnibot_parse: Option<Value>,
    ephemeral: bool,
    replace_original: bool,
    attachments: Vec<Attachment>,
}

impl SimpleResponse {
    /// Creates a builder for the given text.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            omnibot_parse: None,
            ephemeral: false,
            replace_original: false,
            attachments: Vec::new(),
        }
    }

    /// Sets the resources omnibot should parse before posting.
    pub fn omnibot_parse(mut self, parse: impl Into<Value>) -> Self {
        self.omnibot_parse = Some(parse.into());
        self
    }

    /// Sets whether the response is ephemeral.
    pub fn ephemeral(mut self, ephemeral: bool) -> Self {
        self.ephemeral = ephemeral;
        self
    }

    /// Sets whether to replace the original message.
    pub fn replace_original(mut self, replace: bool) -> Self {
        self.replace_original = replace;
        self
    }

    /// Appends an attachment.
    pub fn attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    /// Builds the single response.
    pub fn into_response(self) -> Response {
        Response {
            response_type: ResponseType::from_ephemeral(self.ephemeral),
            text: self.text,
            omnibot_parse: self.omnibot_parse.unwrap_or_else(empty_object),
            replace_original: self.replace_original,
            attachments: self.attachments,
        }
    }

    /// Builds the reply.
    pub fn build(self) -> Reply {
        Reply::from(self.into_response())
    }
}

impl From<SimpleResponse> for Reply {
    fn from(response: SimpleResponse) -> Self {
        response.build()
    }
}
