//! Message router.
//!
//! A [`MessageRouter`] maps message text to handlers. It keeps one ordered
//! rule list per [`MatchType`]; an incoming message is only matched against
//! the list named by its own `match_type`, and the first matching rule wins.
//!
//! # Fallbacks
//!
//! When no rule matches, the router falls back, in order, to:
//!
//! 1. the default handler, if one was set with [`set_default`](MessageRouter::set_default)
//! 2. the help handler, if `help_as_default` is on (the default). This is the
//!    handler given to [`set_help`](MessageRouter::set_help), or the
//!    generated help from [`get_help`](MessageRouter::get_help)
//! 3. [`RouterError::NoMatchedRoute`]
//!
//! # Example
//!
//! ```rust
//! use omnibot_core::{MatchType, MessageEvent, PostMessage};
//! use omnibot_router::{Captures, MessageRouter};
//!
//! let mut router = MessageRouter::new("This bot is used for pings and pongs.");
//! router
//!     .route_with_help("ping", MatchType::Command, "Responds to pings with pongs", || {
//!         PostMessage::new("pong")
//!     })?
//!     .route("find <user>", MatchType::Command, |captures: Captures| {
//!         PostMessage::new(format!("found {}", captures.get("user").unwrap_or_default()))
//!     })?;
//!
//! let reply = router.handle_message(&MessageEvent::new(MatchType::Command, "find alice"))?;
//! assert_eq!(reply.actions[0].get("text"), Some(&"found alice".into()));
//! # Ok::<(), omnibot_core::RouterError>(())
//! ```

use std::fmt;

use tracing::{debug, trace, warn};

use omnibot_core::{
    Action, Attachment, AttachmentField, MatchType, MessageEvent, Reply, RouterError,
    RouterResult,
};

use crate::context::RouteContext;
use crate::handler::{BoxedHandler, Handler, into_handler};
use crate::pattern::RoutePattern;

/// A registered message rule.
#[derive(Clone)]
struct MessageRule {
    pattern: RoutePattern,
    help: String,
    handler: BoxedHandler,
}

/// Routes message payloads to handlers.
#[derive(Clone)]
pub struct MessageRouter {
    /// Header text of the generated help.
    help_message: String,
    /// Whether unmatched messages fall back to help.
    help_as_default: bool,
    help_handler: Option<BoxedHandler>,
    default_handler: Option<BoxedHandler>,
    commands: Vec<MessageRule>,
    regexes: Vec<MessageRule>,
}

impl Default for MessageRouter {
    fn default() -> Self {
        Self::new("")
    }
}

impl MessageRouter {
    /// Creates a router whose generated help starts with `help`.
    pub fn new(help: impl Into<String>) -> Self {
        Self {
            help_message: help.into(),
            help_as_default: true,
            help_handler: None,
            default_handler: None,
            commands: Vec::new(),
            regexes: Vec::new(),
        }
    }

    /// Sets whether unmatched messages fall back to help (builder pattern).
    ///
    /// With this off and no default handler, unmatched messages fail with
    /// [`RouterError::NoMatchedRoute`].
    pub fn help_as_default(mut self, enabled: bool) -> Self {
        self.help_as_default = enabled;
        self
    }

    /// Returns the header text of the generated help.
    pub fn help_message(&self) -> &str {
        &self.help_message
    }

    /// Returns the number of rules registered for a match type.
    pub fn rule_count(&self, match_type: MatchType) -> usize {
        self.rules(match_type).len()
    }

    fn rules(&self, match_type: MatchType) -> &[MessageRule] {
        match match_type {
            MatchType::Command => &self.commands,
            MatchType::Regex => &self.regexes,
        }
    }

    fn rules_mut(&mut self, match_type: MatchType) -> &mut Vec<MessageRule> {
        match match_type {
            MatchType::Command => &mut self.commands,
            MatchType::Regex => &mut self.regexes,
        }
    }

    /// Registers a pre-built handler for messages matching `rule`.
    ///
    /// Fails with [`RouterError::RouteAlreadyDefined`] if the same rule is
    /// already registered for `match_type`, and with
    /// [`RouterError::InvalidPattern`] if the rule does not compile.
    pub fn add_message_rule_boxed(
        &mut self,
        rule: &str,
        match_type: MatchType,
        handler: BoxedHandler,
        help: &str,
    ) -> RouterResult<()> {
        let pattern = RoutePattern::compile(rule)?;
        let rules = self.rules_mut(match_type);

        if rules.iter().any(|r| r.pattern == pattern) {
            return Err(RouterError::already_defined(format!(
                "{rule} is already defined for match type {match_type}"
            )));
        }

        debug!(rule, %match_type, "Registered message route");
        rules.push(MessageRule {
            pattern,
            help: help.to_string(),
            handler,
        });
        Ok(())
    }

    /// Registers a handler for messages matching `rule`.
    ///
    /// See [`add_message_rule_boxed`](Self::add_message_rule_boxed) for the
    /// failure cases.
    pub fn add_message_rule<F, T>(
        &mut self,
        rule: &str,
        match_type: MatchType,
        handler: F,
        help: &str,
    ) -> RouterResult<()>
    where
        F: Handler<T>,
        T: 'static,
    {
        self.add_message_rule_boxed(rule, match_type, into_handler(handler), help)
    }

    /// Registers a handler with no help text, returning the router for chaining.
    pub fn route<F, T>(
        &mut self,
        rule: &str,
        match_type: MatchType,
        handler: F,
    ) -> RouterResult<&mut Self>
    where
        F: Handler<T>,
        T: 'static,
    {
        self.add_message_rule(rule, match_type, handler, "")?;
        Ok(self)
    }

    /// Registers a handler with help text, returning the router for chaining.
    pub fn route_with_help<F, T>(
        &mut self,
        rule: &str,
        match_type: MatchType,
        help: &str,
        handler: F,
    ) -> RouterResult<&mut Self>
    where
        F: Handler<T>,
        T: 'static,
    {
        self.add_message_rule(rule, match_type, handler, help)?;
        Ok(self)
    }

    /// Sets the handler for messages no rule matches.
    ///
    /// Only one default can be set; a second call fails with
    /// [`RouterError::RouteAlreadyDefined`].
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

    /// Replaces the generated help with a handler.
    ///
    /// This does not route a `help` command to the handler; register a rule
    /// for that as well. Only one help handler can be set.
    pub fn set_help<F, T>(&mut self, handler: F) -> RouterResult<&mut Self>
    where
        F: Handler<T>,
        T: 'static,
    {
        if self.help_handler.is_some() {
            return Err(RouterError::already_defined(
                "a help route has already been set",
            ));
        }
        self.help_handler = Some(into_handler(handler));
        Ok(self)
    }

    /// Generates help from the router's help text and its rules.
    ///
    /// The reply posts one message with a `Commands:` attachment listing
    /// command rules and a `Regex matches:` attachment listing regex rules.
    /// Empty sections are left out.
    pub fn get_help(&self) -> Reply {
        let mut attachments = Vec::new();
        for (title, rules) in [
            ("Commands:", &self.commands),
            ("Regex matches:", &self.regexes),
        ] {
            if rules.is_empty() {
                continue;
            }
            let attachment = rules.iter().fold(Attachment::new(title), |a, rule| {
                a.field(AttachmentField::new(rule.pattern.rule(), &rule.help))
            });
            attachments.push(attachment);
        }

        let action = Action::post_message(self.help_message.as_str()).kwarg(
            "attachments",
            serde_json::to_value(attachments).unwrap_or_default(),
        );
        Reply::from(action)
    }

    /// Routes a message to the first matching rule, or a fallback.
    ///
    /// One trailing newline in `args` is ignored when matching.
    pub fn handle_message(&self, message: &MessageEvent) -> RouterResult<Reply> {
        let match_type = message.match_type;
        let text = message
            .args
            .strip_suffix('\n')
            .unwrap_or(message.args.as_str());

        for rule in self.rules(match_type) {
            if let Some(captures) = rule.pattern.captures(text) {
                debug!(rule = rule.pattern.rule(), %match_type, "Message route matched");
                let ctx = RouteContext::message(message, captures, self);
                return rule.handler.handle(&ctx);
            }
            trace!(rule = rule.pattern.rule(), "Message route did not match");
        }

        let ctx = RouteContext::message(message, Default::default(), self);

        if let Some(handler) = &self.default_handler {
            debug!(%match_type, "No message route matched, using default route");
            return handler.handle(&ctx);
        }

        if self.help_as_default {
            debug!(%match_type, "No message route matched, falling back to help");
            return match &self.help_handler {
                Some(handler) => handler.handle(&ctx),
                None => Ok(self.get_help()),
            };
        }

        warn!(args = text, %match_type, "No message route matched and no default set");
        Err(RouterError::no_matched_route(
            text,
            format!("match type \"{match_type}\""),
        ))
    }
}

impl fmt::Debug for MessageRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageRouter")
            .field("help_message", &self.help_message)
            .field("help_as_default", &self.help_as_default)
            .field("commands", &self.commands.len())
            .field("regexes", &self.regexes.len())
            .field("has_default", &self.default_handler.is_some())
            .field("has_help", &self.help_handler.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{GeneratedHelp, Message, Params};
    use serde::Deserialize;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn command(args: &str) -> MessageEvent {
        MessageEvent::new(MatchType::Command, args)
    }

    fn regex(args: &str) -> MessageEvent {
        MessageEvent::new(MatchType::Regex, args)
    }

    fn text(reply: &Reply) -> &str {
        reply.actions[0]
            .get("text")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
    }

    fn say(text: &'static str) -> impl Fn() -> Reply + Send + Sync + 'static {
        move || Reply::from(Action::post_message(text))
    }

    #[test]
    fn test_command_route() {
        let mut router = MessageRouter::new("");
        router.route("ping", MatchType::Command, say("pong")).unwrap();

        let err = router
            .route("ping", MatchType::Command, say("pong"))
            .unwrap_err();
        assert!(matches!(err, RouterError::RouteAlreadyDefined(_)));

        router
            .route("ping .*", MatchType::Command, say("extra pong"))
            .unwrap();

        assert_eq!(text(&router.handle_message(&command("ping")).unwrap()), "pong");
        assert_eq!(
            text(&router.handle_message(&command("ping test")).unwrap()),
            "extra pong"
        );
    }

    #[test]
    fn test_trailing_newline_is_ignored() {
        let mut router = MessageRouter::new("");
        router.route("ping", MatchType::Command, say("pong")).unwrap();
        router
            .route(
                "find <user>",
                MatchType::Command,
                |Params(p): Params<BTreeMap<String, String>>| Action::post_message(p["user"].clone()),
            )
            .unwrap();

        assert_eq!(text(&router.handle_message(&command("ping\n")).unwrap()), "pong");
        assert_eq!(
            text(&router.handle_message(&command("find alice\n")).unwrap()),
            "alice"
        );
        assert!(matches!(
            router.help_as_default(false).handle_message(&command("ping\n\n")),
            Err(RouterError::NoMatchedRoute { .. })
        ));
    }

    #[test]
    fn test_same_rule_different_match_types() {
        let mut router = MessageRouter::new("");
        router
            .route("123", MatchType::Command, |msg: Message| {
                Action::post_message(msg.args.clone())
            })
            .unwrap()
            .route("123.*abc", MatchType::Regex, |msg: Message| {
                Action::post_message(msg.args.clone())
            })
            .unwrap();

        assert_eq!(text(&router.handle_message(&command("123")).unwrap()), "123");
        assert_eq!(
            text(&router.handle_message(&regex("123 hello abc")).unwrap()),
            "123 hello abc"
        );
    }

    #[test]
    fn test_command_route_with_params() {
        #[derive(Deserialize)]
        struct Find {
            user: String,
        }

        let mut router = MessageRouter::new("");
        router
            .add_message_rule(
                "find <user>",
                MatchType::Command,
                |Params(find): Params<Find>| Action::post_message(format!("found {}", find.user)),
                "",
            )
            .unwrap();

        let reply = router.handle_message(&command("find testuser")).unwrap();
        assert_eq!(text(&reply), "found testuser");
    }

    #[test]
    fn test_first_registered_rule_wins() {
        let mut router = MessageRouter::new("");
        router
            .route(".*ping.*", MatchType::Regex, say("first"))
            .unwrap()
            .route("ping.*", MatchType::Regex, say("second"))
            .unwrap();

        assert_eq!(text(&router.handle_message(&regex("ping me")).unwrap()), "first");
    }

    #[test]
    fn test_greedy_and_lazy_captures() {
        #[derive(Deserialize)]
        struct AtoB {
            a: String,
            b: String,
        }

        fn a_to_b(Params(p): Params<AtoB>) -> Reply {
            Reply::from(Action::post_message(format!("a is {}, b is {}", p.a, p.b)))
        }

        let mut greedy = MessageRouter::new("");
        greedy.route("<a> to <b>", MatchType::Command, a_to_b).unwrap();
        assert_eq!(
            text(&greedy.handle_message(&command("1 to 2")).unwrap()),
            "a is 1, b is 2"
        );
        assert_eq!(
            text(&greedy.handle_message(&command("1 to 2 to 3")).unwrap()),
            "a is 1 to 2, b is 3"
        );

        let mut lazy = MessageRouter::new("");
        lazy.route("<a?> to <b>", MatchType::Command, a_to_b).unwrap();
        assert_eq!(
            text(&lazy.handle_message(&command("1 to 2 to 3")).unwrap()),
            "a is 1, b is 2 to 3"
        );
    }

    #[test]
    fn test_help_as_default() {
        let mut router = MessageRouter::new("example message");
        router
            .route_with_help(
                "ping",
                MatchType::Command,
                "A route to respond to pings.",
                || {},
            )
            .unwrap();

        let reply = router.handle_message(&regex("unknown")).unwrap();
        assert_eq!(
            serde_json::to_value(&reply).unwrap(),
            json!({"actions": [{
                "action": "chat.postMessage",
                "kwargs": {
                    "text": "example message",
                    "attachments": [{
                        "title": "Commands:",
                        "fields": [{
                            "title": "ping",
                            "value": "A route to respond to pings.",
                            "short": false,
                        }],
                    }],
                },
            }]})
        );
    }

    #[test]
    fn test_no_matched_route() {
        let router = MessageRouter::new("example message").help_as_default(false);
        let err = router.handle_message(&regex("unknown")).unwrap_err();
        assert!(matches!(
            err,
            RouterError::NoMatchedRoute { ref route, .. } if route == "unknown"
        ));
    }

    #[test]
    fn test_default_route() {
        let mut router = MessageRouter::new("example message").help_as_default(false);
        router.set_default(say("default message")).unwrap();

        let err = router.set_default(|| {}).unwrap_err();
        assert!(matches!(err, RouterError::RouteAlreadyDefined(_)));

        let reply = router.handle_message(&regex("unknown")).unwrap();
        assert_eq!(text(&reply), "default message");
    }

    #[test]
    fn test_default_route_beats_help() {
        let mut router = MessageRouter::new("example message");
        router
            .route_with_help(
                "ping",
                MatchType::Command,
                "A route to respond to pings.",
                say("default message"),
            )
            .unwrap()
            .set_default(say("default message"))
            .unwrap();

        let reply = router.handle_message(&regex("unknown")).unwrap();
        assert_eq!(text(&reply), "default message");
    }

    #[test]
    fn test_get_help_lists_commands_and_regexes() {
        let mut router = MessageRouter::new("example message");
        router
            .route_with_help("ping", MatchType::Command, "A route to respond to pings.", || {})
            .unwrap()
            .route_with_help(".*test.*", MatchType::Regex, "A test regex route.", || {})
            .unwrap();

        let reply = router.handle_message(&command("help")).unwrap();
        assert_eq!(
            reply.actions[0].get("attachments"),
            Some(&json!([
                {
                    "title": "Commands:",
                    "fields": [{"title": "ping", "value": "A route to respond to pings.", "short": false}],
                },
                {
                    "title": "Regex matches:",
                    "fields": [{"title": ".*test.*", "value": "A test regex route.", "short": false}],
                },
            ]))
        );
    }

    #[test]
    fn test_custom_help() {
        let mut router = MessageRouter::new("example message");
        router.set_help(say("overridden help")).unwrap();

        let err = router.set_help(|| {}).unwrap_err();
        assert!(matches!(err, RouterError::RouteAlreadyDefined(_)));

        let reply = router.handle_message(&command("help")).unwrap();
        assert_eq!(text(&reply), "overridden help");
    }

    #[test]
    fn test_help_command_extends_generated_help() {
        fn help(GeneratedHelp(mut reply): GeneratedHelp) -> Reply {
            reply.push_action(Action::new("reactions.add").kwarg("name", "book"));
            reply
        }

        let mut router = MessageRouter::new("example message");
        router
            .route_with_help("help", MatchType::Command, "Help docs for this bot.", help)
            .unwrap()
            .set_help(help)
            .unwrap();

        let reply = router.handle_message(&command("help")).unwrap();
        assert_eq!(reply.actions.len(), 2);
        assert_eq!(text(&reply), "example message");
        assert_eq!(reply.actions[1].action, "reactions.add");
    }

    #[test]
    fn test_invalid_rule_is_rejected() {
        let mut router = MessageRouter::new("");
        let err = router.route("(", MatchType::Regex, || {}).unwrap_err();
        assert!(matches!(err, RouterError::InvalidPattern { .. }));
        assert_eq!(router.rule_count(MatchType::Regex), 0);
    }
}
