//! Ping Bot Example
//!
//! A receiver with a handful of routes, fed from a file or stdin instead of
//! an HTTP endpoint so routes can be tried without running omnibot.
//!
//! # Routes
//!
//! ```text
//! message (command)  "ping"          -> pong, threaded
//! message (command)  "find <user>"   -> looks the user up
//! message (regex)    ".*ping.*"      -> reacts to pings mid-sentence
//! message (other)                    -> generated help, extended
//! interactive        "ping_callback" -> ephemeral pong
//! interactive (other)                -> default response
//! ```
//!
//! # Usage
//!
//! ```bash
//! echo '{"omnibot_payload_type": "message", "match_type": "command", "args": "ping"}' \
//!     | cargo run --package ping-bot
//! cargo run --package ping-bot -- events.json --pretty
//! ```
//!
//! The input is one payload or a JSON array of payloads; one reply is
//! printed per payload.

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use omnibot_receiver::prelude::*;
use omnibot_receiver::runtime::config::{ConfigLoader, LogOutput, LoggingConfig};
use omnibot_receiver::runtime::logging::LoggingBuilder;
use serde::Deserialize;
use serde_json::Value;
use tracing::{error, info};

// ============================================================================
// Handler Functions
// ============================================================================

fn ping(msg: Message) -> PostMessage {
    info!(channel = ?msg.field("channel_id"), "Ping received");
    PostMessage::new("pong")
}

#[derive(Deserialize)]
struct Find {
    user: String,
}

fn find_user(Params(find): Params<Find>) -> Result<PostMessage, String> {
    let user = find.user.trim();
    if user.is_empty() || user.contains(char::is_whitespace) {
        return Err(format!("{user:?} is not a user name"));
    }
    Ok(PostMessage::new(format!("Looking up <@{user}>")).omnibot_parse(serde_json::json!(["all"])))
}

fn overheard_ping(msg: Message) -> PostMessage {
    PostMessage::new(format!("Did someone say ping? ({} chars)", msg.args.len())).thread(false)
}

/// Generated help, plus a reminder of the interactive button.
fn help(GeneratedHelp(mut reply): GeneratedHelp) -> Reply {
    reply.extend(
        PostMessage::new("Tip: press the ping button for a private pong.")
            .ephemeral(true)
            .build(),
    );
    reply
}

fn ping_button(event: Interactive) -> SimpleResponse {
    let user = event
        .field("user")
        .and_then(|u| u.get("name"))
        .and_then(Value::as_str)
        .unwrap_or("someone");
    SimpleResponse::new(format!("pong, {user}"))
        .ephemeral(true)
        .replace_original(false)
}

fn unknown_component(event: Interactive) -> SimpleResponse {
    SimpleResponse::new(format!(
        "Nothing handles {}",
        event.callback_id.as_deref().unwrap_or("this component")
    ))
    .ephemeral(true)
}

fn build_router(config: &OmnibotConfig) -> RouterResult<OmnibotRouter> {
    let mut messages = config.router.message_router();
    messages
        .route_with_help("ping", MatchType::Command, "Reply with pong", ping)?
        .route_with_help("find <user>", MatchType::Command, "Look up a user", find_user)?
        .route(".*ping.*", MatchType::Regex, overheard_ping)?
        .set_help(help)?;

    let mut interactive = InteractiveRouter::new();
    interactive
        .route("ping_callback", ping_button)?
        .set_default(unknown_component)?;

    Ok(OmnibotRouter::new()
        .with_message_router(messages)
        .with_interactive_router(interactive))
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// File holding a payload or an array of payloads; stdin when omitted.
    input: Option<PathBuf>,

    /// Configuration file (omnibot.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Configuration profile.
    #[arg(short, long)]
    profile: Option<String>,

    /// Pretty-print replies.
    #[arg(long)]
    pretty: bool,

    /// Log at debug level.
    #[arg(short, long)]
    verbose: bool,
}

fn read_input(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut input = String::new();
            std::io::stdin()
                .read_to_string(&mut input)
                .context("failed to read stdin")?;
            Ok(input)
        }
    }
}

/// Logger from the `[logging]` section. Replies go to stdout, so stdout
/// output is moved to stderr; file output is kept.
fn logger(config: &LoggingConfig, verbose: bool) -> LoggingBuilder {
    let mut builder = LoggingBuilder::from_config(config);
    if config.output == LogOutput::Stdout {
        builder = builder.output(LogOutput::Stderr);
    }
    if verbose {
        builder = builder.with_level(tracing::Level::DEBUG);
    }
    builder
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut loader = ConfigLoader::new();
    if let Some(path) = &args.config {
        loader = loader.file(path);
    }
    if let Some(profile) = &args.profile {
        loader = loader.profile(profile);
    }
    let config = loader.load()?;

    logger(&config.logging, args.verbose).init();
    let receiver = Receiver::from_config(config, build_router)?;

    let input = read_input(args.input.as_ref())?;
    let payloads = match serde_json::from_str::<Value>(&input).context("input is not JSON")? {
        Value::Array(payloads) => payloads,
        payload => vec![payload],
    };

    let mut failed = 0;
    for payload in &payloads {
        match receiver.handle_value(payload) {
            Ok(reply) => {
                let out = if args.pretty {
                    serde_json::to_string_pretty(&reply)?
                } else {
                    serde_json::to_string(&reply)?
                };
                println!("{out}");
            }
            Err(e) => {
                error!("Failed to handle payload: {e}");
                failed += 1;
            }
        }
    }

    info!(total = payloads.len(), failed, "Done");
    if failed > 0 {
        anyhow::bail!("{failed} of {} payloads failed", payloads.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use omnibot_receiver::runtime::config::LogLevel;

    #[test]
    fn test_logger_keeps_stdout_free() {
        let mut config = LoggingConfig::default();
        config
            .filters
            .insert("omnibot_router".to_string(), LogLevel::Trace);

        let debug = format!("{:?}", logger(&config, false));
        assert!(debug.contains("output: Stderr"));
        assert!(debug.contains("omnibot_router=trace"));
    }

    #[test]
    fn test_logger_keeps_file_output() {
        let config = LoggingConfig {
            output: LogOutput::File,
            file_path: Some(PathBuf::from("logs/ping-bot.log")),
            ..Default::default()
        };

        let debug = format!("{:?}", logger(&config, true));
        assert!(debug.contains("output: File"));
        assert!(debug.contains("ping-bot.log"));
    }

    #[test]
    fn test_ping_route() {
        let receiver = Receiver::from_config(OmnibotConfig::default(), build_router).unwrap();
        let reply = receiver
            .handle_value(&serde_json::json!({
                "omnibot_payload_type": "message",
                "match_type": "command",
                "args": "ping\n",
            }))
            .unwrap();
        assert_eq!(reply.actions[0].get("text"), Some(&Value::String("pong".into())));
    }
}
