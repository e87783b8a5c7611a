//! Built-in routes available on every bot.

use tracing::{info, instrument};

use crate::{
    base::{config::Config, types::Void},
    router::{Request, RouterBuilder},
};

/// Emoji used to flag a command the bot did not understand.
const UNKNOWN_COMMAND_EMOJI: &str = "grey_question";

/// Registers the built-in routes on `builder`.
pub fn register(builder: &mut RouterBuilder, config: &Config) {
    let help_id = builder.register("help", "Lists the available commands.", help);
    builder.with_help(help_id, "`help` lists every command. `help <command>` shows the usage of one command.");

    let ping_id = builder.register("ping", "Checks that the bot is alive.", ping);
    builder.with_help(ping_id, "`ping` replies with `pong`.");

    if config.enable_fallback {
        let fallback = builder.register("", "Replies to commands the bot does not know.", unknown);
        builder.set_default(fallback);
    }
}

/// Renders the command listing, or the usage of a single command when `topic` names one.
pub fn render_help(request: &Request, topic: Option<&str>) -> String {
    let router = &request.router;

    if let Some(topic) = topic
        && let Some(route) = router.routes().iter().find(|r| !r.pattern.is_empty() && r.pattern == topic)
    {
        let usage = if route.help.is_empty() { &route.description } else { &route.help };
        return format!("*{}*: {}", route.pattern, usage);
    }

    let mut lines = vec!["Available commands:".to_string()];

    for route in router.routes().iter().filter(|r| !r.pattern.is_empty()) {
        lines.push(format!("• `{}` - {}", route.pattern, route.description));
    }

    if !router.prefix().is_empty() && !request.context.is_private {
        lines.push(format!("Mention me or start a message with `{}` to run a command.", router.prefix()));
    }

    lines.join("\n")
}

#[instrument(skip_all)]
async fn help(request: Request) -> Void {
    let topic = request.context.fields.get(1).map(String::as_str);
    let text = render_help(&request, topic);

    request.chat.send_message(&request.message.channel_id, request.message.reply_thread_ts(), &text).await
}

#[instrument(skip_all)]
async fn ping(request: Request) -> Void {
    request.chat.send_message(&request.message.channel_id, request.message.reply_thread_ts(), "pong").await
}

#[instrument(skip_all)]
async fn unknown(request: Request) -> Void {
    info!("Unknown command `{}`.", request.context.content.trim());

    let message = &request.message;

    // A failed reaction does not stop the reply.
    let _ = request.chat.react_to_message(&message.channel_id, &message.ts, UNKNOWN_COMMAND_EMOJI).await;

    request
        .chat
        .send_message(&message.channel_id, message.reply_thread_ts(), "Sorry, I don't know that command. Try `help`.")
        .await
}

// Tests.
