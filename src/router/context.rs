//! Addressing detection and content normalization.

use serde::{Deserialize, Serialize};

use super::InboundMessage;

/// How a message addressed the bot, plus its normalized content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    /// The words handed to the matched route.
    pub fields: Vec<String>,
    /// The trimmed text with the addressing markup or prefix removed.
    pub content: String,
    pub is_directed: bool,
    pub is_private: bool,
    pub has_prefix: bool,
    pub has_mention: bool,
    /// Set when the message opens with the bot's mention, or with the prefix.
    pub has_mention_first: bool,
}

impl Context {
    /// Derives the context of `message` as seen by the bot `bot_user_id`.
    ///
    /// The checks run in order and the first that applies decides the addressing:
    /// a private channel, then a mention of the bot, then the textual `prefix`.
    /// `fields` is left empty; it is filled once a route is matched.
    pub fn derive(message: &InboundMessage, bot_user_id: &str, is_private: bool, prefix: &str) -> Self {
        let content = message.text.trim();

        if is_private {
            return Self {
                content: content.to_string(),
                is_directed: true,
                is_private: true,
                ..Default::default()
            };
        }

        if message.mentions.iter().any(|m| m.user_id == bot_user_id) {
            // Every markup variant that points at the bot is stripped, the first found leading.
            let mut markups: Vec<&str> = Vec::new();
            for mention in message.mentions.iter().filter(|m| m.user_id == bot_user_id && !m.markup.is_empty()) {
                if !markups.contains(&mention.markup.as_str()) {
                    markups.push(&mention.markup);
                }
            }

            let has_mention_first = markups.iter().any(|markup| content.starts_with(markup));
            let content = markups.iter().fold(content.to_string(), |acc, markup| acc.replace(markup, ""));

            return Self {
                content,
                is_directed: true,
                has_mention: true,
                has_mention_first,
                ..Default::default()
            };
        }

        if !prefix.is_empty()
            && let Some(rest) = content.strip_prefix(prefix)
        {
            return Self {
                content: rest.to_string(),
                is_directed: true,
                has_prefix: true,
                has_mention_first: true,
                ..Default::default()
            };
        }

        Self {
            content: content.to_string(),
            ..Default::default()
        }
    }
}

// Tests.

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::Mention;

    const BOT: &str = "UBOT";

    fn message(text: &str, mentions: &[(&str, &str)]) -> InboundMessage {
        InboundMessage {
            channel_id: "C123".to_string(),
            user_id: Some("UUSER".to_string()),
            text: text.to_string(),
            ts: "1700000000.000100".to_string(),
            thread_ts: None,
            mentions: mentions
                .iter()
                .map(|(user_id, markup)| Mention {
                    user_id: user_id.to_string(),
                    markup: markup.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_private_channel_skips_mention_and_prefix() {
        let msg = message("  <@UBOT> !help  ", &[(BOT, "<@UBOT>")]);

        let ctx = Context::derive(&msg, BOT, true, "!");

        assert!(ctx.is_directed);
        assert!(ctx.is_private);
        assert!(!ctx.has_mention);
        assert!(!ctx.has_prefix);
        assert!(!ctx.has_mention_first);
        assert_eq!(ctx.content, "<@UBOT> !help");
    }

    #[test]
    fn test_leading_mention_is_stripped() {
        let msg = message("<@UBOT> help me", &[(BOT, "<@UBOT>")]);

        let ctx = Context::derive(&msg, BOT, false, "!");

        assert!(ctx.is_directed);
        assert!(ctx.has_mention);
        assert!(ctx.has_mention_first);
        assert!(!ctx.has_prefix);
        assert!(!ctx.is_private);
        assert_eq!(ctx.content, " help me");
        assert!(ctx.fields.is_empty());
    }

    #[test]
    fn test_inner_mention_is_not_first() {
        let msg = message("hey <@UBOT> help and <@UBOT> again", &[(BOT, "<@UBOT>")]);

        let ctx = Context::derive(&msg, BOT, false, "!");

        assert!(ctx.is_directed);
        assert!(ctx.has_mention);
        assert!(!ctx.has_mention_first);
        assert!(!ctx.content.contains("<@UBOT>"));
        assert_eq!(ctx.content, "hey  help and  again");
    }

    #[test]
    fn test_mention_first_is_measured_after_trim() {
        let msg = message("   <@UBOT>ping", &[(BOT, "<@UBOT>")]);

        let ctx = Context::derive(&msg, BOT, false, "");

        assert!(ctx.has_mention_first);
        assert_eq!(ctx.content, "ping");
    }

    #[test]
    fn test_all_markup_variants_of_the_bot_are_stripped() {
        let msg = message("<@UBOT|bot> hi <@UBOT>", &[(BOT, "<@UBOT|bot>"), (BOT, "<@UBOT>")]);

        let ctx = Context::derive(&msg, BOT, false, "!");

        assert!(ctx.has_mention_first);
        assert_eq!(ctx.content, " hi ");
    }

    #[test]
    fn test_other_mentions_do_not_direct() {
        let msg = message("<@UOTHER> help", &[("UOTHER", "<@UOTHER>")]);

        let ctx = Context::derive(&msg, BOT, false, "");

        assert!(!ctx.is_directed);
        assert!(!ctx.has_mention);
        assert_eq!(ctx.content, "<@UOTHER> help");
    }

    #[test]
    fn test_mention_wins_over_prefix() {
        let msg = message("!help <@UBOT>", &[(BOT, "<@UBOT>")]);

        let ctx = Context::derive(&msg, BOT, false, "!");

        assert!(ctx.has_mention);
        assert!(!ctx.has_prefix);
        assert!(!ctx.has_mention_first);
        assert_eq!(ctx.content, "!help ");
    }

    #[test]
    fn test_prefix_is_stripped_once() {
        let msg = message("  !!help  ", &[]);

        let ctx = Context::derive(&msg, BOT, false, "!");

        assert!(ctx.is_directed);
        assert!(ctx.has_prefix);
        assert!(ctx.has_mention_first);
        assert!(!ctx.has_mention);
        assert_eq!(ctx.content, "!help");
    }

    #[test]
    fn test_multichar_prefix() {
        let msg = message("bot: deploy now", &[]);

        let ctx = Context::derive(&msg, BOT, false, "bot:");

        assert!(ctx.has_prefix);
        assert_eq!(ctx.content, " deploy now");
    }

    #[test]
    fn test_empty_prefix_never_directs() {
        let msg = message("help", &[]);

        let ctx = Context::derive(&msg, BOT, false, "");

        assert!(!ctx.is_directed);
        assert_eq!(ctx.content, "help");
    }

    #[test]
    fn test_undirected_message() {
        let msg = message("just chatting !help", &[]);

        let ctx = Context::derive(&msg, BOT, false, "!");

        assert_eq!(
            ctx,
            Context {
                content: "just chatting !help".to_string(),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_self_mention_with_empty_markup_degrades() {
        let msg = message("help", &[(BOT, "")]);

        let ctx = Context::derive(&msg, BOT, false, "!");

        assert!(ctx.is_directed);
        assert!(ctx.has_mention);
        assert!(!ctx.has_mention_first);
        assert_eq!(ctx.content, "help");
    }

    #[test]
    fn test_empty_text() {
        let ctx = Context::derive(&message("   ", &[]), BOT, false, "!");

        assert!(!ctx.is_directed);
        assert_eq!(ctx.content, "");
    }

    #[test]
    fn test_derive_is_idempotent() {
        let msg = message("<@UBOT> status all", &[(BOT, "<@UBOT>")]);

        let first = Context::derive(&msg, BOT, false, "!");
        let second = Context::derive(&msg, BOT, false, "!");

        assert_eq!(first, second);
    }
}
