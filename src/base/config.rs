//! Load configuration via `config` crate with env-override support.

use std::{ops::Deref, sync::Arc};

use serde::Deserialize;

use super::types::Res;

/// Default textual prefix that addresses the bot in shared channels.
fn default_command_prefix() -> String {
    "!".to_string()
}

/// Default for whether the built-in fallback route is registered.
fn default_enable_fallback() -> bool {
    true
}

/// Configuration for the chat-mux application.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// The shared, immutable configuration values.
    pub inner: Arc<ConfigInner>,
}

impl Deref for Config {
    type Target = ConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

/// Configuration values, as deserialized from the environment and config file.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ConfigInner {
    /// Slack app token (`CHAT_MUX_SLACK_APP_TOKEN`).
    pub slack_app_token: String,
    /// Slack bot token (`CHAT_MUX_SLACK_BOT_TOKEN`).
    pub slack_bot_token: String,
    /// Prefix that marks a message as a command (`CHAT_MUX_COMMAND_PREFIX`).
    /// An empty prefix disables prefix addressing entirely.
    #[serde(default = "default_command_prefix")]
    pub command_prefix: String,
    /// Whether unmatched, explicitly addressed messages get the fallback reply (`CHAT_MUX_ENABLE_FALLBACK`).
    #[serde(default = "default_enable_fallback")]
    pub enable_fallback: bool,
}

impl Config {
    /// Loads the configuration from `CHAT_MUX_*` environment variables and an optional TOML file.
    pub fn load(explicit_path: Option<&std::path::Path>) -> Res<Self> {
        let mut cfg = config::Config::builder().add_source(config::Environment::default().prefix("CHAT_MUX").prefix_separator("_"));

        if let Some(p) = explicit_path {
            cfg = cfg.add_source(config::File::from(p.to_path_buf()));
        } else if std::path::Path::new(".hidden/config.toml").exists() {
            cfg = cfg.add_source(config::File::with_name(".hidden/config.toml"));
        }

        let result = Config {
            inner: Arc::new(cfg.build()?.try_deserialize()?),
        };

        result.validate()?;

        Ok(result)
    }

    /// Checks values that deserialize fine but cannot work at runtime.
    pub fn validate(&self) -> Res<()> {
        if self.command_prefix.chars().any(char::is_whitespace) {
            return Err(anyhow::anyhow!("Command prefix must not contain whitespace."));
        }

        if self.slack_app_token.is_empty() || self.slack_bot_token.is_empty() {
            return Err(anyhow::anyhow!("Both the Slack app token and the Slack bot token must be set."));
        }

        Ok(())
    }
}

// Tests.
