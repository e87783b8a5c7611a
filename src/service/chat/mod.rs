pub mod slack;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::base::types::{Res, Void};

// Types.

/// The kind of conversation a channel is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChannelKind {
    /// A one-to-one conversation with the bot.
    Direct,
    /// A multi-person direct conversation.
    Group,
    /// A regular public or private channel.
    Channel,
}

impl ChannelKind {
    /// Whether every message in the channel is implicitly addressed to the bot.
    pub fn is_private(&self) -> bool {
        matches!(self, ChannelKind::Direct)
    }
}

// Traits.

/// Generic "chat" trait that clients must implement.
///
/// This trait defines the core functionality for interacting with chat platforms
/// like Slack. Implementing this trait allows different chat services to be used
/// with the router.
#[async_trait]
pub trait GenericChatClient: Send + Sync + 'static {
    /// Get the bot user ID.
    ///
    /// Returns the unique identifier for the bot in the chat platform,
    /// which is used to detect when the bot is mentioned.
    fn bot_user_id(&self) -> &str;

    /// Start the chat client listener.
    ///
    /// This sets up event listeners for the chat platform and begins processing
    /// incoming messages and events.
    async fn start(&self) -> Void;

    /// Send a message to a channel thread.
    async fn send_message(&self, channel_id: &str, thread_ts: &str, text: &str) -> Void;

    /// React to a message with an emoji.
    async fn react_to_message(&self, channel_id: &str, ts: &str, emoji: &str) -> Void;

    /// Resolve the kind of a channel.
    ///
    /// May fail when the channel is neither cached nor fetchable; callers treat
    /// that as a shared channel.
    async fn channel_kind(&self, channel_id: &str) -> Res<ChannelKind>;
}

// Structs.

/// Chat client for the application.
///
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct ChatClient {
    inner: Arc<dyn GenericChatClient>,
}

impl Deref for ChatClient {
    type Target = dyn GenericChatClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl ChatClient {
    pub fn new(inner: Arc<dyn GenericChatClient>) -> Self {
        Self { inner }
    }
}
