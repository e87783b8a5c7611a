//! Command routing for chat-mux.
//!
//! This module decides whether an inbound message is addressed to the bot and,
//! if so, which registered route should handle it:
//! - [`registry`] owns the ordered routes and the fuzzy prefix lookup.
//! - [`context`] derives how the bot was addressed and normalizes the text.
//! - [`dispatcher`] ties both together and invokes at most one handler.

pub mod context;
pub mod dispatcher;
pub mod registry;

use std::sync::Arc;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

use crate::{base::types::Void, service::chat::ChatClient};

pub use context::Context;
pub use dispatcher::{Dispatched, IgnoreReason};
pub use registry::{Route, RouteId, Router, RouterBuilder};

// Types.

/// An identity referenced in a message, paired with the markup used to reference it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mention {
    /// The user ID of the mentioned identity.
    pub user_id: String,
    /// The raw markup in the message text (e.g., `<@U12345>`).
    pub markup: String,
}

/// A platform-neutral inbound message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    /// The channel the message was posted in.
    pub channel_id: String,
    /// The author, if the platform reported one.
    pub user_id: Option<String>,
    /// The raw message text.
    pub text: String,
    /// The message timestamp, which doubles as its ID.
    pub ts: String,
    /// The parent thread, if the message was posted in a thread.
    pub thread_ts: Option<String>,
    /// The identities mentioned in the text, in order of appearance.
    pub mentions: Vec<Mention>,
}

impl InboundMessage {
    /// The thread a reply to this message belongs in.
    ///
    /// Top-level messages start a new thread rooted at themselves.
    pub fn reply_thread_ts(&self) -> &str {
        self.thread_ts.as_deref().unwrap_or(&self.ts)
    }
}

/// Everything a route handler receives for one invocation.
#[derive(Clone)]
pub struct Request {
    /// The router that selected the route, so handlers can inspect the other routes.
    pub router: Router,
    /// The chat client used to reply.
    pub chat: ChatClient,
    /// The message that triggered the route.
    pub message: InboundMessage,
    /// How the bot was addressed, and the normalized content.
    pub context: Context,
}

/// A type-erased, cheaply cloneable route handler.
pub type BoxedHandler = Arc<dyn Fn(Request) -> BoxFuture<'static, Void> + Send + Sync>;
