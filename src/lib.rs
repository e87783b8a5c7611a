//! Library root for `chat-mux`.
//!
//! Chat-mux is a command router for Slack bots. For every inbound message it:
//! - Decides whether the bot was addressed (direct message, @-mention, or prefix)
//! - Strips the addressing from the text
//! - Picks a route by exact or prefix match on the words of the message
//! - Invokes at most one handler, or a fallback for unknown commands
//!
//! The chat platform sits behind the `GenericChatClient` trait, so the routing
//! core can be exercised without a live connection.

#[deny(missing_docs)]
pub mod base;
pub mod interaction;
pub mod router;
pub mod runtime;
pub mod service;

use base::{config::Config, types::Void};
use rustls::crypto;
use tracing::info;

/// Public async entry for the binary crate.
///
/// Sets up necessary services and starts the chat-mux runtime:
/// - Initializes the crypto provider
/// - Registers the routes and connects the chat client
/// - Starts the main event loop for processing messages
pub async fn start(config: Config) -> Void {
    info!("Starting chat-mux ...");

    // Start the crypto provider.
    crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install the default crypto provider."))?;

    // Initialize the runtime.
    let runtime = runtime::Runtime::new(config).await?;

    // Start the runtime.
    runtime.start().await?;

    Ok(())
}
