//! Runtime services and shared state for chat-mux.

use tracing::{info, instrument};

use crate::{
    base::{
        config::Config,
        types::{Res, Void},
    },
    interaction::builtin,
    router::{Router, RouterBuilder},
    service::chat::ChatClient,
};

/// Runtime service context that can be shared across the application.
///
/// This struct holds the router, chat client, and configuration.
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct Runtime {
    /// The configuration for the application.
    pub config: Config,
    /// The frozen route table.
    pub router: Router,
    /// The chat client instance.
    pub chat: ChatClient,
}

impl Runtime {
    /// Create a new runtime instance.
    #[instrument(skip_all)]
    pub async fn new(config: Config) -> Res<Self> {
        // Register all routes before any message can arrive.
        let router = Self::build_router(&config);

        // Initialize the slack client.
        let chat = ChatClient::slack(&config, router.clone()).await?;

        Ok(Self { config, router, chat })
    }

    /// Registers the built-in routes and freezes them.
    pub fn build_router(config: &Config) -> Router {
        let mut builder = RouterBuilder::new(config.command_prefix.clone());
        builtin::register(&mut builder, config);

        let router = builder.build();
        info!("Registered {} routes (prefix: `{}`).", router.routes().len(), router.prefix());

        router
    }

    pub async fn start(&self) -> Void {
        self.chat.start().await
    }
}
