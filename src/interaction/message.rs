//! Entry point for inbound chat messages.

use tracing::{Instrument, error, instrument};

use crate::{
    base::types::Void,
    router::{InboundMessage, Router},
    service::chat::ChatClient,
};

/// Handles one inbound message.
///
/// The message is dispatched on its own task, so a slow handler never holds up
/// other messages. Errors from the invoked handler are logged, never propagated.
#[instrument(skip_all)]
pub fn handle_message(message: InboundMessage, router: Router, chat: ChatClient) {
    tokio::spawn(async move {
        // Process the event.
        let result = handle_message_internal(message, &router, &chat).in_current_span().await;

        // Log any errors.
        if let Err(err) = &result {
            error!("Error while handling: {}", err);
        }
    });
}

/// Internal function to dispatch the message.
#[instrument(skip_all)]
async fn handle_message_internal(message: InboundMessage, router: &Router, chat: &ChatClient) -> Void {
    router.dispatch(chat, message).await?;

    Ok(())
}
