//! Selects and invokes the route for one inbound message.

use tracing::{debug, info, instrument, warn};

use crate::{base::types::Res, service::chat::ChatClient};

use super::{Context, InboundMessage, Request, RouteId, Router};

/// Why a message produced no handler invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The bot authored the message.
    OwnMessage,
    /// The message was not addressed to the bot.
    NotDirected,
    /// Nothing matched and no fallback applied.
    NoMatch,
}

/// The outcome of dispatching one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatched {
    /// A route matched and its handler ran.
    Routed(RouteId),
    /// Nothing matched, so the fallback route ran.
    Fallback(RouteId),
    Ignored(IgnoreReason),
}

impl Router {
    /// Dispatches `message`, invoking at most one handler.
    ///
    /// Only the handler's own error is returned; every other outcome is reported
    /// through [`Dispatched`].
    #[instrument(skip_all, fields(channel_id = %message.channel_id, ts = %message.ts))]
    pub async fn dispatch(&self, chat: &ChatClient, message: InboundMessage) -> Res<Dispatched> {
        let bot_user_id = chat.bot_user_id();

        if message.user_id.as_deref() == Some(bot_user_id) {
            debug!("Ignoring message authored by the bot.");
            return Ok(Dispatched::Ignored(IgnoreReason::OwnMessage));
        }

        // Resolve the channel kind; failures fall through to the mention and prefix checks.

        let is_private = match chat.channel_kind(&message.channel_id).await {
            Ok(kind) => kind.is_private(),
            Err(err) => {
                warn!("Unable to resolve channel kind, assuming a shared channel: {}", err);
                false
            }
        };

        let mut context = Context::derive(&message, bot_user_id, is_private, self.prefix());

        if !context.is_directed {
            debug!("Ignoring message not directed at the bot.");
            return Ok(Dispatched::Ignored(IgnoreReason::NotDirected));
        }

        // Pick the route.

        let (matched, fields) = self.fuzzy_match(&context.content);

        let (route, outcome) = match matched {
            Some(route) => {
                context.fields = fields.unwrap_or_default();
                (route, Dispatched::Routed(route.id))
            }
            None => match self.default_route() {
                Some(route) if context.has_mention_first => (route, Dispatched::Fallback(route.id)),
                _ => {
                    debug!("No route matched `{}`.", context.content);
                    return Ok(Dispatched::Ignored(IgnoreReason::NoMatch));
                }
            },
        };

        info!("Invoking route `{}` ({:?}) ...", route.pattern, outcome);

        let handler = route.handler.clone();
        let request = Request {
            router: self.clone(),
            chat: chat.clone(),
            message,
            context,
        };

        handler(request).await?;

        Ok(outcome)
    }
}

// Tests.
