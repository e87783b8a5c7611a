//! Chat service integration for Slack.
//!
//! This module receives Slack events over socket mode, converts them into
//! [`InboundMessage`]s for the router, and implements the [`GenericChatClient`]
//! operations (replies, reactions, channel lookups) on top of `slack-morphism`.

use crate::{
    base::{
        config::Config,
        types::{Res, Void},
    },
    interaction,
    router::{InboundMessage, Mention, Router},
};
use async_trait::async_trait;
use dashmap::DashMap;
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;
use regex::Regex;
use slack_morphism::prelude::*;
use tracing::{debug, info, instrument, warn};

use std::{
    ops::Deref,
    sync::{Arc, LazyLock},
};

use super::{ChannelKind, ChatClient, GenericChatClient};

// Type aliases.

type FullClient = slack_morphism::SlackClient<SlackClientHyperConnector<HttpsConnector<HttpConnector>>>;

/// Matches `<@U123>` and `<@U123|label>` user mentions.
static MENTION_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<@([A-Z0-9]+)(?:\|[^>]*)?>").expect("mention regex is valid"));

// Extra methods on `ChatClient` applied by the slack implementation.

impl ChatClient {
    /// Creates a new Slack chat client that dispatches messages through `router`.
    pub async fn slack(config: &Config, router: Router) -> Res<Self> {
        let client = SlackChatClient::new(config, router).await?;
        Ok(Self { inner: Arc::new(client) })
    }
}

impl From<SlackChatClient> for ChatClient {
    fn from(client: SlackChatClient) -> Self {
        Self { inner: Arc::new(client) }
    }
}

// Structs.

/// User state for the slack socket client.
struct SlackUserState {
    router: Router,
    chat: ChatClient,
    channel_kinds: Arc<DashMap<String, ChannelKind>>,
}

/// Slack client implementation.
#[derive(Clone)]
struct SlackChatClient {
    pub app_token: SlackApiToken,
    pub bot_token: SlackApiToken,
    pub bot_user_id: String,
    pub client: Arc<FullClient>,
    pub router: Router,
    /// Channel kinds learned from events and lookups.
    pub channel_kinds: Arc<DashMap<String, ChannelKind>>,
}

impl Deref for SlackChatClient {
    type Target = slack_morphism::SlackClient<SlackClientHyperConnector<HttpsConnector<HttpConnector>>>;

    fn deref(&self) -> &Self::Target {
        &self.client
    }
}

impl SlackChatClient {
    /// Create a new Slack chat client.
    #[instrument(name = "SlackChatClient::new", skip_all)]
    pub async fn new(config: &Config, router: Router) -> Res<Self> {
        // Initialize tokens.

        let app_token = SlackApiToken::new(SlackApiTokenValue(config.slack_app_token.clone()));
        let bot_token = SlackApiToken::new(SlackApiTokenValue(config.slack_bot_token.clone()));

        // Initialize the Slack client.

        let https_connector = HttpsConnector::<HttpConnector>::builder().with_native_roots()?.https_only().enable_all_versions().build();
        let connector = SlackClientHyperConnector::with_connector(https_connector);
        let client = Arc::new(slack_morphism::SlackClient::new(connector));

        // Get the bot's user ID.

        let session = client.open_session(&bot_token);
        let bot_user = session.auth_test().await?;
        let bot_user_id = bot_user.user_id.0;

        info!("Slack bot user ID: {}", bot_user_id);

        Ok(Self {
            app_token,
            bot_token,
            bot_user_id,
            client,
            router,
            channel_kinds: Arc::new(DashMap::new()),
        })
    }

    /// Fetches the channel from the Slack API.
    async fn fetch_channel_kind(&self, channel_id: &str) -> Res<ChannelKind> {
        let request = SlackApiConversationsInfoRequest::new(SlackChannelId(channel_id.to_string()));
        let session = self.client.open_session(&self.bot_token);

        let response = session.conversations_info(&request).await.map_err(|e| anyhow::anyhow!("Failed to fetch channel `{}`: {}", channel_id, e))?;
        let flags = &response.channel.flags;

        let kind = if flags.is_im.unwrap_or(false) {
            ChannelKind::Direct
        } else if flags.is_mpim.unwrap_or(false) {
            ChannelKind::Group
        } else {
            ChannelKind::Channel
        };

        Ok(kind)
    }
}

#[async_trait]
impl GenericChatClient for SlackChatClient {
    fn bot_user_id(&self) -> &str {
        &self.bot_user_id
    }

    async fn start(&self) -> Void {
        // Initialize the socket mode listener.

        let socket_mode_callbacks = SlackSocketModeListenerCallbacks::new()
            .with_command_events(handle_command_event)
            .with_interaction_events(handle_interaction_event)
            .with_push_events(handle_push_event);

        // Initialize the socket mode listener environment.

        let listener_environment = Arc::new(SlackClientEventsListenerEnvironment::new(self.client.clone()).with_user_state(SlackUserState {
            router: self.router.clone(),
            chat: ChatClient::from(self.clone()),
            channel_kinds: self.channel_kinds.clone(),
        }));

        let socket_mode_listener = Arc::new(SlackClientSocketModeListener::new(
            &SlackClientSocketModeConfig::new(),
            listener_environment.clone(),
            socket_mode_callbacks,
        ));

        // Register an app token to listen for events,
        socket_mode_listener.listen_for(&self.app_token).await?;

        // Start WS connections and wait for Ctrl-C to shutdown.
        socket_mode_listener.serve().await;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn send_message(&self, channel_id: &str, thread_ts: &str, text: &str) -> Void {
        let message = SlackMessageContent::new().with_text(text.to_string());

        let request = SlackApiChatPostMessageRequest::new(SlackChannelId(channel_id.to_string()), message)
            .with_as_user(true)
            .with_thread_ts(SlackTs(thread_ts.to_string()))
            .with_link_names(true);

        let session = self.client.open_session(&self.bot_token);

        let _ = session.chat_post_message(&request).await.map_err(|e| anyhow::anyhow!("Failed to send message: {}", e))?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn react_to_message(&self, channel_id: &str, ts: &str, emoji: &str) -> Void {
        let request = SlackApiReactionsAddRequest {
            channel: SlackChannelId(channel_id.to_string()),
            name: SlackReactionName(emoji.to_string()),
            timestamp: SlackTs(ts.to_string()),
        };

        let session = self.client.open_session(&self.bot_token);

        let _ = session.reactions_add(&request).await.map_err(|e| anyhow::anyhow!("Failed to react to message: {}", e))?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn channel_kind(&self, channel_id: &str) -> Res<ChannelKind> {
        if let Some(kind) = self.channel_kinds.get(channel_id) {
            return Ok(*kind);
        }

        let kind = self.fetch_channel_kind(channel_id).await?;
        self.channel_kinds.insert(channel_id.to_string(), kind);

        Ok(kind)
    }
}

// Event conversion.

/// Extracts the user mentions in `text`, in order of first appearance.
pub fn extract_mentions(text: &str) -> Vec<Mention> {
    let mut mentions: Vec<Mention> = Vec::new();

    for captures in MENTION_REGEX.captures_iter(text) {
        let mention = Mention {
            user_id: captures[1].to_string(),
            markup: captures[0].to_string(),
        };

        if !mentions.contains(&mention) {
            mentions.push(mention);
        }
    }

    mentions
}

/// Maps Slack's `channel_type` event field to a [`ChannelKind`].
pub fn channel_kind_from_type(channel_type: &str) -> Option<ChannelKind> {
    match channel_type {
        "im" => Some(ChannelKind::Direct),
        "mpim" => Some(ChannelKind::Group),
        "channel" | "group" => Some(ChannelKind::Channel),
        _ => None,
    }
}

/// Builds the router's view of a plain user message.
pub fn inbound_message(channel_id: &str, user_id: Option<&str>, text: &str, ts: &str, thread_ts: Option<&str>) -> InboundMessage {
    InboundMessage {
        channel_id: channel_id.to_string(),
        user_id: user_id.map(str::to_string),
        text: text.to_string(),
        ts: ts.to_string(),
        thread_ts: thread_ts.map(str::to_string),
        mentions: extract_mentions(text),
    }
}

/// Converts a Slack message event, skipping edits, joins, and other subtyped events.
fn inbound_from_message_event(event: &SlackMessageEvent) -> Option<InboundMessage> {
    if event.subtype.is_some() {
        return None;
    }

    let channel_id = event.origin.channel.as_ref()?;
    let text = event.content.as_ref().and_then(|c| c.text.as_deref())?;

    Some(inbound_message(
        &channel_id.0,
        event.sender.user.as_ref().map(|u| u.0.as_str()),
        text,
        &event.origin.ts.0,
        event.origin.thread_ts.as_ref().map(|t| t.0.as_str()),
    ))
}

// Socket mode listener callbacks for Slack.

/// Handles command events from Slack.
async fn handle_command_event(
    event: SlackCommandEvent,
    _client: Arc<SlackHyperClient>,
    _states: SlackClientEventsUserState,
) -> Result<SlackCommandEventResponse, Box<dyn std::error::Error + Send + Sync>> {
    warn!("[COMMAND] {:#?}", event);
    Ok(SlackCommandEventResponse::new(SlackMessageContent::new().with_text("Slash commands are not supported; mention me instead.".into())))
}

/// Handles interaction events from Slack.
async fn handle_interaction_event(event: SlackInteractionEvent, _client: Arc<SlackHyperClient>, _states: SlackClientEventsUserState) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    warn!("[INTERACTION] {:#?}", event);
    Ok(())
}

/// Handles push events from Slack.
#[instrument(skip_all)]
async fn handle_push_event(event_callback: SlackPushEventCallback, _client: Arc<SlackHyperClient>, states: SlackClientEventsUserState) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let event = event_callback.event;
    let states = states.read().await;
    let user_state = states.get_user_state::<SlackUserState>().ok_or(anyhow::anyhow!("Failed to get user state"))?;

    match event {
        SlackEventCallbackBody::Message(slack_message_event) => {
            debug!("Received message event ...");

            let Some(message) = inbound_from_message_event(&slack_message_event) else {
                debug!("Skipping message event without routable text.");
                return Ok(());
            };

            // The event already says what kind of channel this is, so remember it.
            if let Some(kind) = slack_message_event.origin.channel_type.as_ref().and_then(|t| channel_kind_from_type(&t.0)) {
                user_state.channel_kinds.insert(message.channel_id.clone(), kind);
            }

            interaction::message::handle_message(message, user_state.router.clone(), user_state.chat.clone());
        }
        SlackEventCallbackBody::AppMention(_) => {
            // Mentions also arrive as message events, which carry everything routing needs.
            debug!("Skipping app mention event in favor of its message event.");
        }
        _ => {
            warn!("Received unhandled push event.")
        }
    }

    Ok(())
}

// Tests.
