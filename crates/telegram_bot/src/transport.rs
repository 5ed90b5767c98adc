//! Message delivery.
//!
//! [`Transport`] is what the pipeline needs from a chat service: a stream of
//! inbound messages and a way to answer with plain text. [`TelegramTransport`]
//! implements it with Bot API long polling.

use std::{collections::VecDeque, time::Duration};

use async_trait::async_trait;
use teloxide::{
    payloads::GetUpdatesSetters,
    requests::Requester,
    types::{ChatId, Message, UpdateKind},
    utils::command::BotCommands,
};

use crate::{BotError, commands::MenuCommands};

/// Seconds Telegram holds a `getUpdates` call open when nothing arrives.
const POLL_TIMEOUT_SECS: u32 = 60;

/// A message as seen by the pipeline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Inbound {
    /// Sender username; `None` when the message has no sender at all, empty
    /// when the sender has no username.
    pub sender: Option<String>,
    pub chat_id: i64,
    pub text: Option<String>,
}

impl From<&Message> for Inbound {
    fn from(msg: &Message) -> Self {
        Self {
            sender: msg
                .from
                .as_ref()
                .map(|user| user.username.clone().unwrap_or_default()),
            chat_id: msg.chat.id.0,
            text: msg.text().map(ToString::to_string),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error(transparent)]
    Telegram(#[from] teloxide::RequestError),
    #[error("transport closed")]
    Closed,
}

#[async_trait]
pub trait Transport: Send {
    /// Waits for the next batch of messages. An empty batch is valid.
    async fn receive(&mut self) -> Result<Vec<Inbound>, TransportError>;

    /// Sends `text` to `chat_id`.
    async fn send(&self, chat_id: i64, text: &str) -> Result<(), TransportError>;

    /// Marks the oldest unprocessed message of the last batch as done.
    fn mark_handled(&mut self) {}

    /// Confirms every handled message to the service. Called once, after
    /// the last `receive`; the transport is closed afterwards.
    async fn shutdown(&mut self) -> Result<(), TransportError> {
        Ok(())
    }
}

pub struct TelegramTransport {
    bot: teloxide::Bot,
    /// Offset for the next poll: one past the last update received.
    offset: i32,
    /// Offset confirming every update processed so far.
    handled: i32,
    /// Offset Telegram has already been given.
    acked: i32,
    /// Confirming offset of each message of the current batch, in order.
    pending: VecDeque<i32>,
    closed: bool,
}

impl TelegramTransport {
    pub fn new(token: &str) -> Result<Self, BotError> {
        // The HTTP timeout must outlive the long poll.
        let client = teloxide::net::default_reqwest_settings()
            .timeout(Duration::from_secs(u64::from(POLL_TIMEOUT_SECS) + 15))
            .build()?;

        Ok(Self::with_bot(teloxide::Bot::with_client(token, client)))
    }

    pub fn with_bot(bot: teloxide::Bot) -> Self {
        Self {
            bot,
            offset: 0,
            handled: 0,
            acked: 0,
            pending: VecDeque::new(),
            closed: false,
        }
    }

    /// Checks the token and publishes the command menu.
    pub async fn announce(&self) -> Result<(), TransportError> {
        let me = self.bot.get_me().await?;
        tracing::info!(
            "authorized on account {}",
            me.user.username.as_deref().unwrap_or_default()
        );

        if let Err(err) = self.bot.set_my_commands(MenuCommands::bot_commands()).await {
            tracing::warn!("failed to register command menu: {err}");
        }
        Ok(())
    }
}

#[async_trait]
impl Transport for TelegramTransport {
    async fn receive(&mut self) -> Result<Vec<Inbound>, TransportError> {
        if self.closed {
            return Err(TransportError::Closed);
        }

        let updates = self
            .bot
            .get_updates()
            .offset(self.offset)
            .timeout(POLL_TIMEOUT_SECS)
            .await?;
        // Polling with an offset confirms everything below it.
        self.acked = self.offset;
        self.handled = self.offset;
        self.pending.clear();

        let mut inbound = Vec::with_capacity(updates.len());
        for update in updates {
            self.offset = update.id.0 as i32 + 1;
            match update.kind {
                UpdateKind::Message(msg) => {
                    inbound.push(Inbound::from(&msg));
                    self.pending.push_back(self.offset);
                }
                other => tracing::debug!("ignoring update {other:?}"),
            }
        }
        if self.pending.is_empty() {
            self.handled = self.offset;
        }
        Ok(inbound)
    }

    async fn send(&self, chat_id: i64, text: &str) -> Result<(), TransportError> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        self.bot.send_message(ChatId(chat_id), text).await?;
        Ok(())
    }

    fn mark_handled(&mut self) {
        if let Some(next) = self.pending.pop_front() {
            self.handled = next;
        }
        // Trailing non-message updates go with the last message.
        if self.pending.is_empty() {
            self.handled = self.offset;
        }
    }

    async fn shutdown(&mut self) -> Result<(), TransportError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        if self.handled <= self.acked {
            return Ok(());
        }

        tracing::debug!("confirming updates below {}", self.handled);
        self.bot
            .get_updates()
            .offset(self.handled)
            .limit(1)
            .timeout(0)
            .await?;
        self.acked = self.handled;
        Ok(())
    }
}
