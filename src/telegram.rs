//! Telegram transport using teloxide.

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::ChatAction;
use tracing::{debug, warn};

/// Telegram rejects messages longer than this many characters.
pub const MAX_MESSAGE_CHARS: usize = 4096;

/// The chat platform refused or failed to deliver a call.
#[derive(Debug, Clone, thiserror::Error)]
#[error("failed to deliver to chat {chat_id}: {reason}")]
pub struct DeliveryError {
    pub chat_id: i64,
    pub reason: String,
}

/// Outbound side of a chat platform.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Delivers `text` to `chat_id`.
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), DeliveryError>;

    /// Shows the "typing…" status. Callers treat failures as non-fatal.
    async fn send_typing(&self, chat_id: i64) -> Result<(), DeliveryError>;
}

/// What kind of message arrived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Start,
    Text(String),
    Photo,
    Voice,
    Document,
    Location,
    Other,
}

/// A message received from the chat platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub chat_id: i64,
    pub content: Content,
}

impl Content {
    /// Classifies a text message, picking out the `/start` command.
    pub fn from_text(text: &str) -> Self {
        if is_start_command(text) {
            Content::Start
        } else {
            Content::Text(text.to_string())
        }
    }
}

/// `/start`, `/start@SomeBot` and `/start payload` all count.
fn is_start_command(text: &str) -> bool {
    text.split_whitespace()
        .next()
        .and_then(|token| token.strip_prefix('/'))
        .and_then(|command| command.split('@').next())
        == Some("start")
}

impl From<&Message> for InboundMessage {
    fn from(msg: &Message) -> Self {
        let content = if let Some(text) = msg.text() {
            Content::from_text(text)
        } else if msg.photo().is_some() {
            Content::Photo
        } else if msg.voice().is_some() {
            Content::Voice
        } else if msg.document().is_some() {
            Content::Document
        } else if msg.location().is_some() {
            Content::Location
        } else {
            Content::Other
        };

        Self {
            chat_id: msg.chat.id.0,
            content,
        }
    }
}

/// Telegram API client.
pub struct TelegramClient {
    bot: Bot,
}

impl TelegramClient {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl ChatTransport for TelegramClient {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), DeliveryError> {
        for chunk in split_message(text, MAX_MESSAGE_CHARS) {
            self.bot
                .send_message(ChatId(chat_id), chunk)
                .await
                .map_err(|e| {
                    let err = DeliveryError {
                        chat_id,
                        reason: e.to_string(),
                    };
                    warn!("{}", err);
                    err
                })?;
        }
        debug!("Sent {} chars to chat {}", text.chars().count(), chat_id);
        Ok(())
    }

    async fn send_typing(&self, chat_id: i64) -> Result<(), DeliveryError> {
        self.bot
            .send_chat_action(ChatId(chat_id), ChatAction::Typing)
            .await
            .map(|_| ())
            .map_err(|e| DeliveryError {
                chat_id,
                reason: e.to_string(),
            })
    }
}

/// Splits `text` into pieces of at most `max_chars` characters, breaking after
/// the last newline of a piece when there is one.
pub fn split_message(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut rest = text;

    while rest.chars().count() > max_chars {
        // Byte offset just past the first `max_chars` characters.
        let hard_end = rest
            .char_indices()
            .nth(max_chars)
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        let end = match rest[..hard_end].rfind('\n') {
            Some(i) if i > 0 => i + 1,
            _ => hard_end,
        };
        chunks.push(rest[..end].to_string());
        rest = &rest[end..];
    }

    if !rest.is_empty() || chunks.is_empty() {
        chunks.push(rest.to_string());
    }
    chunks
}
