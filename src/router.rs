//! Routes inbound chat messages to canned replies or the language model.
//!
//! This is the only place a model failure becomes user-facing text.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::Backend;
use crate::llm::{LanguageModel, LlmError};
use crate::telegram::{ChatTransport, Content, DeliveryError, InboundMessage};

pub const WELCOME_TEXT: &str = "Привет, я бот - нейросеть.\n\
Напиши мне что-нибудь, и я отвечу, наверное.\n\
А может и нет, хз.";

pub const EMPTY_REPLY: &str = "Извините, не удалось получить ответ от нейросети.";

const TIMEOUT_REPLY: &str = "Превышено время ожидания ответа от нейросети.";

/// Stub reply for content the bot cannot handle yet.
pub fn stub_reply(format_name: &str) -> String {
    format!(
        "Я пока не умею обрабатывать {format_name}, закиньте денег на оплату ИИ и разработчик обязательно это добавит🙂"
    )
}

/// A literal phrase answered without asking the model.
#[derive(Debug, Clone)]
pub struct Trigger {
    /// Matched against the trimmed, lower-cased message.
    pub phrase: String,
    pub reply: String,
}

impl Trigger {
    pub fn new(phrase: &str, reply: &str) -> Self {
        Self {
            phrase: phrase.to_lowercase(),
            reply: reply.to_string(),
        }
    }
}

/// How a bot talks: its canned triggers and how it apologises.
#[derive(Debug, Clone)]
pub struct Persona {
    pub triggers: Vec<Trigger>,
    /// Reply when the model call fails.
    pub failure_reply: String,
    /// Tell timeouts and HTTP statuses apart from other failures.
    pub detailed_failures: bool,
}

impl Persona {
    pub fn gemini() -> Self {
        Self {
            triggers: vec![Trigger::new("дурила", "Сам ты дурила")],
            failure_reply: "Ошибка при запросе к модели Gemini.".to_string(),
            detailed_failures: false,
        }
    }

    pub fn openrouter() -> Self {
        Self {
            triggers: vec![
                Trigger::new("дурила", "Сам ты дурила"),
                Trigger::new("юна", "Юна - самая прекрасная девушка на свете 👑"),
            ],
            failure_reply: "Ошибка при запросе к модели DeepSeek.".to_string(),
            detailed_failures: true,
        }
    }

    pub fn for_backend(backend: Backend) -> Self {
        match backend {
            Backend::Gemini => Self::gemini(),
            Backend::OpenRouter => Self::openrouter(),
        }
    }

    fn trigger_reply(&self, text: &str) -> Option<&str> {
        let key = text.to_lowercase();
        self.triggers
            .iter()
            .find(|t| t.phrase == key)
            .map(|t| t.reply.as_str())
    }

    fn failure_text(&self, err: &LlmError) -> String {
        if !self.detailed_failures {
            return self.failure_reply.clone();
        }
        match err {
            LlmError::Status(code) => format!("Ошибка API OpenRouter: {code}"),
            LlmError::Timeout => TIMEOUT_REPLY.to_string(),
            LlmError::Api(_) | LlmError::Http(_) => self.failure_reply.clone(),
        }
    }
}

/// Dispatches each inbound message to exactly one reply.
pub struct Router {
    transport: Arc<dyn ChatTransport>,
    model: Arc<dyn LanguageModel>,
    persona: Persona,
}

impl Router {
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        model: Arc<dyn LanguageModel>,
        persona: Persona,
    ) -> Self {
        Self {
            transport,
            model,
            persona,
        }
    }

    pub async fn handle(&self, msg: InboundMessage) -> Result<(), DeliveryError> {
        let chat_id = msg.chat_id;
        let reply = match msg.content {
            Content::Start => WELCOME_TEXT.to_string(),
            Content::Photo => stub_reply("фотографии"),
            Content::Voice => stub_reply("голосовые сообщения"),
            Content::Document => stub_reply("документы"),
            Content::Location => stub_reply("геолокации"),
            Content::Text(text) => self.answer_text(chat_id, &text).await,
            Content::Other => {
                debug!("Ignoring unsupported message in chat {chat_id}");
                return Ok(());
            }
        };
        self.transport.send_text(chat_id, &reply).await
    }

    async fn answer_text(&self, chat_id: i64, text: &str) -> String {
        let text = text.trim();
        if let Some(reply) = self.persona.trigger_reply(text) {
            info!("Trigger matched in chat {chat_id}");
            return reply.to_string();
        }

        if let Err(e) = self.transport.send_typing(chat_id).await {
            debug!("Typing indicator failed: {e}");
        }

        match self.model.ask(text).await {
            Ok(answer) if answer.trim().is_empty() => EMPTY_REPLY.to_string(),
            Ok(answer) => answer,
            Err(e) => {
                warn!("Model failed for chat {chat_id}: {e}");
                self.persona.failure_text(&e)
            }
        }
    }
}
