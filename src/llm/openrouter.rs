//! OpenRouter chat-completion client with streamed responses.

use std::time::Duration;

use async_trait::async_trait;
use eventsource_stream::{EventStreamError, Eventsource};
use futures::StreamExt;
use serde::Serialize;
use tracing::{debug, error, info};

use super::{LanguageModel, LlmError, StreamAccumulator};

const OPENROUTER_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const OPENROUTER_MODEL: &str = "deepseek/deepseek-chat-v3-0324:free";
const SYSTEM_PROMPT: &str = "Всегда отвечай на русском языке.";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

pub struct OpenRouterClient {
    api_key: String,
    http: reqwest::Client,
    url: String,
    timeout: Duration,
}

#[derive(Serialize)]
struct ApiRequest<'a> {
    model: &'static str,
    messages: [ApiMessage<'a>; 2],
    stream: bool,
}

#[derive(Serialize)]
struct ApiMessage<'a> {
    role: &'static str,
    content: &'a str,
}

impl OpenRouterClient {
    pub fn new(api_key: String) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder()
            .connect_timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| LlmError::Http(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            api_key,
            http,
            url: OPENROUTER_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Overrides the completions URL (for testing with wiremock).
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Limits the wait for the response headers and for each body chunk.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn stream_completion(&self, prompt: &str) -> Result<String, LlmError> {
        let request = ApiRequest {
            model: OPENROUTER_MODEL,
            messages: [
                ApiMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ApiMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            stream: true,
        };

        let send = self
            .http
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send();
        let response = tokio::time::timeout(self.timeout, send)
            .await
            .map_err(|_| LlmError::Timeout)??;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(LlmError::Status(status.as_u16()));
        }

        let mut events = std::pin::pin!(response.bytes_stream().eventsource());
        let mut acc = StreamAccumulator::new();
        while let Some(event) = tokio::time::timeout(self.timeout, events.next())
            .await
            .map_err(|_| LlmError::Timeout)?
        {
            match event {
                Ok(event) => acc.push_line(&event.data),
                Err(EventStreamError::Transport(e)) => return Err(e.into()),
                Err(e) => debug!("Skipping malformed stream event: {e}"),
            }
        }

        let text = acc.finish();
        info!("OpenRouter streamed {} chars", text.chars().count());
        Ok(text)
    }
}

#[async_trait]
impl LanguageModel for OpenRouterClient {
    async fn ask(&self, prompt: &str) -> Result<String, LlmError> {
        debug!("Asking {OPENROUTER_MODEL}");
        self.stream_completion(prompt).await.inspect_err(|e| {
            error!("Ошибка при запросе к OpenRouter: {e}");
        })
    }
}
