//! Language-model clients.

pub mod gemini;
pub mod openrouter;
pub mod stream;

use async_trait::async_trait;

pub use gemini::GeminiClient;
pub use openrouter::OpenRouterClient;
pub use stream::StreamAccumulator;

/// Why a model call produced no answer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LlmError {
    /// The API answered with a non-success status.
    #[error("API returned status {0}")]
    Status(u16),
    /// The API answered, but with an error object or an unreadable body.
    #[error("API error: {0}")]
    Api(String),
    #[error("request timed out")]
    Timeout,
    /// Any other transport failure.
    #[error("HTTP error: {0}")]
    Http(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LlmError::Timeout
        } else {
            // The request URL can carry credentials.
            LlmError::Http(e.without_url().to_string())
        }
    }
}

/// A model that answers a single prompt with text.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn ask(&self, prompt: &str) -> Result<String, LlmError>;
}
