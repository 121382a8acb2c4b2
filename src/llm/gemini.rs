//! Gemini API client for single-shot text generation.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use super::{LanguageModel, LlmError};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const GEMINI_MODEL: &str = "gemini-2.5-flash";

pub struct GeminiClient {
    api_key: String,
    client: reqwest::Client,
    base_url: String,
    model: String,
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Deserialize, Debug)]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
    error: Option<ApiError>,
}

#[derive(Deserialize, Debug)]
struct ApiError {
    message: String,
}

#[derive(Deserialize, Debug)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize, Debug)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize, Debug)]
struct ResponsePart {
    text: Option<String>,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| LlmError::Http(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            api_key,
            client,
            base_url: GEMINI_API_BASE.to_string(),
            model: GEMINI_MODEL.to_string(),
        })
    }

    /// Points the client at another host (a proxy or a mock server).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    async fn generate_text(&self, prompt: &str) -> Result<String, LlmError> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        let url = format!("{}/{}:generateContent", self.base_url, self.model);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        debug!("Gemini response status: {status}");

        if !status.is_success() {
            debug!("Gemini error body: {body}");
            return Err(LlmError::Status(status.as_u16()));
        }

        let parsed: GenerateResponse = serde_json::from_str(&body)
            .map_err(|e| LlmError::Api(format!("failed to parse response: {e}")))?;

        if let Some(error) = parsed.error {
            return Err(LlmError::Api(error.message));
        }

        // The answer is every text part of the first candidate, in order.
        let text: String = parsed
            .candidates
            .unwrap_or_default()
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect()
            })
            .unwrap_or_default();

        info!("Gemini answered with {} chars", text.chars().count());
        Ok(text)
    }
}

#[async_trait]
impl LanguageModel for GeminiClient {
    async fn ask(&self, prompt: &str) -> Result<String, LlmError> {
        self.generate_text(prompt).await.inspect_err(|e| {
            error!("Ошибка при запросе к Gemini API: {e}");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(server: &MockServer) -> GeminiClient {
        GeminiClient::new("test-key".into())
            .unwrap()
            .with_base_url(server.uri())
    }

    #[tokio::test]
    async fn ask_sends_prompt_and_joins_parts() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/gemini-2.5-flash:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_json(serde_json::json!({
                "contents": [{"parts": [{"text": "Как дела?"}]}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{
                    "content": {
                        "parts": [{"text": "Хорошо, "}, {"text": "спасибо!"}],
                        "role": "model"
                    }
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let answer = test_client(&server).ask("Как дела?").await.unwrap();
        assert_eq!(answer, "Хорошо, спасибо!");
    }

    #[tokio::test]
    async fn ask_without_candidates_is_empty() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "promptFeedback": {"blockReason": "SAFETY"}
            })))
            .mount(&server)
            .await;

        let answer = test_client(&server).ask("hi").await.unwrap();
        assert!(answer.is_empty());
    }

    #[tokio::test]
    async fn ask_maps_http_status() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&server)
            .await;

        let err = test_client(&server).ask("hi").await.unwrap_err();
        assert_eq!(err, LlmError::Status(403));
    }

    #[tokio::test]
    async fn ask_reports_api_error_object() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "error": {"code": 400, "message": "API key not valid"}
            })))
            .mount(&server)
            .await;

        let err = test_client(&server).ask("hi").await.unwrap_err();
        assert_eq!(err, LlmError::Api("API key not valid".into()));
    }

    #[tokio::test]
    async fn ask_reports_garbage_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = test_client(&server).ask("hi").await.unwrap_err();
        assert!(matches!(err, LlmError::Api(_)));
    }

    #[tokio::test]
    async fn transport_error_does_not_expose_api_key() {
        let client = GeminiClient::new("SECRET-GOOGLE-KEY".into())
            .unwrap()
            .with_base_url("http://127.0.0.1:1/v1beta/models");

        let err = client.ask("hi").await.unwrap_err();
        assert!(matches!(err, LlmError::Http(_)));
        assert!(!err.to_string().contains("SECRET-GOOGLE-KEY"));
    }
}
