//! Client for the Practicum homework status endpoint.

use std::time::Duration;

use serde_json::Value;
use tracing::{debug, error};

use super::HomeworkError;

pub const ENDPOINT: &str = "https://practicum.yandex.ru/api/user_api/homework_statuses/";

pub struct PracticumClient {
    http: reqwest::Client,
    token: String,
    endpoint: String,
}

impl PracticumClient {
    pub fn new(token: String) -> Result<Self, HomeworkError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| HomeworkError::Request(e.to_string()))?;

        Ok(Self {
            http,
            token,
            endpoint: ENDPOINT.to_string(),
        })
    }

    /// Overrides the endpoint (for testing with wiremock).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Fetches statuses changed since `from_date` (Unix seconds).
    pub async fn get_api_answer(&self, from_date: i64) -> Result<Value, HomeworkError> {
        debug!("Requesting homework statuses from_date={from_date}");

        let response = self
            .http
            .get(&self.endpoint)
            .header("Authorization", format!("OAuth {}", self.token))
            .query(&[("from_date", from_date)])
            .send()
            .await
            .map_err(|e| {
                let err = if e.is_connect() {
                    HomeworkError::Unreachable(e.to_string())
                } else {
                    HomeworkError::Request(e.to_string())
                };
                error!("{err}");
                err
            })?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let err = HomeworkError::Status(status.as_u16());
            error!("{err}");
            return Err(err);
        }

        response.json::<Value>().await.map_err(|e| {
            let err = HomeworkError::Request(e.to_string());
            error!("{err}");
            err
        })
    }
}
