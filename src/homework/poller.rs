//! The fixed-interval poll loop.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info};

use super::{HomeworkError, PracticumClient, check_response, parse_status};
use crate::telegram::ChatTransport;

/// Pause between poll cycles.
pub const RETRY_PERIOD: Duration = Duration::from_secs(600);

pub struct Poller {
    api: PracticumClient,
    transport: Arc<dyn ChatTransport>,
    chat_id: i64,
    /// `from_date` for the next request.
    timestamp: i64,
    /// Last error notification that reached the chat.
    last_error: Option<String>,
}

impl Poller {
    pub fn new(api: PracticumClient, transport: Arc<dyn ChatTransport>, chat_id: i64) -> Self {
        Self {
            api,
            transport,
            chat_id,
            timestamp: chrono::Utc::now().timestamp(),
            last_error: None,
        }
    }

    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// Polls forever; the process is stopped from outside.
    pub async fn run(mut self) {
        info!("Homework poller started, chat {}", self.chat_id);
        loop {
            self.cycle().await;
            tokio::time::sleep(RETRY_PERIOD).await;
        }
    }

    /// One poll: fetch, notify on change, report a new error at most once.
    pub async fn cycle(&mut self) {
        match self.check_statuses().await {
            Ok(()) => self.last_error = None,
            Err(e) => self.report(e).await,
        }
    }

    async fn check_statuses(&mut self) -> Result<(), HomeworkError> {
        let response = self.api.get_api_answer(self.timestamp).await?;
        let homeworks = check_response(&response)?;

        match homeworks.first() {
            Some(homework) => {
                let message = parse_status(homework)?;
                self.transport.send_text(self.chat_id, &message).await?;
                debug!("Status notification sent");
            }
            None => debug!("В ответе API нет новых статусов домашних работ"),
        }

        if let Some(current) = response.get("current_date").and_then(|v| v.as_i64()) {
            self.timestamp = current;
        }
        Ok(())
    }

    async fn report(&mut self, e: HomeworkError) {
        let message = format!("Сбой в работе программы: {e}");
        error!("{message}");

        if self.last_error.as_deref() == Some(message.as_str()) {
            debug!("Same error already reported, not notifying");
            return;
        }
        match self.transport.send_text(self.chat_id, &message).await {
            Ok(()) => self.last_error = Some(message),
            Err(send_err) => error!("Не удалось отправить ошибку в Telegram: {send_err}"),
        }
    }
}
