//! Homework review status notifier.

pub mod api;
pub mod poller;
pub mod status;

pub use api::PracticumClient;
pub use poller::{Poller, RETRY_PERIOD};
pub use status::{
    StatusError, UnknownStatus, ValidationError, Verdict, check_response, parse_status,
};

use crate::telegram::DeliveryError;

/// Anything that can go wrong in one poll cycle.
#[derive(Debug, thiserror::Error)]
pub enum HomeworkError {
    #[error("Код ответа API: {0}")]
    Status(u16),
    #[error("Эндпоинт недоступен: {0}")]
    Unreachable(String),
    #[error("Ошибка при запросе к API: {0}")]
    Request(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    UnknownStatus(#[from] UnknownStatus),
    #[error("Ошибка при отправке сообщения: {0}")]
    Delivery(#[from] DeliveryError),
}

impl From<StatusError> for HomeworkError {
    fn from(e: StatusError) -> Self {
        match e {
            StatusError::Validation(e) => HomeworkError::Validation(e),
            StatusError::Unknown(e) => HomeworkError::UnknownStatus(e),
        }
    }
}
