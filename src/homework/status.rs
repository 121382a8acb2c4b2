//! Validation of the status API payload and verdict lookup.

use serde_json::Value;

/// The payload does not have the expected shape.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Ответ API не является словарем")]
    NotAMapping,
    #[error("Отсутствует ключ \"homeworks\" в ответе API")]
    MissingHomeworks,
    #[error("Значение ключа \"homeworks\" не является списком")]
    HomeworksNotAList,
    #[error("Запись о домашней работе не является словарем")]
    HomeworkNotAMapping,
    #[error("Отсутствуют обязательные ключи в ответе API")]
    MissingHomeworkFields,
}

/// Review state of a homework.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Approved,
    Reviewing,
    Rejected,
}

impl Verdict {
    /// Maps an API status code; `None` for codes we do not know.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "approved" => Some(Verdict::Approved),
            "reviewing" => Some(Verdict::Reviewing),
            "rejected" => Some(Verdict::Rejected),
            _ => None,
        }
    }

    pub fn text(self) -> &'static str {
        match self {
            Verdict::Approved => "Работа проверена: ревьюеру всё понравилось. Ура!",
            Verdict::Reviewing => "Работа взята на проверку ревьюером.",
            Verdict::Rejected => "Работа проверена: у ревьюера есть замечания.",
        }
    }
}

/// A status field we have no verdict for.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Неожиданный статус домашней работы: {0}")]
pub struct UnknownStatus(pub String);

/// Error from [`parse_status`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StatusError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Unknown(#[from] UnknownStatus),
}

/// Returns the `homeworks` list of a response.
pub fn check_response(response: &Value) -> Result<&[Value], ValidationError> {
    let map = response.as_object().ok_or(ValidationError::NotAMapping)?;
    let homeworks = map
        .get("homeworks")
        .ok_or(ValidationError::MissingHomeworks)?;
    homeworks
        .as_array()
        .map(Vec::as_slice)
        .ok_or(ValidationError::HomeworksNotAList)
}

/// Builds the notification text for one homework record.
pub fn parse_status(homework: &Value) -> Result<String, StatusError> {
    let map = homework
        .as_object()
        .ok_or(ValidationError::HomeworkNotAMapping)?;
    let name = map.get("homework_name").filter(|v| !v.is_null());
    let status = map.get("status").filter(|v| !v.is_null());
    let (Some(name), Some(status)) = (name, status) else {
        return Err(ValidationError::MissingHomeworkFields.into());
    };

    let name = display(name);
    let status = display(status);
    let verdict = Verdict::from_code(&status).ok_or(UnknownStatus(status))?;

    Ok(format!(
        "Изменился статус проверки работы \"{name}\". {}",
        verdict.text()
    ))
}

fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_check_response_returns_list() {
        let response = json!({"homeworks": [{"homework_name": "hw1"}], "current_date": 1});
        assert_eq!(check_response(&response).unwrap().len(), 1);
    }

    #[test]
    fn test_check_response_error_kinds() {
        assert_eq!(
            check_response(&json!([1, 2])),
            Err(ValidationError::NotAMapping)
        );
        assert_eq!(
            check_response(&json!({"current_date": 1})),
            Err(ValidationError::MissingHomeworks)
        );
        assert_eq!(
            check_response(&json!({"homeworks": {"hw1": "approved"}})),
            Err(ValidationError::HomeworksNotAList)
        );
    }

    #[test]
    fn test_parse_status_approved() {
        let message =
            parse_status(&json!({"homework_name": "hw1", "status": "approved"})).unwrap();
        assert_eq!(
            message,
            "Изменился статус проверки работы \"hw1\". Работа проверена: ревьюеру всё понравилось. Ура!"
        );
    }

    #[test]
    fn test_parse_status_each_verdict() {
        for (code, verdict) in [
            ("reviewing", Verdict::Reviewing),
            ("rejected", Verdict::Rejected),
        ] {
            let message = parse_status(&json!({"homework_name": "x", "status": code})).unwrap();
            assert!(message.ends_with(verdict.text()));
        }
    }

    #[test]
    fn test_parse_status_unknown_code() {
        let err = parse_status(&json!({"homework_name": "hw1", "status": "lost"})).unwrap_err();
        assert_eq!(err, StatusError::Unknown(UnknownStatus("lost".into())));
        assert!(err.to_string().contains("lost"));
    }

    #[test]
    fn test_parse_status_missing_fields() {
        for homework in [
            json!({"status": "approved"}),
            json!({"homework_name": "hw1"}),
            json!({"homework_name": null, "status": "approved"}),
        ] {
            assert_eq!(
                parse_status(&homework),
                Err(StatusError::Validation(ValidationError::MissingHomeworkFields))
            );
        }
    }

    #[test]
    fn test_parse_status_not_a_mapping() {
        assert_eq!(
            parse_status(&json!("hw1")),
            Err(StatusError::Validation(ValidationError::HomeworkNotAMapping))
        );
    }
}
