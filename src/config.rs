use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required environment variable is absent or blank.
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    /// A variable is present but malformed.
    #[error("config validation error: {0}")]
    Validation(String),
    /// The backend argument names no known language model.
    #[error("unknown backend '{0}' (expected 'gemini' or 'openrouter')")]
    UnknownBackend(String),
}

/// Language-model backend a chat bot talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Gemini,
    OpenRouter,
}

impl Backend {
    /// Environment variable holding this backend's API key.
    pub fn key_var(self) -> &'static str {
        match self {
            Backend::Gemini => "GOOGLE_API",
            Backend::OpenRouter => "OPEN_ROUTER",
        }
    }
}

impl FromStr for Backend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gemini" => Ok(Backend::Gemini),
            "openrouter" | "deepseek" => Ok(Backend::OpenRouter),
            other => Err(ConfigError::UnknownBackend(other.to_string())),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Gemini => f.write_str("gemini"),
            Backend::OpenRouter => f.write_str("openrouter"),
        }
    }
}

/// Settings for the chat bot binary.
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub telegram_token: String,
    pub backend: Backend,
    /// API key for the selected backend.
    pub api_key: String,
    /// Directory for `bot.log` and its backups.
    pub log_dir: PathBuf,
}

/// Settings for the homework status notifier.
#[derive(Debug, Clone)]
pub struct HomeworkConfig {
    pub practicum_token: String,
    pub telegram_token: String,
    /// The single chat all notifications go to.
    pub chat_id: i64,
    pub log_dir: PathBuf,
}

impl BotConfig {
    pub fn from_env(backend: Backend) -> Result<Self, ConfigError> {
        Self::from_lookup(backend, |name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(backend: Backend, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let telegram_token = required(&lookup, "TELEGRAM_TOKEN")?;
        validate_telegram_token(&telegram_token)?;
        let api_key = required(&lookup, backend.key_var())?;

        Ok(Self {
            telegram_token,
            backend,
            api_key,
            log_dir: log_dir(&lookup),
        })
    }
}

impl HomeworkConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let practicum_token = required(&lookup, "PRACTICUM_TOKEN")?;
        let telegram_token = required(&lookup, "TELEGRAM_TOKEN")?;
        let chat_id = required(&lookup, "TELEGRAM_CHAT_ID")?;

        validate_telegram_token(&telegram_token)?;
        let chat_id = chat_id.trim().parse::<i64>().map_err(|_| {
            ConfigError::Validation(format!("TELEGRAM_CHAT_ID must be an integer, got '{chat_id}'"))
        })?;

        Ok(Self {
            practicum_token,
            telegram_token,
            chat_id,
            log_dir: log_dir(&lookup),
        })
    }
}

/// `LOG_DIR` from the environment, or the working directory. Used before a
/// full config could be loaded.
pub fn log_dir_from_env() -> PathBuf {
    log_dir(&|name: &str| std::env::var(name).ok())
}

fn required<F>(lookup: &F, name: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(name)),
    }
}

fn log_dir<F>(lookup: &F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    lookup("LOG_DIR")
        .filter(|dir| !dir.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
}

// Telegram tokens are formatted as {bot_id}:{secret} where bot_id is numeric
fn validate_telegram_token(token: &str) -> Result<(), ConfigError> {
    let token_parts: Vec<&str> = token.split(':').collect();
    if token_parts.len() != 2
        || token_parts[0].parse::<u64>().is_err()
        || token_parts[1].is_empty()
    {
        return Err(ConfigError::Validation(
            "TELEGRAM_TOKEN appears invalid (expected format: 123456789:ABCdefGHI...)".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_valid_gemini_config() {
        let config = BotConfig::from_lookup(
            Backend::Gemini,
            env(&[("TELEGRAM_TOKEN", "123456789:ABCdef"), ("GOOGLE_API", "g-key")]),
        )
        .expect("should load valid config");
        assert_eq!(config.api_key, "g-key");
        assert_eq!(config.backend, Backend::Gemini);
        assert_eq!(config.log_dir, PathBuf::from("."));
    }

    #[test]
    fn test_backend_picks_its_own_key() {
        let lookup = env(&[
            ("TELEGRAM_TOKEN", "123456789:ABCdef"),
            ("GOOGLE_API", "g-key"),
        ]);
        let err = BotConfig::from_lookup(Backend::OpenRouter, lookup).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("OPEN_ROUTER")));
    }

    #[test]
    fn test_missing_telegram_token() {
        let lookup = env(&[("GOOGLE_API", "g-key")]);
        let err = BotConfig::from_lookup(Backend::Gemini, lookup).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("TELEGRAM_TOKEN")));
        assert!(err.to_string().contains("TELEGRAM_TOKEN"));
    }

    #[test]
    fn test_blank_value_counts_as_missing() {
        let err = BotConfig::from_lookup(
            Backend::Gemini,
            env(&[("TELEGRAM_TOKEN", "123456789:ABCdef"), ("GOOGLE_API", "  ")]),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Missing("GOOGLE_API")));
    }

    #[test]
    fn test_invalid_token_format_no_colon() {
        let err = BotConfig::from_lookup(
            Backend::Gemini,
            env(&[("TELEGRAM_TOKEN", "invalid_token_no_colon"), ("GOOGLE_API", "k")]),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("invalid"));
    }

    #[test]
    fn test_invalid_token_format_empty_secret() {
        let err = BotConfig::from_lookup(
            Backend::Gemini,
            env(&[("TELEGRAM_TOKEN", "123456789:"), ("GOOGLE_API", "k")]),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_homework_config() {
        let config = HomeworkConfig::from_lookup(env(&[
            ("PRACTICUM_TOKEN", "p-token"),
            ("TELEGRAM_TOKEN", "123456789:ABCdef"),
            ("TELEGRAM_CHAT_ID", "-100500"),
            ("LOG_DIR", "/var/log/neurobot"),
        ]))
        .expect("should load valid config");
        assert_eq!(config.chat_id, -100500);
        assert_eq!(config.log_dir, PathBuf::from("/var/log/neurobot"));
    }

    #[test]
    fn test_homework_missing_practicum_token() {
        let err = HomeworkConfig::from_lookup(env(&[
            ("TELEGRAM_TOKEN", "123456789:ABCdef"),
            ("TELEGRAM_CHAT_ID", "42"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Missing("PRACTICUM_TOKEN")));
    }

    #[test]
    fn test_homework_chat_id_not_numeric() {
        let err = HomeworkConfig::from_lookup(env(&[
            ("PRACTICUM_TOKEN", "p"),
            ("TELEGRAM_TOKEN", "123456789:ABCdef"),
            ("TELEGRAM_CHAT_ID", "@channel"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("TELEGRAM_CHAT_ID"));
    }

    #[test]
    fn test_log_dir_defaults_to_cwd() {
        assert_eq!(log_dir(&env(&[])), PathBuf::from("."));
        assert_eq!(log_dir(&env(&[("LOG_DIR", " ")])), PathBuf::from("."));
        assert_eq!(
            log_dir(&env(&[("LOG_DIR", "/var/log/neurobot")])),
            PathBuf::from("/var/log/neurobot")
        );
    }

    #[test]
    fn test_backend_from_str() {
        assert_eq!("gemini".parse::<Backend>().unwrap(), Backend::Gemini);
        assert_eq!("OpenRouter".parse::<Backend>().unwrap(), Backend::OpenRouter);
        assert!(matches!(
            "gpt".parse::<Backend>(),
            Err(ConfigError::UnknownBackend(_))
        ));
    }
}
