//! Forwards homework review status changes to a fixed Telegram chat.

use std::process::ExitCode;
use std::sync::Arc;

use teloxide::Bot;
use tracing::{error, info};

use neurobot::config::{self, ConfigError, HomeworkConfig};
use neurobot::homework::{Poller, PracticumClient};
use neurobot::logging;
use neurobot::telegram::TelegramClient;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let config = match HomeworkConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            let message = fatal_config_message(&e);
            let log_dir = config::log_dir_from_env();
            let _guard = match logging::init(&log_dir, "homework.log") {
                Ok(guard) => Some(guard),
                Err(init_err) => {
                    eprintln!("Failed to open homework.log in {}: {init_err}", log_dir.display());
                    eprintln!("{message}");
                    None
                }
            };
            error!("{message}");
            return ExitCode::FAILURE;
        }
    };

    let _guard = match logging::init(&config.log_dir, "homework.log") {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to open homework.log in {}: {e}", config.log_dir.display());
            return ExitCode::FAILURE;
        }
    };

    let api = match PracticumClient::new(config.practicum_token) {
        Ok(api) => api,
        Err(e) => {
            error!("Failed to build status API client: {e}");
            return ExitCode::FAILURE;
        }
    };

    info!("🚀 Starting homework notifier...");
    let transport = Arc::new(TelegramClient::new(Bot::new(&config.telegram_token)));
    Poller::new(api, transport, config.chat_id).run().await;

    ExitCode::SUCCESS
}

fn fatal_config_message(e: &ConfigError) -> String {
    match e {
        ConfigError::Missing(_) => {
            format!("Отсутствуют обязательные переменные окружения. Завершение работы. ({e})")
        }
        _ => format!("Некорректная конфигурация. Завершение работы. ({e})"),
    }
}
