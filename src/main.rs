use std::process::ExitCode;
use std::sync::Arc;

use teloxide::prelude::*;
use tracing::{error, info, warn};

use neurobot::config::{self, Backend, BotConfig, ConfigError};
use neurobot::llm::{GeminiClient, LanguageModel, LlmError, OpenRouterClient};
use neurobot::logging;
use neurobot::router::{Persona, Router};
use neurobot::telegram::{InboundMessage, TelegramClient};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            let log_dir = config::log_dir_from_env();
            let _guard = match logging::init(&log_dir, "bot.log") {
                Ok(guard) => Some(guard),
                Err(init_err) => {
                    eprintln!("Failed to open bot.log in {}: {init_err}", log_dir.display());
                    eprintln!("{e}");
                    None
                }
            };
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let _guard = match logging::init(&config.log_dir, "bot.log") {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to open bot.log in {}: {e}", config.log_dir.display());
            return ExitCode::FAILURE;
        }
    };

    let model = match build_model(&config) {
        Ok(model) => model,
        Err(e) => {
            error!("Failed to build {} client: {e}", config.backend);
            return ExitCode::FAILURE;
        }
    };

    let bot = Bot::new(&config.telegram_token);
    let transport = Arc::new(TelegramClient::new(bot.clone()));
    let router = Arc::new(Router::new(
        transport,
        model,
        Persona::for_backend(config.backend),
    ));

    info!("🚀 Бот запущен ({}). Ожидание сообщений...", config.backend);

    let handler = Update::filter_message().endpoint(handle_message);

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![router])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    ExitCode::SUCCESS
}

fn load_config() -> Result<BotConfig, ConfigError> {
    let backend = match std::env::args().nth(1) {
        Some(arg) => arg.parse::<Backend>()?,
        None => Backend::Gemini,
    };
    BotConfig::from_env(backend)
}

fn build_model(config: &BotConfig) -> Result<Arc<dyn LanguageModel>, LlmError> {
    let model: Arc<dyn LanguageModel> = match config.backend {
        Backend::Gemini => Arc::new(GeminiClient::new(config.api_key.clone())?),
        Backend::OpenRouter => Arc::new(OpenRouterClient::new(config.api_key.clone())?),
    };
    Ok(model)
}

async fn handle_message(msg: Message, router: Arc<Router>) -> ResponseResult<()> {
    let inbound = InboundMessage::from(&msg);
    if let Err(e) = router.handle(inbound).await {
        warn!("Reply not delivered: {e}");
    }
    Ok(())
}
