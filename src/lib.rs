//! Telegram bots that relay chat messages to a language model, plus a
//! homework review status notifier.

pub mod config;
pub mod homework;
pub mod llm;
pub mod logging;
pub mod router;
pub mod telegram;
