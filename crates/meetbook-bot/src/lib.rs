//! Telegram bot for booking Zoom meetings across an account pool.

pub mod config;
pub mod error;
pub mod handler;
pub mod session;
pub mod telegram;

pub use config::BotConfig;
pub use error::{BotError, BotResult};
pub use handler::BotHandler;
pub use session::{Session, SessionAction, SessionState};
pub use telegram::TelegramClient;
