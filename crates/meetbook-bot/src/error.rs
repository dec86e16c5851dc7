//! Bot error type.

use thiserror::Error;

/// An error from the bot runtime.
#[derive(Debug, Error)]
pub enum BotError {
    /// Configuration file missing or malformed.
    #[error("configuration error: {0}")]
    Config(String),

    /// Transport failure talking to the Telegram API.
    #[error("telegram network error: {0}")]
    Network(String),

    /// The Telegram API rejected a call.
    #[error("telegram API error: {0}")]
    Telegram(String),

    /// Provider client failure.
    #[error(transparent)]
    Zoom(#[from] meetbook_zoom::ZoomError),

    /// Store failure.
    #[error(transparent)]
    Store(#[from] meetbook_store::StoreError),

    /// Upload failure.
    #[error(transparent)]
    YouTube(#[from] meetbook_youtube::YouTubeError),

    /// Local filesystem failure.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl BotError {
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Network("request timeout".to_string())
        } else {
            Self::Network(format!("request failed: {err}"))
        }
    }
}

/// A specialized Result type for bot operations.
pub type BotResult<T> = Result<T, BotError>;
