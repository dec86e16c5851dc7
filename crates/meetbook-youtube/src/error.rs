//! YouTube client error type.

use thiserror::Error;

/// An error from the YouTube upload client.
#[derive(Debug, Error)]
pub enum YouTubeError {
    /// Credentials file missing or malformed.
    #[error("credentials error: {0}")]
    Credentials(String),

    /// Transport failure: connection, DNS, timeout.
    #[error("network error: {0}")]
    Network(String),

    /// The API answered with an unexpected status.
    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// The API answered but the body could not be interpreted.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Local filesystem failure while reading the video.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl YouTubeError {
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Network("request timeout".to_string())
        } else if err.is_connect() {
            Self::Network(format!("connection failed: {err}"))
        } else {
            Self::Network(format!("request failed: {err}"))
        }
    }
}

/// A specialized Result type for YouTube operations.
pub type YouTubeResult<T> = Result<T, YouTubeError>;
