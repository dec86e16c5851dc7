//! OAuth credentials for the upload account.

use std::path::Path;

use serde::Deserialize;

use crate::error::{YouTubeError, YouTubeResult};

/// OAuth 2.0 credentials with a long-lived refresh token.
///
/// Obtained once through the interactive consent flow and stored as a JSON
/// file; the client only ever exchanges the refresh token for short-lived
/// access tokens.
#[derive(Debug, Clone, Deserialize)]
pub struct YouTubeCredentials {
    /// OAuth client id.
    pub client_id: String,
    /// OAuth client secret.
    pub client_secret: String,
    /// Long-lived refresh token.
    pub refresh_token: String,
}

impl YouTubeCredentials {
    /// Loads credentials from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> YouTubeResult<Self> {
        let text = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            YouTubeError::Credentials(format!(
                "cannot read {}: {e}",
                path.as_ref().display()
            ))
        })?;
        Self::from_json(&text)
    }

    /// Parses credentials from a JSON string.
    pub fn from_json(text: &str) -> YouTubeResult<Self> {
        let creds: Self = serde_json::from_str(text)
            .map_err(|e| YouTubeError::Credentials(format!("malformed credentials: {e}")))?;
        creds.validate()?;
        Ok(creds)
    }

    fn validate(&self) -> YouTubeResult<()> {
        if self.client_id.is_empty() || self.client_secret.is_empty() || self.refresh_token.is_empty()
        {
            return Err(YouTubeError::Credentials(
                "client_id, client_secret and refresh_token are all required".into(),
            ));
        }
        Ok(())
    }
}
