//! Minimal Telegram Bot API client: long-poll updates, text replies and
//! document uploads.

use std::path::Path;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::error::{BotError, BotResult};

/// Public Bot API endpoint.
pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Long-poll wait passed to `getUpdates`, seconds.
pub const POLL_TIMEOUT_SECS: u64 = 30;

/// Envelope every Bot API response comes in.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

/// One incoming update.
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

/// An incoming chat message.
#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub chat: Chat,
    pub text: Option<String>,
}

/// The chat a message arrived in.
#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

/// Telegram Bot API client for one bot token.
#[derive(Debug)]
pub struct TelegramClient {
    http: reqwest::Client,
    base: String,
}

impl TelegramClient {
    /// Creates a client for the given bot token.
    pub fn new(token: &str) -> Self {
        Self::with_api_base(DEFAULT_API_BASE, token)
    }

    /// Creates a client against a custom endpoint (used by tests).
    pub fn with_api_base(api_base: &str, token: &str) -> Self {
        // Long polling holds the connection open for POLL_TIMEOUT_SECS, so
        // the client timeout has to sit above it.
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(POLL_TIMEOUT_SECS + 10))
            .build()
            .expect("default TLS backend available");
        Self {
            http,
            base: format!("{api_base}/bot{token}"),
        }
    }

    async fn call<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> BotResult<T> {
        let response = request.send().await.map_err(BotError::from_transport)?;
        let status = response.status();
        let body = response.text().await.map_err(BotError::from_transport)?;
        if !status.is_success() {
            return Err(BotError::Telegram(format!("HTTP {status}: {body}")));
        }

        let parsed: ApiResponse<T> = serde_json::from_str(&body)
            .map_err(|e| BotError::Telegram(format!("malformed response: {e}")))?;
        if !parsed.ok {
            return Err(BotError::Telegram(
                parsed.description.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }
        parsed
            .result
            .ok_or_else(|| BotError::Telegram("response missing result".to_string()))
    }

    /// Long-polls for updates newer than `offset`.
    pub async fn get_updates(&self, offset: i64) -> BotResult<Vec<Update>> {
        let request = self
            .http
            .get(format!("{}/getUpdates", self.base))
            .query(&[("offset", offset), ("timeout", POLL_TIMEOUT_SECS as i64)]);
        let updates: Vec<Update> = self.call(request).await?;
        if !updates.is_empty() {
            debug!(count = updates.len(), "received updates");
        }
        Ok(updates)
    }

    /// Sends a plain text message to a chat.
    pub async fn send_message(&self, chat_id: i64, text: &str) -> BotResult<()> {
        let request = self
            .http
            .post(format!("{}/sendMessage", self.base))
            .json(&json!({ "chat_id": chat_id, "text": text }));
        let _: serde_json::Value = self.call(request).await?;
        Ok(())
    }

    /// Sends a local file to a chat as a document attachment.
    pub async fn send_document(&self, chat_id: i64, path: &Path) -> BotResult<()> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());

        let form = Form::new()
            .text("chat_id", chat_id.to_string())
            .part("document", Part::bytes(bytes).file_name(file_name));
        let request = self
            .http
            .post(format!("{}/sendDocument", self.base))
            .multipart(form);
        let _: serde_json::Value = self.call(request).await?;
        Ok(())
    }
}
