//! Resumable video upload against the YouTube Data API v3.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::credentials::YouTubeCredentials;
use crate::error::{YouTubeError, YouTubeResult};

/// Default OAuth token endpoint.
pub const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Default resumable upload endpoint.
pub const DEFAULT_UPLOAD_URL: &str = "https://www.googleapis.com/upload/youtube/v3/videos";

const TOKEN_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    id: String,
}

/// Uploads meeting recordings as unlisted YouTube videos.
///
/// Each upload refreshes the access token first; access tokens are not
/// cached because uploads are rare and long-running compared to the token
/// lifetime.
#[derive(Debug)]
pub struct YouTubeUploader {
    http: reqwest::Client,
    credentials: YouTubeCredentials,
    token_url: String,
    upload_url: String,
}

impl YouTubeUploader {
    /// Creates an uploader for the given credentials.
    pub fn new(credentials: YouTubeCredentials) -> Self {
        // Uploads are large; only the token call gets a timeout.
        let http = reqwest::Client::new();
        Self {
            http,
            credentials,
            token_url: DEFAULT_TOKEN_URL.to_string(),
            upload_url: DEFAULT_UPLOAD_URL.to_string(),
        }
    }

    /// Builder: override the token endpoint (used by tests).
    #[must_use]
    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    /// Builder: override the upload endpoint (used by tests).
    #[must_use]
    pub fn with_upload_url(mut self, url: impl Into<String>) -> Self {
        self.upload_url = url.into();
        self
    }

    /// Exchanges the refresh token for a fresh access token.
    async fn refresh_access_token(&self) -> YouTubeResult<String> {
        info!("refreshing youtube access token");
        let response = self
            .http
            .post(&self.token_url)
            .timeout(TOKEN_TIMEOUT)
            .form(&[
                ("client_id", self.credentials.client_id.as_str()),
                ("client_secret", self.credentials.client_secret.as_str()),
                ("refresh_token", self.credentials.refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .map_err(YouTubeError::from_transport)?;

        let status = response.status();
        let body = response.text().await.map_err(YouTubeError::from_transport)?;
        if !status.is_success() {
            return Err(YouTubeError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: RefreshResponse = serde_json::from_str(&body)
            .map_err(|e| YouTubeError::InvalidResponse(format!("token response: {e}")))?;
        parsed
            .access_token
            .ok_or_else(|| YouTubeError::InvalidResponse("access token missing".into()))
    }

    /// Uploads a video file as an unlisted recording.
    ///
    /// Runs the two-step resumable protocol: an initiation request carrying
    /// the metadata returns a session URL in the `Location` header, then the
    /// video bytes go to that URL in one PUT.
    ///
    /// Returns the public watch URL.
    pub async fn upload_video(
        &self,
        video_path: &Path,
        title: &str,
        description: &str,
    ) -> YouTubeResult<String> {
        let token = self.refresh_access_token().await?;
        info!(title, path = %video_path.display(), "uploading video");

        let metadata = json!({
            "snippet": {
                "title": title,
                "description": description,
                "tags": ["Zoom", "Meeting", "Recording"],
                "categoryId": "27",
            },
            "status": {
                "privacyStatus": "unlisted",
                "madeForKids": false,
            },
        });

        let initiation = self
            .http
            .post(format!(
                "{}?uploadType=resumable&part=snippet,status",
                self.upload_url
            ))
            .bearer_auth(&token)
            .json(&metadata)
            .send()
            .await
            .map_err(YouTubeError::from_transport)?;

        let status = initiation.status();
        if !status.is_success() {
            let body = initiation.text().await.unwrap_or_default();
            return Err(YouTubeError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let session_url = initiation
            .headers()
            .get("location")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| {
                YouTubeError::InvalidResponse("upload session URL missing".into())
            })?;

        let video = tokio::fs::read(video_path).await?;
        let response = self
            .http
            .put(&session_url)
            .bearer_auth(&token)
            .header("content-type", "video/mp4")
            .body(video)
            .send()
            .await
            .map_err(YouTubeError::from_transport)?;

        let status = response.status();
        let body = response.text().await.map_err(YouTubeError::from_transport)?;
        if !status.is_success() {
            return Err(YouTubeError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: UploadResponse = serde_json::from_str(&body)
            .map_err(|e| YouTubeError::InvalidResponse(format!("upload response: {e}")))?;
        let link = format!("https://www.youtube.com/watch?v={}", parsed.id);
        info!(link, "video uploaded");
        Ok(link)
    }
}
