//! Low-level Zoom REST client.
//!
//! Thin HTTP layer over the provider endpoints: token exchange, per-account
//! meeting list/create, delete-by-id, recording and summary metadata and
//! deletion, and the media download stream. Status-code policy lives here
//! (creation succeeds only on 201, deletion only on 204); pool-walking
//! policy lives in the scheduler.

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use meetbook_core::MeetingRequest;

use crate::config::ZoomAccount;
use crate::error::{ZoomError, ZoomResult};

/// Timeout for control-plane calls.
const CONTROL_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout for the media download stream.
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Zoom REST API client.
///
/// Holds two HTTP clients so the long-running download stream does not
/// inherit the short control-plane timeout. Access tokens are passed per
/// call; caching is the scheduler's concern.
#[derive(Debug)]
pub struct ZoomApi {
    http: reqwest::Client,
    download: reqwest::Client,
    api_base: String,
    token_url: String,
}

impl ZoomApi {
    /// Creates a new client for the given endpoints.
    pub fn new(api_base: impl Into<String>, token_url: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(CONTROL_TIMEOUT)
            .build()
            .expect("failed to create HTTP client");
        let download = reqwest::Client::builder()
            .timeout(DOWNLOAD_TIMEOUT)
            .build()
            .expect("failed to create HTTP client");

        Self {
            http,
            download,
            api_base: api_base.into(),
            token_url: token_url.into(),
        }
    }

    /// Performs the client-credentials exchange for one account.
    ///
    /// Authenticates with HTTP Basic from the account's client id and secret
    /// and requests a token bound to its account id.
    pub async fn exchange_token(&self, account: &ZoomAccount) -> ZoomResult<TokenResponse> {
        let response = self
            .http
            .post(&self.token_url)
            .basic_auth(&account.client_id, Some(&account.client_secret))
            .form(&[
                ("grant_type", "account_credentials"),
                ("account_id", account.account_id.as_str()),
            ])
            .send()
            .await
            .map_err(ZoomError::from_transport)?;

        let status = response.status();
        let body = response.text().await.map_err(ZoomError::from_transport)?;
        if !status.is_success() {
            return Err(ZoomError::Api {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body)
            .map_err(|e| ZoomError::InvalidResponse(format!("token response: {e}")))
    }

    /// Fetches the full scheduled-meeting list of an account.
    ///
    /// No date filter is sent; conflict filtering happens locally.
    pub async fn list_meetings(
        &self,
        email: &str,
        token: &str,
    ) -> ZoomResult<Vec<ScheduledMeeting>> {
        let url = format!("{}/users/{}/meetings", self.api_base, email);
        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(ZoomError::from_transport)?;

        let status = response.status();
        let body = response.text().await.map_err(ZoomError::from_transport)?;
        if !status.is_success() {
            return Err(ZoomError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let list: MeetingList = serde_json::from_str(&body)
            .map_err(|e| ZoomError::InvalidResponse(format!("meeting list: {e}")))?;
        debug!(account = email, count = list.meetings.len(), "fetched scheduled meetings");
        Ok(list.meetings)
    }

    /// Creates a meeting on an account. Success is exactly HTTP 201.
    pub async fn create_meeting(
        &self,
        email: &str,
        token: &str,
        payload: &MeetingPayload,
    ) -> ZoomResult<MeetingDetails> {
        let url = format!("{}/users/{}/meetings", self.api_base, email);
        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(payload)
            .send()
            .await
            .map_err(ZoomError::from_transport)?;

        let status = response.status();
        let body = response.text().await.map_err(ZoomError::from_transport)?;
        if status.as_u16() != 201 {
            return Err(ZoomError::Api {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body)
            .map_err(|e| ZoomError::InvalidResponse(format!("meeting details: {e}")))
    }

    /// Issues a delete for a meeting id. Returns true on HTTP 204.
    pub async fn delete_meeting(&self, meeting_id: &str, token: &str) -> ZoomResult<bool> {
        let url = format!("{}/meetings/{}", self.api_base, meeting_id);
        let response = self
            .http
            .delete(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(ZoomError::from_transport)?;
        Ok(response.status().as_u16() == 204)
    }

    /// Fetches recording metadata for a meeting id.
    pub async fn recording_info(&self, meeting_id: &str, token: &str) -> ZoomResult<RecordingInfo> {
        let url = format!("{}/meetings/{}/recordings", self.api_base, meeting_id);
        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(ZoomError::from_transport)?;

        let status = response.status();
        let body = response.text().await.map_err(ZoomError::from_transport)?;
        if !status.is_success() {
            return Err(ZoomError::Api {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body)
            .map_err(|e| ZoomError::InvalidResponse(format!("recording info: {e}")))
    }

    /// Deletes the cloud recording of a meeting. Expects HTTP 204.
    pub async fn delete_recording(&self, meeting_id: &str, token: &str) -> ZoomResult<()> {
        let url = format!("{}/meetings/{}/recordings", self.api_base, meeting_id);
        self.delete_expecting_no_content(&url, token).await
    }

    /// Fetches the auto-generated meeting summary.
    pub async fn meeting_summary(
        &self,
        meeting_uuid: &str,
        token: &str,
    ) -> ZoomResult<MeetingSummary> {
        let url = format!("{}/meetings/{}/meeting_summary", self.api_base, meeting_uuid);
        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(ZoomError::from_transport)?;

        let status = response.status();
        let body = response.text().await.map_err(ZoomError::from_transport)?;
        if !status.is_success() {
            return Err(ZoomError::Api {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body)
            .map_err(|e| ZoomError::InvalidResponse(format!("meeting summary: {e}")))
    }

    /// Deletes the meeting summary. Expects HTTP 204.
    pub async fn delete_summary(&self, meeting_id: &str, token: &str) -> ZoomResult<()> {
        let url = format!("{}/meetings/{}/meeting_summary", self.api_base, meeting_id);
        self.delete_expecting_no_content(&url, token).await
    }

    /// Streams a media file to local storage in chunks.
    pub async fn download_file(&self, url: &str, token: &str, dest: &Path) -> ZoomResult<()> {
        let mut response = self
            .download
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(ZoomError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ZoomError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let mut file = tokio::fs::File::create(dest).await?;
        while let Some(chunk) = response.chunk().await.map_err(ZoomError::from_transport)? {
            file.write_all(&chunk).await?;
        }
        file.flush().await?;
        Ok(())
    }

    async fn delete_expecting_no_content(&self, url: &str, token: &str) -> ZoomResult<()> {
        let response = self
            .http
            .delete(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(ZoomError::from_transport)?;

        let status = response.status();
        if status.as_u16() != 204 {
            let body = response.text().await.unwrap_or_default();
            return Err(ZoomError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

/// Response from the OAuth token endpoint.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    /// The bearer token; absent on malformed provider responses.
    pub access_token: Option<String>,
    /// Lifetime in seconds.
    pub expires_in: Option<i64>,
}

/// Response from the meeting list endpoint.
#[derive(Debug, Deserialize)]
struct MeetingList {
    #[serde(default)]
    meetings: Vec<ScheduledMeeting>,
}

/// One scheduled meeting as reported by the provider.
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduledMeeting {
    /// Start time; absent for personal-room entries without a schedule.
    pub start_time: Option<DateTime<Utc>>,
    /// Duration in minutes.
    #[serde(default)]
    pub duration: i64,
}

/// Fixed settings attached to every created meeting.
#[derive(Debug, Clone, Serialize)]
pub struct MeetingSettings {
    host_video: bool,
    participant_video: bool,
    waiting_room: bool,
    auto_recording: &'static str,
    meeting_authentication: bool,
    join_before_host: bool,
    jbh_time: u8,
    auto_start_meeting_summary: bool,
    mute_upon_entry: bool,
}

impl Default for MeetingSettings {
    fn default() -> Self {
        Self {
            host_video: false,
            participant_video: true,
            waiting_room: false,
            auto_recording: "cloud",
            meeting_authentication: false,
            join_before_host: true,
            jbh_time: 5,
            auto_start_meeting_summary: true,
            mute_upon_entry: true,
        }
    }
}

/// Meeting creation payload.
#[derive(Debug, Clone, Serialize)]
pub struct MeetingPayload {
    topic: String,
    #[serde(rename = "type")]
    meeting_type: u8,
    start_time: String,
    duration: i64,
    timezone: String,
    settings: MeetingSettings,
}

impl MeetingPayload {
    /// Builds the payload for a scheduled meeting (provider type 2).
    pub fn from_request(request: &MeetingRequest, timezone: &str) -> Self {
        Self {
            topic: request.topic.clone(),
            meeting_type: 2,
            start_time: request.start_time.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            duration: request.duration_minutes,
            timezone: timezone.to_string(),
            settings: MeetingSettings::default(),
        }
    }
}

/// Details of a created meeting.
#[derive(Debug, Clone, Deserialize)]
pub struct MeetingDetails {
    /// Numeric meeting id.
    pub id: u64,
    /// Meeting topic.
    pub topic: String,
    /// Join link for participants.
    pub join_url: String,
    /// Hosting account email as reported by the provider.
    pub host_email: Option<String>,
}

/// One file entry in a cloud recording.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordingFile {
    /// File type, e.g. `MP4` or `M4A`.
    #[serde(default)]
    pub file_extension: String,
    /// Direct download URL.
    pub download_url: String,
}

/// Recording metadata for a meeting.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordingInfo {
    /// Provider UUID of the meeting instance (used for the summary lookup).
    pub uuid: String,
    /// Meeting topic; becomes the local file stem.
    pub topic: String,
    /// Recorded files, in provider order.
    #[serde(default)]
    pub recording_files: Vec<RecordingFile>,
}

impl RecordingInfo {
    /// Returns the first MP4 entry, if any.
    ///
    /// When a recording is split into several MP4 files only the first is
    /// used, matching the provider's ordering.
    pub fn first_mp4(&self) -> Option<&RecordingFile> {
        self.recording_files
            .iter()
            .find(|file| file.file_extension == "MP4")
    }
}

/// One chapter of an auto-generated summary.
#[derive(Debug, Clone, Deserialize)]
pub struct SummaryChapter {
    /// Chapter heading.
    pub label: Option<String>,
    /// Chapter text.
    pub summary: Option<String>,
}

/// The auto-generated meeting summary.
#[derive(Debug, Clone, Deserialize)]
pub struct MeetingSummary {
    /// Overall summary paragraph.
    pub summary_overview: Option<String>,
    /// Per-chapter details.
    #[serde(default)]
    pub summary_details: Vec<SummaryChapter>,
}
