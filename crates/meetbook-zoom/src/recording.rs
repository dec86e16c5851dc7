//! Cloud recording retrieval, download and cleanup.
//!
//! Recording operations live on the scheduler because they reuse its token
//! cache and account pool. Lookup walks the pool (or one hinted account),
//! download streams the first MP4 to the work directory, and cleanup of the
//! cloud copy is best effort: a failed delete is logged, never surfaced.

use std::path::PathBuf;

use tracing::{info, warn};

use crate::booking::ZoomScheduler;
use crate::error::{Diagnostics, Stage, ZoomError, ZoomResult};
use crate::summary;

/// A located cloud recording, ready for download.
#[derive(Debug, Clone)]
pub struct RecordingHandle {
    /// Email of the account holding the recording.
    pub account: String,
    /// Direct download URL of the first MP4 file.
    pub download_url: String,
    /// Meeting topic; used as the local file stem.
    pub topic: String,
    /// Meeting instance UUID, needed for summary calls.
    pub meeting_uuid: String,
    /// Where the summary was saved, when retrieval succeeded.
    pub summary_path: Option<PathBuf>,
}

impl ZoomScheduler {
    /// Locates the recording of a meeting.
    ///
    /// With `account_hint` only that account is asked; otherwise the whole
    /// pool is probed in order. The first MP4 file of the first answering
    /// account wins. As a side effect the meeting summary is fetched and
    /// saved to the work directory; a summary failure does not block the
    /// lookup.
    ///
    /// # Errors
    ///
    /// [`ZoomError::UnknownAccount`] when the hint matches no configured
    /// account, [`ZoomError::AllAccountsFailed`] when no candidate produced
    /// an MP4.
    pub async fn find_recording(
        &self,
        meeting_id: &str,
        account_hint: Option<&str>,
    ) -> ZoomResult<RecordingHandle> {
        let candidates = match account_hint {
            Some(email) => vec![self.account_by_email(email)?],
            None => self.config().accounts.iter().collect(),
        };

        let mut diagnostics = Diagnostics::new();
        for account in candidates {
            let token = match self.access_token(account).await {
                Ok(token) => token,
                Err(e) => {
                    diagnostics.push(&account.email, Stage::Token, e.to_string());
                    continue;
                }
            };

            let info = match self.api().recording_info(meeting_id, &token).await {
                Ok(info) => info,
                Err(e) => {
                    diagnostics.push(&account.email, Stage::Recording, e.to_string());
                    continue;
                }
            };

            let Some(file) = info.first_mp4() else {
                diagnostics.push(&account.email, Stage::Recording, "no MP4 file in recording");
                continue;
            };

            info!(account = %account.email, meeting_id, topic = %info.topic, "recording found");
            let summary_path = match summary::save_summary(
                self.api(),
                &token,
                &info.uuid,
                &info.topic,
                &self.config().work_dir,
            )
            .await
            {
                Ok(path) => Some(path),
                Err(e) => {
                    warn!(account = %account.email, meeting_id, error = %e, "summary retrieval failed");
                    None
                }
            };

            return Ok(RecordingHandle {
                account: account.email.clone(),
                download_url: file.download_url.clone(),
                topic: info.topic.clone(),
                meeting_uuid: info.uuid.clone(),
                summary_path,
            });
        }

        Err(ZoomError::AllAccountsFailed(diagnostics))
    }

    /// Downloads the recording of a meeting and removes the cloud copy.
    ///
    /// Resolves the link to a meeting id, locates the recording, streams the
    /// MP4 to `<work_dir>/<topic>.mp4`, then deletes the cloud recording and
    /// summary. Cleanup failures are logged only; the local file is already
    /// safe at that point.
    ///
    /// Returns the meeting topic on success.
    pub async fn download_recording(
        &self,
        link: &str,
        account_hint: Option<&str>,
    ) -> ZoomResult<String> {
        let meeting_id = meetbook_core::extract_meeting_id(link)
            .ok_or_else(|| ZoomError::InvalidLink(link.to_string()))?;

        let handle = self.find_recording(&meeting_id, account_hint).await?;
        let account = self.account_by_email(&handle.account)?;
        let token = self.access_token(account).await?;

        let video_path = self
            .config()
            .work_dir
            .join(format!("{}.mp4", handle.topic));
        info!(meeting_id, path = %video_path.display(), "downloading recording");
        self.api()
            .download_file(&handle.download_url, &token, &video_path)
            .await?;

        self.cleanup_cloud_copy(&meeting_id, &handle.meeting_uuid, &token)
            .await;
        Ok(handle.topic)
    }

    /// Removes the cloud recording and summary after a successful download.
    async fn cleanup_cloud_copy(&self, meeting_id: &str, meeting_uuid: &str, token: &str) {
        if let Err(e) = self.api().delete_recording(meeting_id, token).await {
            warn!(meeting_id, error = %e, "cloud recording cleanup failed");
        }
        if let Err(e) = self.api().delete_summary(meeting_uuid, token).await {
            warn!(meeting_id, error = %e, "summary cleanup failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ZoomAccount, ZoomConfig};

    fn scheduler() -> ZoomScheduler {
        let config = ZoomConfig::new(vec![ZoomAccount::new(
            "host@example.com",
            "id",
            "secret",
            "acc",
        )]);
        ZoomScheduler::new(config).unwrap()
    }

    #[tokio::test]
    async fn hint_for_unconfigured_account_fails_fast() {
        let scheduler = scheduler();
        let result = scheduler
            .find_recording("123456789", Some("ghost@example.com"))
            .await;
        assert!(matches!(result, Err(ZoomError::UnknownAccount(_))));
    }

    #[tokio::test]
    async fn download_rejects_links_without_meeting_id() {
        let scheduler = scheduler();
        let result = scheduler
            .download_recording("https://zoom.us/about", None)
            .await;
        assert!(matches!(result, Err(ZoomError::InvalidLink(_))));
    }
}
