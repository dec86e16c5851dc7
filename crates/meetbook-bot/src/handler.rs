//! Command routing and flow execution.
//!
//! The handler owns every collaborator (Telegram client, scheduler, store,
//! uploader) and one [`Session`] per chat. Commands switch the session into
//! a conversation; plain messages feed the active conversation and the
//! resulting [`SessionAction`] is executed here.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::{error, info, warn};

use meetbook_core::{MeetingRecord, MeetingRequest};
use meetbook_store::MeetingStore;
use meetbook_youtube::YouTubeUploader;
use meetbook_zoom::{summary::summary_file_name, BookingOutcome, ZoomScheduler};

use crate::error::BotResult;
use crate::session::{Session, SessionAction};
use crate::telegram::{TelegramClient, Update};

const WELCOME: &str = "👋 I book Zoom meetings.\n\n\
/book - book a meeting\n\
/my_meetings - list your meetings\n\
/delete - delete a meeting\n\
/upload - upload a recording to YouTube\n\
/cancel - cancel the current operation";

/// The bot runtime: collaborators plus per-chat conversation state.
pub struct BotHandler {
    telegram: TelegramClient,
    scheduler: ZoomScheduler,
    store: MeetingStore,
    uploader: Option<YouTubeUploader>,
    timezone: Tz,
    work_dir: PathBuf,
    sessions: HashMap<i64, Session>,
}

impl BotHandler {
    pub fn new(
        telegram: TelegramClient,
        scheduler: ZoomScheduler,
        store: MeetingStore,
        uploader: Option<YouTubeUploader>,
        timezone: Tz,
        work_dir: PathBuf,
    ) -> Self {
        Self {
            telegram,
            scheduler,
            store,
            uploader,
            timezone,
            work_dir,
            sessions: HashMap::new(),
        }
    }

    /// Long-polls for updates forever, handling each in turn.
    ///
    /// A failed poll backs off for a few seconds; a failed update is logged
    /// and skipped so one broken chat cannot stall the loop.
    pub async fn run(&mut self) {
        info!("bot started");
        let mut offset = 0;
        loop {
            match self.telegram.get_updates(offset).await {
                Ok(updates) => {
                    for update in updates {
                        offset = update.update_id + 1;
                        if let Err(e) = self.handle_update(&update).await {
                            error!(update_id = update.update_id, error = %e, "update failed");
                        }
                    }
                }
                Err(e) => {
                    error!(error = %e, "polling failed");
                    tokio::time::sleep(std::time::Duration::from_secs(5)).await;
                }
            }
        }
    }

    /// Handles one incoming update. Non-text updates are ignored.
    pub async fn handle_update(&mut self, update: &Update) -> BotResult<()> {
        let Some(message) = &update.message else {
            return Ok(());
        };
        let Some(text) = &message.text else {
            return Ok(());
        };
        self.handle_message(message.chat.id, text).await
    }

    /// Routes one text message: commands first, then the active conversation.
    pub async fn handle_message(&mut self, chat_id: i64, text: &str) -> BotResult<()> {
        let text = text.trim();
        let session = self.sessions.entry(chat_id).or_default();

        match text {
            "/start" | "/help" => {
                session.cancel();
                self.telegram.send_message(chat_id, WELCOME).await
            }
            "/cancel" => {
                let reply = if session.cancel() {
                    "✅ Operation cancelled."
                } else {
                    "Nothing to cancel."
                };
                self.telegram.send_message(chat_id, reply).await
            }
            "/book" => {
                let prompt = session.start_booking();
                info!(chat_id, "booking started");
                self.telegram.send_message(chat_id, &prompt).await
            }
            "/my_meetings" => {
                session.cancel();
                self.list_meetings(chat_id).await
            }
            "/delete" => {
                let prompt = session.start_deleting();
                self.telegram.send_message(chat_id, &prompt).await
            }
            "/upload" | "/upload_to_youtube" => {
                if self.uploader.is_none() {
                    return self
                        .telegram
                        .send_message(chat_id, "⚠ YouTube uploads are not configured.")
                        .await;
                }
                let prompt = session.start_uploading();
                self.telegram.send_message(chat_id, &prompt).await
            }
            _ => {
                let now_local = Utc::now().with_timezone(&self.timezone).naive_local();
                let action = session.handle_input(text, now_local);
                self.run_action(chat_id, action).await
            }
        }
    }

    async fn run_action(&mut self, chat_id: i64, action: SessionAction) -> BotResult<()> {
        match action {
            SessionAction::Ignore => Ok(()),
            SessionAction::Reply(text) => self.telegram.send_message(chat_id, &text).await,
            SessionAction::Book {
                date,
                time,
                topic,
                duration_minutes,
            } => self.book(chat_id, date, time, topic, duration_minutes).await,
            SessionAction::Delete { link } => self.delete(chat_id, &link).await,
            SessionAction::FetchRecording { link } => self.fetch_recording(chat_id, &link).await,
            SessionAction::Upload { title, description } => {
                self.upload(chat_id, &title, &description).await
            }
        }
    }

    async fn book(
        &mut self,
        chat_id: i64,
        date: NaiveDate,
        time: NaiveTime,
        topic: String,
        duration_minutes: i64,
    ) -> BotResult<()> {
        let Some(start_local) = self.timezone.from_local_datetime(&date.and_time(time)).earliest()
        else {
            return self
                .telegram
                .send_message(chat_id, "⛔ That local time does not exist. Start over with /book.")
                .await;
        };
        let start = start_local.with_timezone(&Utc);

        self.telegram.send_message(chat_id, "🚨 Checking slots...").await?;
        let request = MeetingRequest::new(topic.clone(), start, duration_minutes);
        info!(chat_id, topic, %start, duration_minutes, "booking meeting");

        match self.scheduler.book_meeting(&request, date).await {
            Ok(BookingOutcome::Booked(booked)) => {
                let record = MeetingRecord {
                    user_id: chat_id.to_string(),
                    date: date.format("%d.%m.%Y").to_string(),
                    time: time.format("%H:%M").to_string(),
                    topic,
                    duration_minutes,
                    account: booked.account.clone(),
                    join_url: booked.details.join_url.clone(),
                };
                self.store.save(&record)?;

                let reply = format!(
                    "✅ Meeting created:\n📅 {}\n⏰ {}\n📝 {}\n⏳ {} minutes\n👤 Account: {}\n🔗 {}",
                    record.date,
                    record.time,
                    record.topic,
                    record.duration_minutes,
                    record.account,
                    record.join_url,
                );
                self.telegram.send_message(chat_id, &reply).await
            }
            Ok(BookingOutcome::Unavailable {
                alternatives,
                diagnostics,
            }) => {
                warn!(chat_id, failures = diagnostics.len(), "booking unavailable");
                let mut reply = format!("⛔ Booking failed.\nDetails:\n{diagnostics}");
                if !alternatives.is_empty() {
                    reply.push_str("\n\n📅 Available slots:\n");
                    reply.push_str(&alternatives.join("\n"));
                    reply.push_str("\n\nPick a time via /book.");
                }
                self.telegram.send_message(chat_id, &reply).await
            }
            Err(e) => {
                warn!(chat_id, error = %e, "booking error");
                self.telegram
                    .send_message(chat_id, &format!("⛔ Booking failed.\nDetails: {e}"))
                    .await
            }
        }
    }

    async fn delete(&mut self, chat_id: i64, link: &str) -> BotResult<()> {
        match self.scheduler.delete_meeting(link).await {
            Ok(account) => {
                self.store.delete_by_link(link)?;
                info!(chat_id, link, account, "meeting deleted");
                self.telegram
                    .send_message(
                        chat_id,
                        &format!("✅ Meeting {link} deleted (account: {account})."),
                    )
                    .await
            }
            Err(e) => {
                warn!(chat_id, link, error = %e, "deletion failed");
                self.telegram
                    .send_message(chat_id, &format!("⛔ Deletion failed.\nDetails: {e}"))
                    .await
            }
        }
    }

    async fn fetch_recording(&mut self, chat_id: i64, link: &str) -> BotResult<()> {
        self.telegram.send_message(chat_id, "⏳ Checking recording...").await?;

        // A stored booking pins the hosting account; otherwise probe them all.
        let hint = self.store.account_for_link(link)?;
        match self.scheduler.download_recording(link, hint.as_deref()).await {
            Ok(title) => {
                // The meeting is over; drop it from the provider and the store.
                if let Err(e) = self.scheduler.delete_meeting(link).await {
                    warn!(link, error = %e, "post-download meeting deletion failed");
                }
                self.store.delete_by_link(link)?;

                let session = self.sessions.entry(chat_id).or_default();
                let prompt = session.recording_ready(title);
                self.telegram.send_message(chat_id, &prompt).await
            }
            Err(e) => {
                warn!(chat_id, link, error = %e, "recording download failed");
                self.telegram
                    .send_message(chat_id, &format!("⚠ Download failed.\nDetails: {e}"))
                    .await
            }
        }
    }

    async fn upload(&mut self, chat_id: i64, title: &str, description: &str) -> BotResult<()> {
        let video_path = self.work_dir.join(format!("{title}.mp4"));
        let summary_path = self.work_dir.join(summary_file_name(title));

        let Some(uploader) = &self.uploader else {
            return self
                .telegram
                .send_message(chat_id, "⚠ YouTube uploads are not configured.")
                .await;
        };

        self.telegram.send_message(chat_id, "⏳ Uploading to YouTube...").await?;
        match uploader.upload_video(&video_path, title, description).await {
            Ok(link) => {
                info!(chat_id, title, link, "video uploaded");
                self.telegram
                    .send_message(chat_id, &format!("✅ Video uploaded: {link}"))
                    .await?;
                self.send_summary(chat_id, &summary_path).await?;
                remove_if_present(&video_path).await;
                remove_if_present(&summary_path).await;
                Ok(())
            }
            Err(e) => {
                // Keep the local files so the upload can be retried by hand.
                warn!(chat_id, title, error = %e, "upload failed");
                self.telegram
                    .send_message(
                        chat_id,
                        &format!(
                            "⛔ Upload failed.\nDetails: {e}\nFiles kept: {}, {}",
                            video_path.display(),
                            summary_path.display(),
                        ),
                    )
                    .await
            }
        }
    }

    async fn send_summary(&self, chat_id: i64, summary_path: &Path) -> BotResult<()> {
        if summary_path.exists() {
            self.telegram.send_document(chat_id, summary_path).await
        } else {
            self.telegram.send_message(chat_id, "⚠ Summary not found.").await
        }
    }

    async fn list_meetings(&self, chat_id: i64) -> BotResult<()> {
        let meetings = self.store.meetings_for_user(&chat_id.to_string())?;
        if meetings.is_empty() {
            return self
                .telegram
                .send_message(chat_id, "❌ You have no meetings.")
                .await;
        }

        let mut reply = "📅 Your meetings:\n\n".to_string();
        for meeting in &meetings {
            reply.push_str(&format!(
                "📆 {}\n⏰ {}\n📝 {}\n👤 Account: {}\n⏳ {} minutes\n🔗 {}\n\n",
                meeting.date,
                meeting.time,
                meeting.topic,
                meeting.account,
                meeting.duration_minutes,
                meeting.join_url,
            ));
        }
        self.telegram.send_message(chat_id, reply.trim_end()).await
    }
}

async fn remove_if_present(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => info!(path = %path.display(), "local file removed"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "local file removal failed"),
    }
}
