//! Per-chat conversation state machine.
//!
//! The session is pure: it validates input against an injected local clock
//! and tells the handler what to do next, but never touches the network or
//! the store itself. One session exists per chat.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Shortest bookable meeting, minutes.
pub const MIN_DURATION: i64 = 30;

/// Longest bookable meeting, minutes.
pub const MAX_DURATION: i64 = 240;

/// Step of the booking conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingStep {
    Date,
    Time { date: NaiveDate },
    Topic { date: NaiveDate, time: NaiveTime },
    Duration {
        date: NaiveDate,
        time: NaiveTime,
        topic: String,
    },
}

/// Step of the upload conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadStep {
    Link,
    Description { title: String },
}

/// Current conversation state of one chat.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Booking(BookingStep),
    Deleting,
    Uploading(UploadStep),
}

/// What the handler should do after feeding input to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    /// Nothing to do; the chat is idle and the text was not a command.
    Ignore,
    /// Send this text back and wait for more input.
    Reply(String),
    /// All booking data collected; book the meeting.
    Book {
        date: NaiveDate,
        time: NaiveTime,
        topic: String,
        duration_minutes: i64,
    },
    /// Delete the meeting behind this link.
    Delete { link: String },
    /// Locate and download the recording behind this link.
    FetchRecording { link: String },
    /// Upload the downloaded recording.
    Upload { title: String, description: String },
}

/// Conversation state machine for one chat.
#[derive(Debug, Default)]
pub struct Session {
    state: SessionState,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Drops any active conversation. Returns true when one was active.
    pub fn cancel(&mut self) -> bool {
        let was_active = self.state != SessionState::Idle;
        self.state = SessionState::Idle;
        was_active
    }

    /// Starts the booking conversation and returns the first prompt.
    pub fn start_booking(&mut self) -> String {
        self.state = SessionState::Booking(BookingStep::Date);
        "📅 Enter the date (DD.MM.YYYY):".to_string()
    }

    /// Starts the deletion conversation and returns the prompt.
    pub fn start_deleting(&mut self) -> String {
        self.state = SessionState::Deleting;
        "🔗 Enter the meeting URL to delete:".to_string()
    }

    /// Starts the upload conversation and returns the prompt.
    pub fn start_uploading(&mut self) -> String {
        self.state = SessionState::Uploading(UploadStep::Link);
        "🔗 Enter the meeting URL to upload:".to_string()
    }

    /// Marks the recording as downloaded; the conversation moves on to the
    /// description prompt.
    pub fn recording_ready(&mut self, title: impl Into<String>) -> String {
        self.state = SessionState::Uploading(UploadStep::Description {
            title: title.into(),
        });
        "📝 Enter a description, or a dot (.) for none:".to_string()
    }

    /// Feeds one message of user input into the active conversation.
    ///
    /// `now_local` is the current wall-clock time in the bot's timezone; the
    /// past-date and past-time checks run against it.
    pub fn handle_input(&mut self, text: &str, now_local: NaiveDateTime) -> SessionAction {
        let text = text.trim();
        match std::mem::take(&mut self.state) {
            SessionState::Idle => SessionAction::Ignore,
            SessionState::Booking(step) => self.advance_booking(step, text, now_local),
            SessionState::Deleting => SessionAction::Delete {
                link: text.to_string(),
            },
            SessionState::Uploading(UploadStep::Link) => {
                // Stay on this step until the handler confirms the download.
                self.state = SessionState::Uploading(UploadStep::Link);
                SessionAction::FetchRecording {
                    link: text.to_string(),
                }
            }
            SessionState::Uploading(UploadStep::Description { title }) => {
                let description = if text == "." { String::new() } else { text.to_string() };
                SessionAction::Upload { title, description }
            }
        }
    }

    fn advance_booking(
        &mut self,
        step: BookingStep,
        text: &str,
        now_local: NaiveDateTime,
    ) -> SessionAction {
        match step {
            BookingStep::Date => match parse_date(text, now_local.date()) {
                Ok(date) => {
                    self.state = SessionState::Booking(BookingStep::Time { date });
                    SessionAction::Reply("⏰ Enter the time (HH:MM):".to_string())
                }
                Err(message) => {
                    self.state = SessionState::Booking(BookingStep::Date);
                    SessionAction::Reply(message)
                }
            },
            BookingStep::Time { date } => match parse_time(text, date, now_local) {
                Ok(time) => {
                    self.state = SessionState::Booking(BookingStep::Topic { date, time });
                    SessionAction::Reply("📝 Enter the topic:".to_string())
                }
                Err(message) => {
                    self.state = SessionState::Booking(BookingStep::Time { date });
                    SessionAction::Reply(message)
                }
            },
            BookingStep::Topic { date, time } => {
                self.state = SessionState::Booking(BookingStep::Duration {
                    date,
                    time,
                    topic: text.to_string(),
                });
                SessionAction::Reply(format!(
                    "⏳ Enter the duration ({MIN_DURATION}-{MAX_DURATION} minutes):"
                ))
            }
            BookingStep::Duration { date, time, topic } => match parse_duration(text) {
                Ok(duration_minutes) => SessionAction::Book {
                    date,
                    time,
                    topic,
                    duration_minutes,
                },
                Err(message) => {
                    self.state = SessionState::Booking(BookingStep::Duration { date, time, topic });
                    SessionAction::Reply(message)
                }
            },
        }
    }
}

/// Parses a `DD.MM.YYYY` date and rejects days before `today`.
pub fn parse_date(text: &str, today: NaiveDate) -> Result<NaiveDate, String> {
    let date = NaiveDate::parse_from_str(text, "%d.%m.%Y")
        .map_err(|_| "❌ Invalid date format. Enter again (DD.MM.YYYY):".to_string())?;
    if date < today {
        return Err("⛔ Date cannot be in the past. Enter again (DD.MM.YYYY):".to_string());
    }
    Ok(date)
}

/// Parses a `HH:MM` time; for today it must not already have passed.
pub fn parse_time(
    text: &str,
    date: NaiveDate,
    now_local: NaiveDateTime,
) -> Result<NaiveTime, String> {
    let time = NaiveTime::parse_from_str(text, "%H:%M")
        .map_err(|_| "❌ Invalid time format. Enter again (HH:MM):".to_string())?;
    if date == now_local.date() && date.and_time(time) < now_local {
        return Err(format!(
            "⛔ Time must not be earlier than {}. Enter again (HH:MM):",
            now_local.format("%H:%M")
        ));
    }
    Ok(time)
}

/// Parses a duration in minutes and enforces the bookable range.
pub fn parse_duration(text: &str) -> Result<i64, String> {
    let duration: i64 = text
        .parse()
        .map_err(|_| "❌ Invalid duration format. Enter again:".to_string())?;
    if !(MIN_DURATION..=MAX_DURATION).contains(&duration) {
        return Err(format!(
            "⛔ Duration must be between {MIN_DURATION} and {MAX_DURATION} minutes. Enter again:"
        ));
    }
    Ok(duration)
}
