//! Booking input and stored booking records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A request to book one meeting.
///
/// Built by the session layer from validated user input and passed by value
/// into the provider client. The start time is always a UTC instant; the
/// configured timezone only matters when the local wall-clock input is
/// converted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeetingRequest {
    /// Meeting topic as entered by the user.
    pub topic: String,
    /// Start of the meeting in UTC.
    pub start_time: DateTime<Utc>,
    /// Duration in minutes.
    pub duration_minutes: i64,
}

impl MeetingRequest {
    /// Creates a new meeting request.
    pub fn new(topic: impl Into<String>, start_time: DateTime<Utc>, duration_minutes: i64) -> Self {
        Self {
            topic: topic.into(),
            start_time,
            duration_minutes,
        }
    }
}

/// A booked meeting as persisted by the store.
///
/// Date and time are kept in the user-facing local formats (`DD.MM.YYYY`,
/// `HH:MM`) exactly as they were entered, so listings can echo them back
/// without re-deriving the local zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingRecord {
    /// Identity of the requesting chat user.
    pub user_id: String,
    /// Local meeting date, `DD.MM.YYYY`.
    pub date: String,
    /// Local meeting time, `HH:MM`.
    pub time: String,
    /// Meeting topic.
    pub topic: String,
    /// Duration in minutes.
    pub duration_minutes: i64,
    /// Email of the account hosting the meeting.
    pub account: String,
    /// Join link returned by the provider.
    pub join_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn record_serde_roundtrip() {
        let record = MeetingRecord {
            user_id: "42".to_string(),
            date: "01.06.2025".to_string(),
            time: "10:00".to_string(),
            topic: "Weekly sync".to_string(),
            duration_minutes: 60,
            account: "host@example.com".to_string(),
            join_url: "https://zoom.us/j/1234567890".to_string(),
        };

        let json = serde_json::to_string(&record).unwrap();
        let parsed: MeetingRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, parsed);
    }

    #[test]
    fn request_construction() {
        let start = Utc.with_ymd_and_hms(2099, 1, 1, 10, 0, 0).unwrap();
        let request = MeetingRequest::new("Planning", start, 45);
        assert_eq!(request.topic, "Planning");
        assert_eq!(request.start_time, start);
        assert_eq!(request.duration_minutes, 45);
    }
}
