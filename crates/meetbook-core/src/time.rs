//! Conflict-window arithmetic and the daily slot grid.
//!
//! Booking decisions are made against a [`ConflictWindow`]: the requested
//! interval padded with setup/teardown slack so that meetings on the same
//! account never run back to back. When no account can host the requested
//! time, the [`SlotGrid`] enumerates the fixed set of half-hour candidates
//! that are offered as alternatives.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Slack added before the requested start time.
pub const PRE_BUFFER: Duration = Duration::minutes(30);

/// Slack added after the requested end time.
pub const POST_BUFFER: Duration = Duration::minutes(60);

/// First hour of the daily slot grid (inclusive).
const GRID_START_HOUR: u32 = 9;

/// Last hour of the daily slot grid (inclusive; the 21:30 slot is the final one).
const GRID_END_HOUR: u32 = 21;

/// The padded time range a candidate booking occupies on an account.
///
/// A window for a meeting starting at `start` with duration `d` covers
/// `[start - 30min, start + d + 60min]`. An existing meeting conflicts when
/// its own interval touches the window, boundaries included: a meeting that
/// ends exactly at the window start still counts as a conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConflictWindow {
    /// Start of the padded range (inclusive).
    pub start: DateTime<Utc>,
    /// End of the padded range (inclusive).
    pub end: DateTime<Utc>,
}

impl ConflictWindow {
    /// Builds the padded window around a requested start time and duration.
    pub fn around(start: DateTime<Utc>, duration_minutes: i64) -> Self {
        let padded_start = start - PRE_BUFFER;
        Self {
            start: padded_start,
            end: padded_start + Duration::minutes(duration_minutes) + POST_BUFFER,
        }
    }

    /// Checks whether an existing meeting interval overlaps this window.
    ///
    /// Overlap is inclusive at both boundaries.
    pub fn conflicts_with(&self, meeting_start: DateTime<Utc>, meeting_end: DateTime<Utc>) -> bool {
        meeting_end >= self.start && meeting_start <= self.end
    }

    /// Checks a meeting given by start time and duration in minutes.
    pub fn conflicts_with_duration(
        &self,
        meeting_start: DateTime<Utc>,
        duration_minutes: i64,
    ) -> bool {
        self.conflicts_with(
            meeting_start,
            meeting_start + Duration::minutes(duration_minutes),
        )
    }
}

/// The fixed daily grid of candidate slots, localized to one timezone.
///
/// Slots run from 09:00 to 21:30 in half-hour steps (26 per day). The grid is
/// deterministic: [`SlotGrid::slots`] always yields the same times in
/// ascending chronological order.
#[derive(Debug, Clone, Copy)]
pub struct SlotGrid {
    tz: Tz,
}

impl SlotGrid {
    /// Creates a grid localized to the given timezone.
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    /// Returns the timezone this grid is localized to.
    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// Yields every candidate slot time of a day, ascending.
    pub fn slots() -> impl Iterator<Item = NaiveTime> {
        (GRID_START_HOUR..=GRID_END_HOUR).flat_map(|hour| {
            [0u32, 30].into_iter().map(move |minute| {
                NaiveTime::from_hms_opt(hour, minute, 0).expect("grid time in range")
            })
        })
    }

    /// Converts a local date and slot time to the UTC instant it represents.
    ///
    /// Returns `None` for local times that do not exist in this timezone
    /// (spring-forward gaps); ambiguous times resolve to the earlier mapping.
    pub fn slot_to_utc(&self, date: NaiveDate, slot: NaiveTime) -> Option<DateTime<Utc>> {
        self.tz
            .from_local_datetime(&date.and_time(slot))
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Formats a slot time as the `HH:MM` label shown to users.
    pub fn label(slot: NaiveTime) -> String {
        slot.format("%H:%M").to_string()
    }
}
