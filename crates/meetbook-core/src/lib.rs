//! Core types for meetbook: time arithmetic, meeting links, records.
//!
//! This crate holds the pure, dependency-light building blocks shared by the
//! provider client and the bot layer:
//!
//! - [`ConflictWindow`] - padded time range used to test a candidate booking
//!   against existing meetings
//! - [`SlotGrid`] - the fixed daily grid of half-hour slots scanned when no
//!   account can host the requested time
//! - [`links`] - join-link parsing (meeting id extraction)
//! - [`MeetingRequest`] / [`MeetingRecord`] - booking input and stored result
//! - [`tracing`] - unified tracing setup for the binaries

pub mod links;
pub mod record;
pub mod time;
pub mod tracing;

pub use links::extract_meeting_id;
pub use record::{MeetingRecord, MeetingRequest};
pub use time::{ConflictWindow, SlotGrid};
