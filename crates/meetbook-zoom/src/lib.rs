//! Zoom provider client: multi-account booking, deletion and recording
//! retrieval over server-to-server OAuth.
//!
//! The entry point is [`ZoomScheduler`], built from a [`ZoomConfig`] holding
//! an ordered account pool. Booking walks the pool first-fit; every remote
//! call goes through the shared [`client::ZoomApi`] and reuses tokens from an
//! in-memory cache.

pub mod booking;
pub mod client;
pub mod config;
pub mod error;
pub mod recording;
pub mod summary;
pub mod token;

pub use booking::{BookedMeeting, BookingOutcome, ZoomScheduler};
pub use client::{MeetingDetails, RecordingInfo};
pub use config::{ZoomAccount, ZoomConfig};
pub use error::{AttemptFailure, Diagnostics, Stage, ZoomError, ZoomResult};
pub use recording::RecordingHandle;
pub use token::TokenCache;
