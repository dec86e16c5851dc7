//! SQLite persistence for booked meetings.
//!
//! The store remembers which account hosts which meeting so later deletion
//! and recording lookups can go straight to the right account instead of
//! probing the whole pool.

pub mod error;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use store::MeetingStore;
