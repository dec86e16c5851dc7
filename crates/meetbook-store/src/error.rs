//! Store error type.

use thiserror::Error;

/// An error from the meeting store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying SQLite failure.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A previous panic poisoned the connection lock.
    #[error("store lock poisoned")]
    LockPoisoned,
}

/// A specialized Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
