use chrono::NaiveDate;
use coursecal_core::DateError;
use thiserror::Error;

/// Errors raised by the record store. Callers treat them as opaque
/// server-side failures.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A SQLite operation failed (including constraint violations).
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A stored date column does not match the configured day format.
    #[error("malformed date in {context}: {source}")]
    MalformedDate { context: String, source: DateError },

    /// A stored row ends before it starts.
    #[error("reversed range in {context}: end {end} is before start {start}")]
    ReversedRange {
        context: String,
        start: NaiveDate,
        end: NaiveDate,
    },

    /// Another thread panicked while holding the connection.
    #[error("database connection lock poisoned")]
    LockPoisoned,
}

pub type Result<T> = std::result::Result<T, StoreError>;
