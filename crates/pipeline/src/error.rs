use thiserror::Error;

/// Data access errors.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A stored row could not be mapped back into a record.
    #[error("corrupt record {id}: {reason}")]
    Corrupt { id: String, reason: String },

    #[error("invalid value: {0}")]
    InvalidValue(String),

    /// A blocking query task panicked or was cancelled.
    #[error("background query failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// The connection mutex was poisoned by a panicking holder.
    #[error("store unavailable: connection lock poisoned")]
    Poisoned,
}

pub type Result<T> = std::result::Result<T, Error>;
