//! Error kinds surfaced by the storage layer.

use rusqlite::ErrorCode;
use thiserror::Error;

/// Errors produced by storage and repository operations.
///
/// A missing row is not an error: lookups return `Option` instead.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing file could not be opened or is not a usable database.
    #[error("database connection failed: {0}")]
    ConnectionFailure(rusqlite::Error),

    /// A uniqueness or not-null constraint rejected the write.
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    /// Any other SQL failure.
    #[error("database error: {0}")]
    Database(rusqlite::Error),

    /// An in-memory backend's lock was poisoned by a panicking writer.
    #[error("{0} lock poisoned")]
    LockPoisoned(&'static str),

    /// The backing file could not be removed during teardown.
    #[error("failed to remove database file: {0}")]
    Teardown(#[from] std::io::Error),
}

impl StoreError {
    /// Returns `true` for [`StoreError::ConstraintViolation`].
    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, StoreError::ConstraintViolation(_))
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match err.sqlite_error_code() {
            Some(ErrorCode::ConstraintViolation) => StoreError::ConstraintViolation(err.to_string()),
            Some(
                ErrorCode::CannotOpen
                | ErrorCode::NotADatabase
                | ErrorCode::DatabaseCorrupt
                | ErrorCode::SystemIoFailure,
            ) => StoreError::ConnectionFailure(err),
            _ => StoreError::Database(err),
        }
    }
}
