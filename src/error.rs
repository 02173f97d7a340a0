//! Error types for the BiblioTrack data-access layer.
//!
//! A missing row is never an error here: lookups return `Option` and
//! mutations report whether a row was touched. Everything in this enum is a
//! genuine failure the caller may want to branch on.

use rusqlite::ErrorCode;
use thiserror::Error;

pub type LibraryResult<T> = Result<T, LibraryError>;

#[derive(Error, Debug)]
pub enum LibraryError {
    /// The database file could not be opened or configured.
    #[error("Connection failed: {0}")]
    Connection(#[source] rusqlite::Error),

    /// Duplicate primary key, foreign-key mismatch, CHECK failure and friends.
    #[error("Constraint violation: {0}")]
    Constraint(#[source] rusqlite::Error),

    #[error("Database error: {0}")]
    Database(#[source] rusqlite::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not locate home directory")]
    HomeDirectory,
}

impl From<rusqlite::Error> for LibraryError {
    fn from(err: rusqlite::Error) -> Self {
        match err.sqlite_error_code() {
            Some(ErrorCode::ConstraintViolation) => LibraryError::Constraint(err),
            Some(ErrorCode::CannotOpen | ErrorCode::NotADatabase) => {
                LibraryError::Connection(err)
            }
            _ => LibraryError::Database(err),
        }
    }
}

impl LibraryError {
    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, LibraryError::Constraint(_))
    }

    pub fn is_connection_failure(&self) -> bool {
        matches!(self, LibraryError::Connection(_))
    }
}
