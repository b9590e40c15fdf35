//! Error types for the votes repository.
//! Defines specific errors that can occur while reading or writing votes and counters.
use thiserror::Error;
use vote_ledger_shared::types::{TransitionError, VotableRef};

/// SQLSTATE codes that indicate contention rather than a hard failure:
/// lock_not_available, serialization_failure and deadlock_detected.
const CONTENTION_CODES: [&str; 3] = ["55P03", "40001", "40P01"];

/// Represents errors that can occur within the votes repository.
#[derive(Debug, Error)]
pub enum VotesRepositoryError {
    #[error("Database error: {0}")]
    DatabaseError(sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Votable not found: {0}")]
    VotableNotFound(VotableRef),

    #[error("Timed out waiting for lock: {0}")]
    LockTimeout(String),

    #[error("Invalid transition: {0}")]
    InvalidTransition(#[from] TransitionError),
}

impl VotesRepositoryError {
    /// Whether the operation may succeed if retried.
    pub fn is_transient(&self) -> bool {
        matches!(self, VotesRepositoryError::LockTimeout(_))
    }
}

impl From<sqlx::Error> for VotesRepositoryError {
    fn from(error: sqlx::Error) -> Self {
        let contention = error
            .as_database_error()
            .and_then(|db| db.code())
            .is_some_and(|code| CONTENTION_CODES.contains(&code.as_ref()));

        if contention {
            VotesRepositoryError::LockTimeout(error.to_string())
        } else {
            VotesRepositoryError::DatabaseError(error)
        }
    }
}
