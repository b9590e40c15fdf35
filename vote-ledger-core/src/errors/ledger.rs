//! Error types for the vote ledger.
//! Defines the errors surfaced to callers of `VoteLedger`.
use thiserror::Error;
use tracing::error;
use vote_ledger_repository::VotesRepositoryError;
use vote_ledger_shared::types::VotableRef;

/// Represents errors that can occur while casting or reading votes.
///
/// None of these are retried by the ledger once surfaced. Only storage
/// contention is retried internally, and it becomes `Unavailable` when the
/// retry budget runs out.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Unauthorized: an authenticated user is required")]
    Unauthorized,

    #[error("Not found: {0}")]
    NotFound(VotableRef),

    #[error("Invalid argument: vote value must be 1 or -1, got {0}")]
    InvalidArgument(i64),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Unavailable: storage stayed contended after {attempts} attempts")]
    Unavailable { attempts: u32 },

    #[error("Repository error: {0}")]
    Repository(#[source] VotesRepositoryError),
}

impl From<VotesRepositoryError> for LedgerError {
    fn from(error: VotesRepositoryError) -> Self {
        match error {
            VotesRepositoryError::VotableNotFound(votable) => LedgerError::NotFound(votable),
            VotesRepositoryError::InvalidTransition(transition) => {
                error!(error = %transition, "Stored vote state failed integrity checks");
                LedgerError::InvalidState(transition.to_string())
            }
            VotesRepositoryError::LockTimeout(_) => LedgerError::Unavailable { attempts: 1 },
            other => LedgerError::Repository(other),
        }
    }
}
