//! This module defines the `VotesRepository` trait, the storage interface of
//! the vote ledger. It abstracts the atomic cast operation and the keyed
//! lookups the ledger and its callers need.
use vote_ledger_shared::types::{AppliedVote, Ballot, UserId, UserVote, VotableCounters, VotableRef};
use crate::errors::VotesRepositoryError;

/// A trait that defines the interface for interacting with votes and votable counters.
///
/// Implementors must make `apply_vote` atomic: the vote upsert and the counter
/// update are either both visible to later reads or neither is, and two casts
/// on the same votable never both read the pre-update counters.
#[async_trait::async_trait]
pub trait VotesRepository: Send + Sync {
    /// Applies one ballot by `user_id` to `votable`.
    ///
    /// Locks the votable, reads the existing vote and the current counters,
    /// plans the transition with [`AppliedVote::plan`], and persists the vote
    /// and the new counters together.
    ///
    /// # Arguments
    ///
    /// * `user_id` - The authenticated voter
    /// * `votable` - The submission or comment being voted on
    /// * `ballot` - The requested value
    ///
    /// # Returns
    ///
    /// * `Ok(AppliedVote)` - The persisted vote, counters and transition
    /// * `Err(VotesRepositoryError::VotableNotFound)` - The votable does not exist
    /// * `Err(VotesRepositoryError::LockTimeout)` - The votable stayed locked past the timeout
    /// * `Err(VotesRepositoryError::InvalidTransition)` - Stored state is corrupt
    async fn apply_vote(
        &self,
        user_id: UserId,
        votable: VotableRef,
        ballot: Ballot,
    ) -> Result<AppliedVote, VotesRepositoryError>;

    /// Retrieves the vote a user holds on a votable, if any.
    async fn get_user_vote(
        &self,
        user_id: UserId,
        votable: VotableRef,
    ) -> Result<Option<UserVote>, VotesRepositoryError>;

    /// Retrieves the current counters of a votable, or `None` if it does not exist.
    async fn get_counters(
        &self,
        votable: VotableRef,
    ) -> Result<Option<VotableCounters>, VotesRepositoryError>;

    /// Retrieves every vote `user_id` holds inside the thread of `submission_id`,
    /// including the vote on the submission itself.
    async fn get_thread_votes(
        &self,
        user_id: UserId,
        submission_id: i64,
    ) -> Result<Vec<UserVote>, VotesRepositoryError>;

    /// Creates a submission with the given starting counters.
    async fn insert_submission(
        &self,
        counters: VotableCounters,
    ) -> Result<VotableRef, VotesRepositoryError>;

    /// Creates a comment replying to `parent`, which is either the submission
    /// itself or another comment in the same thread.
    async fn insert_comment(
        &self,
        parent: VotableRef,
        counters: VotableCounters,
    ) -> Result<VotableRef, VotesRepositoryError>;

    /// Checks if the tables backing this repository exist.
    async fn check_tables_created(&self) -> Result<bool, VotesRepositoryError>;
}
