//! This module defines the `VoteLedger`, the entry point for casting votes.
//!
//! The ledger checks the caller and the requested value, then delegates the
//! atomic read-compute-write to a `VotesRepository`. Contention reported by
//! the repository is retried with exponential backoff up to the configured
//! budget; every other failure is surfaced as is.
use std::sync::Arc;

use tokio_retry::RetryIf;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{error, info, instrument, warn};
use vote_ledger_repository::{VotesRepository, VotesRepositoryError};
use vote_ledger_shared::types::{
    AppliedVote, Ballot, CastVoteOutcome, Identity, UserId, UserVote, VotableCounters, VotableRef,
};

use crate::config::LedgerConfig;
use crate::errors::LedgerError;
use crate::request::VoteRequest;

/// `VoteLedger` applies votes and keeps votable counters consistent.
///
/// It holds an `Arc<dyn VotesRepository>`, so one ledger can be shared by
/// every request handler.
pub struct VoteLedger {
    repository: Arc<dyn VotesRepository>,
    config: LedgerConfig,
}

impl VoteLedger {
    /// Creates a new `VoteLedger` with the default retry configuration.
    ///
    /// # Arguments
    ///
    /// * `repository` - The storage backend votes are applied to
    pub fn new(repository: Arc<dyn VotesRepository>) -> Self {
        Self::with_config(repository, LedgerConfig::default())
    }

    /// Creates a new `VoteLedger` with a custom configuration.
    pub fn with_config(repository: Arc<dyn VotesRepository>, config: LedgerConfig) -> Self {
        Self { repository, config }
    }

    /// Casts a vote and returns the resulting change in score.
    ///
    /// Submitting the value the user already holds cancels the vote;
    /// submitting the opposite value flips it.
    ///
    /// # Arguments
    ///
    /// * `identity` - The caller, as resolved by the auth layer
    /// * `votable` - The submission or comment being voted on
    /// * `desired_value` - The requested value, `1` or `-1`
    ///
    /// # Returns
    ///
    /// * `Ok(CastVoteOutcome)` - The score delta of this cast
    /// * `Err(LedgerError::Unauthorized)` - The caller is anonymous
    /// * `Err(LedgerError::InvalidArgument)` - `desired_value` is not `1` or `-1`
    /// * `Err(LedgerError::NotFound)` - The votable does not exist
    /// * `Err(LedgerError::InvalidState)` - Stored state is corrupt
    /// * `Err(LedgerError::Unavailable)` - Contention outlasted the retry budget
    #[instrument(skip(self))]
    pub async fn cast_vote(
        &self,
        identity: Identity,
        votable: VotableRef,
        desired_value: i64,
    ) -> Result<CastVoteOutcome, LedgerError> {
        let user_id = identity.user_id().ok_or(LedgerError::Unauthorized)?;
        let ballot = Ballot::try_from(desired_value)
            .map_err(|invalid| LedgerError::InvalidArgument(invalid.0))?;

        let applied = self.apply_with_retry(user_id, votable, ballot).await?;

        info!(
            user_id = %user_id,
            votable = %votable,
            new_value = applied.vote.value.as_i16(),
            applied_delta = applied.transition.delta.score,
            created = applied.created,
            "Vote cast"
        );
        Ok(applied.outcome())
    }

    /// Casts a vote from a request parsed at the boundary.
    pub async fn cast_request(
        &self,
        identity: Identity,
        request: &VoteRequest,
    ) -> Result<CastVoteOutcome, LedgerError> {
        self.cast_vote(identity, request.votable, request.ballot.as_i64())
            .await
    }

    /// Retrieves the current counters of a votable.
    pub async fn counters(&self, votable: VotableRef) -> Result<VotableCounters, LedgerError> {
        self.repository
            .get_counters(votable)
            .await?
            .ok_or(LedgerError::NotFound(votable))
    }

    /// Retrieves the vote the caller holds on a votable, if any.
    pub async fn find_vote(
        &self,
        identity: Identity,
        votable: VotableRef,
    ) -> Result<Option<UserVote>, LedgerError> {
        let user_id = identity.user_id().ok_or(LedgerError::Unauthorized)?;
        Ok(self.repository.get_user_vote(user_id, votable).await?)
    }

    /// Retrieves every vote the caller holds in a thread.
    ///
    /// Anonymous callers have no votes, so they get an empty list rather than an error.
    pub async fn thread_votes(
        &self,
        identity: Identity,
        submission_id: i64,
    ) -> Result<Vec<UserVote>, LedgerError> {
        match identity.user_id() {
            Some(user_id) => Ok(self
                .repository
                .get_thread_votes(user_id, submission_id)
                .await?),
            None => Ok(Vec::new()),
        }
    }

    async fn apply_with_retry(
        &self,
        user_id: UserId,
        votable: VotableRef,
        ballot: Ballot,
    ) -> Result<AppliedVote, LedgerError> {
        // 2^n * factor, so the first retry waits roughly the base delay.
        let factor = (self.config.retry_base_delay.as_millis() as u64 / 2).max(1);
        let strategy = ExponentialBackoff::from_millis(2)
            .factor(factor)
            .max_delay(self.config.retry_max_delay)
            .map(jitter)
            .take(self.config.max_retries);

        let mut attempts: u32 = 0;
        let result = RetryIf::spawn(
            strategy,
            || {
                attempts += 1;
                self.repository.apply_vote(user_id, votable, ballot)
            },
            |error: &VotesRepositoryError| {
                let transient = error.is_transient();
                if transient {
                    warn!(votable = %votable, error = %error, "Votable contended, retrying");
                }
                transient
            },
        )
        .await;

        result.map_err(|error| match error {
            VotesRepositoryError::LockTimeout(_) => {
                warn!(votable = %votable, attempts, "Giving up on contended votable");
                LedgerError::Unavailable { attempts }
            }
            VotesRepositoryError::InvalidTransition(transition) => {
                error!(
                    user_id = %user_id,
                    votable = %votable,
                    error = %transition,
                    "Vote ledger integrity violation"
                );
                LedgerError::InvalidState(transition.to_string())
            }
            other => other.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;
    use vote_ledger_repository::InMemoryVotesRepository;
    use vote_ledger_shared::types::{TransitionError, VoteValue};

    /// Repository that reports contention a fixed number of times before
    /// delegating to an in-memory repository.
    struct ContendedRepository {
        inner: InMemoryVotesRepository,
        failures_left: AtomicU32,
        calls: AtomicU32,
    }

    impl ContendedRepository {
        fn new(failures: u32) -> Self {
            Self {
                inner: InMemoryVotesRepository::new(),
                failures_left: AtomicU32::new(failures),
                calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait::async_trait]
    impl VotesRepository for ContendedRepository {
        async fn apply_vote(
            &self,
            user_id: UserId,
            votable: VotableRef,
            ballot: Ballot,
        ) -> Result<AppliedVote, VotesRepositoryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let contended = self
                .failures_left
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
                .is_ok();
            if contended {
                return Err(VotesRepositoryError::LockTimeout("busy".to_string()));
            }
            self.inner.apply_vote(user_id, votable, ballot).await
        }

        async fn get_user_vote(
            &self,
            user_id: UserId,
            votable: VotableRef,
        ) -> Result<Option<UserVote>, VotesRepositoryError> {
            self.inner.get_user_vote(user_id, votable).await
        }

        async fn get_counters(
            &self,
            votable: VotableRef,
        ) -> Result<Option<VotableCounters>, VotesRepositoryError> {
            self.inner.get_counters(votable).await
        }

        async fn get_thread_votes(
            &self,
            user_id: UserId,
            submission_id: i64,
        ) -> Result<Vec<UserVote>, VotesRepositoryError> {
            self.inner.get_thread_votes(user_id, submission_id).await
        }

        async fn insert_submission(
            &self,
            counters: VotableCounters,
        ) -> Result<VotableRef, VotesRepositoryError> {
            self.inner.insert_submission(counters).await
        }

        async fn insert_comment(
            &self,
            parent: VotableRef,
            counters: VotableCounters,
        ) -> Result<VotableRef, VotesRepositoryError> {
            self.inner.insert_comment(parent, counters).await
        }

        async fn check_tables_created(&self) -> Result<bool, VotesRepositoryError> {
            Ok(true)
        }
    }

    fn fast_retries(max_retries: usize) -> LedgerConfig {
        LedgerConfig::with_retries(max_retries, Duration::from_millis(1))
    }

    #[tokio::test]
    async fn test_contention_is_retried_until_success() {
        let repository = Arc::new(ContendedRepository::new(2));
        let submission = repository.insert_submission(VotableCounters::default()).await.unwrap();
        let ledger = VoteLedger::with_config(repository.clone(), fast_retries(3));

        let outcome = ledger
            .cast_vote(Identity::Authenticated(UserId(1)), submission, 1)
            .await
            .unwrap();

        assert_eq!(outcome.applied_delta, 1);
        assert_eq!(repository.calls.load(Ordering::SeqCst), 3);
        assert_eq!(
            ledger.counters(submission).await.unwrap(),
            VotableCounters { ups: 1, downs: 0, score: 1 }
        );
    }

    #[tokio::test]
    async fn test_contention_past_budget_is_unavailable() {
        let repository = Arc::new(ContendedRepository::new(10));
        let submission = repository.insert_submission(VotableCounters::default()).await.unwrap();
        let ledger = VoteLedger::with_config(repository.clone(), fast_retries(2));

        let result = ledger
            .cast_vote(Identity::Authenticated(UserId(1)), submission, -1)
            .await;

        assert!(matches!(result, Err(LedgerError::Unavailable { attempts: 3 })));
        assert_eq!(repository.calls.load(Ordering::SeqCst), 3);
        assert_eq!(ledger.counters(submission).await.unwrap(), VotableCounters::default());
    }

    #[tokio::test]
    async fn test_no_retry_surfaces_first_contention() {
        let repository = Arc::new(ContendedRepository::new(1));
        let submission = repository.insert_submission(VotableCounters::default()).await.unwrap();
        let ledger = VoteLedger::with_config(repository.clone(), LedgerConfig::no_retry());

        let result = ledger
            .cast_vote(Identity::Authenticated(UserId(1)), submission, 1)
            .await;

        assert!(matches!(result, Err(LedgerError::Unavailable { attempts: 1 })));
    }

    #[tokio::test]
    async fn test_not_found_is_not_retried() {
        let repository = Arc::new(ContendedRepository::new(0));
        let ledger = VoteLedger::with_config(repository.clone(), fast_retries(3));

        let result = ledger
            .cast_vote(Identity::Authenticated(UserId(1)), VotableRef::comment(8), 1)
            .await;

        assert!(matches!(result, Err(LedgerError::NotFound(v)) if v == VotableRef::comment(8)));
        assert_eq!(repository.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalid_argument_checked_before_storage() {
        let repository = Arc::new(ContendedRepository::new(0));
        let ledger = VoteLedger::new(repository.clone());

        for value in [0, 2, -2, i64::MAX] {
            let result = ledger
                .cast_vote(Identity::Authenticated(UserId(1)), VotableRef::submission(1), value)
                .await;
            assert!(matches!(result, Err(LedgerError::InvalidArgument(v)) if v == value));
        }
        assert_eq!(repository.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_corrupt_vote_is_invalid_state() {
        let repository = Arc::new(InMemoryVotesRepository::new());
        let submission = repository.insert_submission(VotableCounters::default()).await.unwrap();
        repository.overwrite_raw_vote(UserId(1), submission, submission.id, -5).await;
        let ledger = VoteLedger::new(repository.clone());

        let result = ledger
            .cast_vote(Identity::Authenticated(UserId(1)), submission, 1)
            .await;

        assert!(matches!(result, Err(LedgerError::InvalidState(_))));
        assert_eq!(ledger.counters(submission).await.unwrap(), VotableCounters::default());
    }

    #[tokio::test]
    async fn test_corrupt_counters_are_invalid_state() {
        let repository = Arc::new(InMemoryVotesRepository::new());
        let submission = repository.insert_submission(VotableCounters::default()).await.unwrap();
        repository
            .overwrite_counters(submission, VotableCounters { ups: 1, downs: 0, score: 3 })
            .await;
        let ledger = VoteLedger::new(repository.clone());

        let result = ledger
            .cast_vote(Identity::Authenticated(UserId(2)), submission, -1)
            .await;

        let expected = TransitionError::InconsistentScore { ups: 1, downs: 0, score: 3 }.to_string();
        assert!(matches!(result, Err(LedgerError::InvalidState(msg)) if msg == expected));
        assert!(ledger
            .find_vote(Identity::Authenticated(UserId(2)), submission)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_corrupt_vote_on_read_is_invalid_state() {
        let repository = Arc::new(InMemoryVotesRepository::new());
        let submission = repository.insert_submission(VotableCounters::default()).await.unwrap();
        repository.overwrite_raw_vote(UserId(4), submission, submission.id, 9).await;
        let ledger = VoteLedger::new(repository);
        let user = Identity::Authenticated(UserId(4));

        let expected = TransitionError::UnknownVoteValue(9).to_string();
        assert!(matches!(
            ledger.find_vote(user, submission).await,
            Err(LedgerError::InvalidState(msg)) if msg == expected
        ));
        assert!(matches!(
            ledger.thread_votes(user, submission.id).await,
            Err(LedgerError::InvalidState(msg)) if msg == expected
        ));
    }

    #[tokio::test]
    async fn test_anonymous_reads() {
        let repository = Arc::new(InMemoryVotesRepository::new());
        let submission = repository.insert_submission(VotableCounters::default()).await.unwrap();
        let ledger = VoteLedger::new(repository);

        ledger
            .cast_vote(Identity::Authenticated(UserId(1)), submission, 1)
            .await
            .unwrap();

        assert!(ledger.thread_votes(Identity::Anonymous, submission.id).await.unwrap().is_empty());
        assert!(matches!(
            ledger.find_vote(Identity::Anonymous, submission).await,
            Err(LedgerError::Unauthorized)
        ));

        let votes = ledger
            .thread_votes(Identity::Authenticated(UserId(1)), submission.id)
            .await
            .unwrap();
        assert_eq!(votes.len(), 1);
        assert_eq!(votes[0].value, VoteValue::Up);
    }

    #[tokio::test]
    async fn test_counters_of_missing_votable() {
        let ledger = VoteLedger::new(Arc::new(InMemoryVotesRepository::new()));
        assert!(matches!(
            ledger.counters(VotableRef::submission(1)).await,
            Err(LedgerError::NotFound(_))
        ));
    }
}
