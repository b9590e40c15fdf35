//! In-memory implementation of the votes repository.
//!
//! Casts on the same votable are serialized by a per-votable async mutex whose
//! acquisition is bounded by a timeout. The vote and counter writes happen in
//! one critical section on the shared state after every fallible step, so a
//! cast that is dropped or fails before that point leaves nothing behind.
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, instrument};
use vote_ledger_shared::types::{
    AppliedVote, Ballot, UserId, UserVote, VotableCounters, VotableRef,
};

use crate::{VotesRepository, VotesRepositoryError};

const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone)]
struct StoredVotable {
    thread_id: i64,
    counters: VotableCounters,
}

#[derive(Debug, Default)]
struct MemoryState {
    votables: HashMap<VotableRef, StoredVotable>,
    /// Raw stored values, keyed by (user, votable). Kept as `i16` like the
    /// database column so corrupt values surface the same way.
    votes: HashMap<(UserId, VotableRef), (i64, i16)>,
    next_submission_id: i64,
    next_comment_id: i64,
}

/// In-memory votes repository, used by tests and local runs without a database.
pub struct InMemoryVotesRepository {
    state: Mutex<MemoryState>,
    locks: Mutex<HashMap<VotableRef, Arc<Mutex<()>>>>,
    lock_timeout: Duration,
}

impl Default for InMemoryVotesRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryVotesRepository {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MemoryState::default()),
            locks: Mutex::new(HashMap::new()),
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }

    /// Sets how long a cast waits for a votable's lock before failing with `LockTimeout`.
    pub fn with_lock_timeout(mut self, lock_timeout: Duration) -> Self {
        self.lock_timeout = lock_timeout;
        self
    }

    /// Overwrites a stored vote value without touching counters.
    ///
    /// Only useful to simulate corrupt data in tests.
    #[cfg(any(test, feature = "test-util"))]
    pub async fn overwrite_raw_vote(&self, user_id: UserId, votable: VotableRef, thread_id: i64, value: i16) {
        self.state.lock().await.votes.insert((user_id, votable), (thread_id, value));
    }

    /// Overwrites a votable's counters without touching votes.
    ///
    /// Only useful to simulate corrupt data in tests.
    #[cfg(any(test, feature = "test-util"))]
    pub async fn overwrite_counters(&self, votable: VotableRef, counters: VotableCounters) {
        if let Some(stored) = self.state.lock().await.votables.get_mut(&votable) {
            stored.counters = counters;
        }
    }

    async fn votable_lock(&self, votable: VotableRef) -> Arc<Mutex<()>> {
        self.locks
            .lock()
            .await
            .entry(votable)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    async fn acquire(&self, votable: VotableRef) -> Result<OwnedMutexGuard<()>, VotesRepositoryError> {
        let lock = self.votable_lock(votable).await;
        tokio::time::timeout(self.lock_timeout, lock.lock_owned())
            .await
            .map_err(|_| {
                VotesRepositoryError::LockTimeout(format!(
                    "{votable} stayed locked for more than {:?}",
                    self.lock_timeout
                ))
            })
    }

    fn user_vote(user_id: UserId, votable: VotableRef, thread_id: i64, value: i16) -> Result<UserVote, VotesRepositoryError> {
        Ok(UserVote {
            user_id,
            votable,
            thread_id,
            value: value.try_into()?,
        })
    }
}

#[async_trait]
impl VotesRepository for InMemoryVotesRepository {
    #[instrument(skip(self))]
    async fn apply_vote(
        &self,
        user_id: UserId,
        votable: VotableRef,
        ballot: Ballot,
    ) -> Result<AppliedVote, VotesRepositoryError> {
        let _guard = self.acquire(votable).await?;

        let (stored, stored_value) = {
            let state = self.state.lock().await;
            let stored = state
                .votables
                .get(&votable)
                .cloned()
                .ok_or(VotesRepositoryError::VotableNotFound(votable))?;
            let stored_value = state.votes.get(&(user_id, votable)).map(|(_, value)| *value);
            (stored, stored_value)
        };

        let applied = AppliedVote::plan(
            user_id,
            votable,
            stored.thread_id,
            stored_value,
            stored.counters,
            ballot,
        )?;

        {
            let mut state = self.state.lock().await;
            let changeset = applied.changeset();
            state.votes.insert(
                (user_id, votable),
                (changeset.vote.thread_id, changeset.vote.value.as_i16()),
            );
            if let Some(target) = state.votables.get_mut(&votable) {
                target.counters = *changeset.counters;
            }
        }

        debug!(
            new_value = applied.vote.value.as_i16(),
            score_delta = applied.transition.delta.score,
            "Vote committed"
        );
        Ok(applied)
    }

    async fn get_user_vote(
        &self,
        user_id: UserId,
        votable: VotableRef,
    ) -> Result<Option<UserVote>, VotesRepositoryError> {
        let state = self.state.lock().await;
        state
            .votes
            .get(&(user_id, votable))
            .map(|(thread_id, value)| Self::user_vote(user_id, votable, *thread_id, *value))
            .transpose()
    }

    async fn get_counters(
        &self,
        votable: VotableRef,
    ) -> Result<Option<VotableCounters>, VotesRepositoryError> {
        let state = self.state.lock().await;
        Ok(state.votables.get(&votable).map(|stored| stored.counters))
    }

    async fn get_thread_votes(
        &self,
        user_id: UserId,
        submission_id: i64,
    ) -> Result<Vec<UserVote>, VotesRepositoryError> {
        let state = self.state.lock().await;
        let mut votes = state
            .votes
            .iter()
            .filter(|((voter, _), (thread_id, _))| *voter == user_id && *thread_id == submission_id)
            .map(|((_, votable), (thread_id, value))| Self::user_vote(user_id, *votable, *thread_id, *value))
            .collect::<Result<Vec<_>, _>>()?;
        votes.sort_by_key(|vote| vote.votable);
        Ok(votes)
    }

    async fn insert_submission(
        &self,
        counters: VotableCounters,
    ) -> Result<VotableRef, VotesRepositoryError> {
        counters.validate()?;

        let mut state = self.state.lock().await;
        state.next_submission_id += 1;
        let votable = VotableRef::submission(state.next_submission_id);
        state.votables.insert(
            votable,
            StoredVotable {
                thread_id: votable.id,
                counters,
            },
        );
        Ok(votable)
    }

    async fn insert_comment(
        &self,
        parent: VotableRef,
        counters: VotableCounters,
    ) -> Result<VotableRef, VotesRepositoryError> {
        counters.validate()?;

        let mut state = self.state.lock().await;
        let thread_id = state
            .votables
            .get(&parent)
            .map(|stored| stored.thread_id)
            .ok_or(VotesRepositoryError::VotableNotFound(parent))?;

        state.next_comment_id += 1;
        let votable = VotableRef::comment(state.next_comment_id);
        state.votables.insert(votable, StoredVotable { thread_id, counters });
        Ok(votable)
    }

    async fn check_tables_created(&self) -> Result<bool, VotesRepositoryError> {
        Ok(true)
    }
}
