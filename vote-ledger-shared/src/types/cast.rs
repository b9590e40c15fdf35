use serde::{Deserialize, Serialize};

use super::{
    Ballot, TransitionError, UserId, UserVote, VotableCounters, VotableRef, VoteChangeset,
    VoteTransition, transition_from_stored,
};

/// Result of a successful cast.
///
/// `applied_delta` is the change in score, reported so a client can adjust
/// its display before the next reload.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CastVoteOutcome {
    #[serde(rename = "voteDiff")]
    pub applied_delta: i64,
}

/// Everything one cast writes, computed before anything is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedVote {
    pub vote: UserVote,
    pub counters: VotableCounters,
    pub transition: VoteTransition,
    /// `true` when no vote record existed for this pair before the cast.
    pub created: bool,
}

impl AppliedVote {
    /// Plans a cast from the state read under the votable's lock.
    ///
    /// # Arguments
    ///
    /// * `user_id` - The voting user
    /// * `votable` - The votable being voted on
    /// * `thread_id` - The submission the votable belongs to
    /// * `stored_value` - The raw stored vote value for this pair, if a record exists
    /// * `counters` - The votable's current counters
    /// * `ballot` - The requested value
    ///
    /// # Returns
    ///
    /// * `Ok(AppliedVote)` - The vote to upsert and the counters to store
    /// * `Err(TransitionError)` - The stored state is corrupt
    pub fn plan(
        user_id: UserId,
        votable: VotableRef,
        thread_id: i64,
        stored_value: Option<i16>,
        counters: VotableCounters,
        ballot: Ballot,
    ) -> Result<Self, TransitionError> {
        let transition = transition_from_stored(stored_value, ballot)?;
        let counters = counters.apply(transition.delta)?;

        Ok(Self {
            vote: UserVote {
                user_id,
                votable,
                thread_id,
                value: transition.new_value,
            },
            counters,
            transition,
            created: stored_value.is_none(),
        })
    }

    pub fn changeset(&self) -> VoteChangeset<'_> {
        VoteChangeset {
            vote: &self.vote,
            counters: &self.counters,
        }
    }

    pub fn outcome(&self) -> CastVoteOutcome {
        CastVoteOutcome {
            applied_delta: self.transition.delta.score,
        }
    }
}
