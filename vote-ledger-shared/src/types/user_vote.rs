use serde::{Deserialize, Serialize};
use crate::types::{UserId, VotableRef, VoteValue};

/// Represents a user's stored vote on a votable.
///
/// `(user_id, votable)` is unique. `thread_id` is the submission the votable
/// belongs to (the submission itself when voting on a submission).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserVote {
    pub user_id: UserId,
    pub votable: VotableRef,
    pub thread_id: i64,
    pub value: VoteValue,
}
