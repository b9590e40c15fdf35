use crate::types::{UserVote, VotableCounters};

/// Represents the writes produced by one cast, to be persisted together.
///
/// A `VoteChangeset` bundles the upserted vote and the new counters of the
/// votable it targets, so a repository can commit both in one transaction or neither.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteChangeset<'a> {
    pub vote: &'a UserVote,
    pub counters: &'a VotableCounters,
}
