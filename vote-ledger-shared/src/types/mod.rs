mod cast;
mod changeset;
mod counters;
mod identity;
mod transition;
mod user_vote;
mod votable;
mod vote_value;

pub use cast::{AppliedVote, CastVoteOutcome};
pub use changeset::VoteChangeset;
pub use counters::VotableCounters;
pub use identity::{Identity, UserId};
pub use transition::{CounterDelta, TransitionError, VoteTransition, transition, transition_from_stored};
pub use user_vote::UserVote;
pub use votable::{VotableKind, VotableRef};
pub use vote_value::{Ballot, InvalidBallot, VoteValue};
