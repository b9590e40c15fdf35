//! The vote state machine.
//!
//! Given the value a user already holds on a votable (if any) and the ballot
//! they submit, [`transition`] returns the value to store and the change to
//! apply to the votable's counters. It performs no I/O, so every storage
//! backend computes counters the same way.
use thiserror::Error;

use super::{Ballot, VoteValue};

/// Change applied to a votable's counters by one cast.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterDelta {
    pub ups: i64,
    pub downs: i64,
    pub score: i64,
}

/// Outcome of the state machine for one cast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteTransition {
    pub new_value: VoteValue,
    pub delta: CounterDelta,
}

/// Integrity failures detected while computing a transition.
///
/// None of these can be produced by valid input; they indicate corrupt stored state.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("stored vote value {0} is outside -1..=1")]
    UnknownVoteValue(i16),

    #[error("stored votable kind {0} is unknown")]
    UnknownVotableKind(i16),

    #[error("counters would become negative (ups={ups}, downs={downs})")]
    NegativeCounter { ups: i64, downs: i64 },

    #[error("score {score} does not equal ups {ups} minus downs {downs}")]
    InconsistentScore { ups: i64, downs: i64, score: i64 },

    #[error("counter overflow")]
    CounterOverflow,
}

/// Computes the new vote value and counter change for a cast.
///
/// A missing vote and a cancelled vote behave identically. Submitting the
/// value already held cancels it; submitting the opposite value flips it.
pub fn transition(old: Option<VoteValue>, ballot: Ballot) -> VoteTransition {
    let (new_value, ups, downs) = match (old.unwrap_or(VoteValue::Cancelled), ballot) {
        (VoteValue::Cancelled, Ballot::Up) => (VoteValue::Up, 1, 0),
        (VoteValue::Cancelled, Ballot::Down) => (VoteValue::Down, 0, 1),
        (VoteValue::Up, Ballot::Up) => (VoteValue::Cancelled, -1, 0),
        (VoteValue::Down, Ballot::Down) => (VoteValue::Cancelled, 0, -1),
        (VoteValue::Down, Ballot::Up) => (VoteValue::Up, 1, -1),
        (VoteValue::Up, Ballot::Down) => (VoteValue::Down, -1, 1),
    };

    VoteTransition {
        new_value,
        delta: CounterDelta { ups, downs, score: ups - downs },
    }
}

/// Like [`transition`], but starting from a raw stored value.
///
/// Stored values outside the vote domain are reported instead of coerced.
pub fn transition_from_stored(old: Option<i16>, ballot: Ballot) -> Result<VoteTransition, TransitionError> {
    let old = old.map(VoteValue::try_from).transpose()?;
    Ok(transition(old, ballot))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delta(ups: i64, downs: i64, score: i64) -> CounterDelta {
        CounterDelta { ups, downs, score }
    }

    #[test]
    fn test_first_vote() {
        assert_eq!(
            transition(None, Ballot::Up),
            VoteTransition { new_value: VoteValue::Up, delta: delta(1, 0, 1) }
        );
        assert_eq!(
            transition(None, Ballot::Down),
            VoteTransition { new_value: VoteValue::Down, delta: delta(0, 1, -1) }
        );
    }

    #[test]
    fn test_same_value_cancels() {
        assert_eq!(
            transition(Some(VoteValue::Up), Ballot::Up),
            VoteTransition { new_value: VoteValue::Cancelled, delta: delta(-1, 0, -1) }
        );
        assert_eq!(
            transition(Some(VoteValue::Down), Ballot::Down),
            VoteTransition { new_value: VoteValue::Cancelled, delta: delta(0, -1, 1) }
        );
    }

    #[test]
    fn test_opposite_value_flips() {
        assert_eq!(
            transition(Some(VoteValue::Down), Ballot::Up),
            VoteTransition { new_value: VoteValue::Up, delta: delta(1, -1, 2) }
        );
        assert_eq!(
            transition(Some(VoteValue::Up), Ballot::Down),
            VoteTransition { new_value: VoteValue::Down, delta: delta(-1, 1, -2) }
        );
    }

    #[test]
    fn test_cancelled_behaves_like_no_vote() {
        for ballot in [Ballot::Up, Ballot::Down] {
            assert_eq!(transition(Some(VoteValue::Cancelled), ballot), transition(None, ballot));
        }
    }

    #[test]
    fn test_score_delta_is_ups_minus_downs() {
        let olds = [None, Some(VoteValue::Up), Some(VoteValue::Down), Some(VoteValue::Cancelled)];
        for old in olds {
            for ballot in [Ballot::Up, Ballot::Down] {
                let t = transition(old, ballot);
                assert_eq!(t.delta.score, t.delta.ups - t.delta.downs);
            }
        }
    }

    #[test]
    fn test_unknown_stored_value_is_reported() {
        assert_eq!(
            transition_from_stored(Some(3), Ballot::Up),
            Err(TransitionError::UnknownVoteValue(3))
        );
        assert_eq!(
            transition_from_stored(Some(-1), Ballot::Up).unwrap().delta,
            delta(1, -1, 2)
        );
    }
}
