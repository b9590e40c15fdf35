use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::TransitionError;

/// The stored stance of one user on one votable.
///
/// `Cancelled` is kept as a real value instead of deleting the record, so a
/// cancelled vote and a vote that was never cast resolve to the same transition.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(into = "i16", try_from = "i16")]
#[repr(i16)]
pub enum VoteValue {
    /// Indicates a downvote.
    Down = -1,
    /// Indicates a vote that was cast and later withdrawn.
    Cancelled = 0,
    /// Indicates an upvote.
    Up = 1,
}

impl VoteValue {
    pub fn as_i16(self) -> i16 {
        self as i16
    }
}

impl From<VoteValue> for i16 {
    fn from(value: VoteValue) -> Self {
        value.as_i16()
    }
}

impl TryFrom<i16> for VoteValue {
    type Error = TransitionError;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(VoteValue::Down),
            0 => Ok(VoteValue::Cancelled),
            1 => Ok(VoteValue::Up),
            other => Err(TransitionError::UnknownVoteValue(other)),
        }
    }
}

impl From<Ballot> for VoteValue {
    fn from(ballot: Ballot) -> Self {
        match ballot {
            Ballot::Up => VoteValue::Up,
            Ballot::Down => VoteValue::Down,
        }
    }
}

/// The value a user asks to cast.
///
/// Only up and down can be requested. Re-submitting the value already held
/// cancels the vote.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Ballot {
    Up,
    Down,
}

impl Ballot {
    pub fn as_i64(self) -> i64 {
        match self {
            Ballot::Up => 1,
            Ballot::Down => -1,
        }
    }
}

/// Returned when a requested vote value is not exactly `1` or `-1`.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("vote value must be 1 or -1, got {0}")]
pub struct InvalidBallot(pub i64);

impl TryFrom<i64> for Ballot {
    type Error = InvalidBallot;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Ballot::Up),
            -1 => Ok(Ballot::Down),
            other => Err(InvalidBallot(other)),
        }
    }
}
