use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::TransitionError;

/// The kinds of objects that can receive votes.
///
/// Submissions and comments share one votes table, so the kind is stored
/// next to the id as an explicit discriminant.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum VotableKind {
    Submission,
    Comment,
}

impl VotableKind {
    pub fn as_str(self) -> &'static str {
        match self {
            VotableKind::Submission => "submission",
            VotableKind::Comment => "comment",
        }
    }

    /// Discriminant used in the `votes.votable_kind` column.
    pub fn as_i16(self) -> i16 {
        match self {
            VotableKind::Submission => 0,
            VotableKind::Comment => 1,
        }
    }

    pub fn from_i16(value: i16) -> Option<Self> {
        match value {
            0 => Some(VotableKind::Submission),
            1 => Some(VotableKind::Comment),
            _ => None,
        }
    }
}

impl fmt::Display for VotableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VotableKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "submission" => Ok(VotableKind::Submission),
            "comment" => Ok(VotableKind::Comment),
            other => Err(format!("unknown votable kind: {other}")),
        }
    }
}

/// A resolved reference to one submission or comment.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VotableRef {
    pub kind: VotableKind,
    pub id: i64,
}

impl VotableRef {
    pub fn submission(id: i64) -> Self {
        Self { kind: VotableKind::Submission, id }
    }

    pub fn comment(id: i64) -> Self {
        Self { kind: VotableKind::Comment, id }
    }

    /// Decodes a reference from its stored `(votable_kind, votable_id)` pair.
    pub fn from_stored(kind: i16, id: i64) -> Result<Self, TransitionError> {
        VotableKind::from_i16(kind)
            .map(|kind| Self { kind, id })
            .ok_or(TransitionError::UnknownVotableKind(kind))
    }
}

impl fmt::Display for VotableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}
