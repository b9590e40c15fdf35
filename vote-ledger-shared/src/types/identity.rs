use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric identity of a registered user, as resolved by the auth layer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The caller of a ledger operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Identity {
    Anonymous,
    Authenticated(UserId),
}

impl Identity {
    pub fn user_id(&self) -> Option<UserId> {
        match self {
            Identity::Anonymous => None,
            Identity::Authenticated(user_id) => Some(*user_id),
        }
    }
}

impl From<Option<UserId>> for Identity {
    fn from(user_id: Option<UserId>) -> Self {
        user_id.map_or(Identity::Anonymous, Identity::Authenticated)
    }
}
