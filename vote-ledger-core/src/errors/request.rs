//! Error types for parsing raw vote requests.
use thiserror::Error;

/// Represents a vote request rejected before it reaches the ledger.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RequestError {
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl RequestError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }
}
