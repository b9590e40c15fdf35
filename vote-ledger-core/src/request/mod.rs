//! Parsing of raw vote requests.
//!
//! A request handler receives three form fields: `what` (`"submission"` or
//! `"comment"`), `what_id` (a positive id) and `vote_value` (`1` or `-1`).
//! Anything missing, non-numeric or out of domain is a bad request and never
//! reaches the ledger.
use vote_ledger_shared::types::{Ballot, VotableKind, VotableRef};

use crate::errors::RequestError;

/// A validated vote request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteRequest {
    pub votable: VotableRef,
    pub ballot: Ballot,
}

impl VoteRequest {
    /// Parses the raw request fields.
    ///
    /// # Arguments
    ///
    /// * `what` - The votable kind
    /// * `what_id` - The votable id as sent by the client
    /// * `vote_value` - The requested value as sent by the client
    ///
    /// # Returns
    ///
    /// * `Ok(VoteRequest)` - All fields are present and valid
    /// * `Err(RequestError::BadRequest)` - Otherwise
    pub fn parse(
        what: Option<&str>,
        what_id: Option<&str>,
        vote_value: Option<&str>,
    ) -> Result<Self, RequestError> {
        let ballot = vote_value
            .ok_or_else(|| RequestError::bad_request("vote_value is required"))?
            .trim()
            .parse::<i64>()
            .map_err(|e| RequestError::bad_request(format!("vote_value must be an integer: {e}")))
            .and_then(|value| {
                Ballot::try_from(value).map_err(|e| RequestError::bad_request(e.to_string()))
            })?;

        let kind = what
            .filter(|what| !what.is_empty())
            .ok_or_else(|| RequestError::bad_request("what is required"))?
            .parse::<VotableKind>()
            .map_err(RequestError::BadRequest)?;

        let id = what_id
            .ok_or_else(|| RequestError::bad_request("what_id is required"))?
            .trim()
            .parse::<i64>()
            .map_err(|e| RequestError::bad_request(format!("what_id must be an integer: {e}")))?;
        if id <= 0 {
            return Err(RequestError::bad_request("what_id must be positive"));
        }

        Ok(Self {
            votable: VotableRef { kind, id },
            ballot,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_request() {
        let request = VoteRequest::parse(Some("comment"), Some("12"), Some("-1")).unwrap();
        assert_eq!(request.votable, VotableRef::comment(12));
        assert_eq!(request.ballot, Ballot::Down);

        let request = VoteRequest::parse(Some("submission"), Some(" 3 "), Some("1")).unwrap();
        assert_eq!(request.votable, VotableRef::submission(3));
        assert_eq!(request.ballot, Ballot::Up);
    }

    #[test]
    fn test_parse_rejects_bad_vote_values() {
        for value in ["0", "2", "-2", "up", "1.0", ""] {
            let result = VoteRequest::parse(Some("submission"), Some("1"), Some(value));
            assert!(matches!(result, Err(RequestError::BadRequest(_))), "accepted {value:?}");
        }
        assert!(VoteRequest::parse(Some("submission"), Some("1"), None).is_err());
    }

    #[test]
    fn test_parse_rejects_unknown_kinds() {
        for what in [Some("user"), Some(""), Some("Submission"), None] {
            assert!(VoteRequest::parse(what, Some("1"), Some("1")).is_err());
        }
    }

    #[test]
    fn test_parse_rejects_bad_ids() {
        for what_id in [Some("0"), Some("-4"), Some("abc"), None] {
            assert!(VoteRequest::parse(Some("comment"), what_id, Some("1")).is_err());
        }
    }
}
