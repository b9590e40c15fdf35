use serde_json::{Value, json};
use vote_ledger_core::{VoteLedger, VoteRequest};
use vote_ledger_shared::types::{Identity, UserId};

use crate::errors::AppError;

/// Parses the raw fields and casts the vote.
///
/// The printed document mirrors the vote endpoint response:
/// `{"error": null, "voteDiff": n}`.
pub async fn run(
    ledger: &VoteLedger,
    user: Option<i64>,
    what: &str,
    what_id: &str,
    value: &str,
) -> Result<Value, AppError> {
    let request = VoteRequest::parse(Some(what), Some(what_id), Some(value))?;
    let identity = Identity::from(user.map(UserId));

    let outcome = ledger.cast_request(identity, &request).await?;

    let mut response = serde_json::to_value(outcome)?;
    if let Value::Object(fields) = &mut response {
        fields.insert("error".to_string(), Value::Null);
    }
    Ok(response)
}

/// Error document for a failed cast, in the same shape as a successful one.
pub fn error_response(error: &AppError) -> Value {
    json!({ "error": error.to_string(), "voteDiff": Value::Null })
}
