use std::collections::BTreeMap;

use serde_json::Value;
use vote_ledger_core::VoteLedger;
use vote_ledger_shared::types::{Identity, UserId};

use crate::errors::AppError;

/// Collects the caller's votes in a thread keyed by `"<kind>:<id>"`.
///
/// Cancelled votes are included with value `0`. Anonymous callers get `{}`.
pub async fn run(
    ledger: &VoteLedger,
    user: Option<i64>,
    submission_id: i64,
) -> Result<Value, AppError> {
    let identity = Identity::from(user.map(UserId));

    let votes: BTreeMap<String, i16> = ledger
        .thread_votes(identity, submission_id)
        .await?
        .into_iter()
        .map(|vote| (vote.votable.to_string(), vote.value.as_i16()))
        .collect();

    Ok(serde_json::to_value(votes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;
    use vote_ledger_repository::{InMemoryVotesRepository, VotesRepository};
    use vote_ledger_shared::types::VotableCounters;

    #[tokio::test]
    async fn test_thread_votes_keyed_by_votable() {
        let repository = Arc::new(InMemoryVotesRepository::new());
        let submission = repository
            .insert_submission(VotableCounters::default())
            .await
            .unwrap();
        let comment = repository
            .insert_comment(submission, VotableCounters::default())
            .await
            .unwrap();
        let other = repository
            .insert_submission(VotableCounters::default())
            .await
            .unwrap();
        let ledger = VoteLedger::new(repository.clone());
        let user = Identity::Authenticated(UserId(3));

        ledger.cast_vote(user, submission, 1).await.unwrap();
        ledger.cast_vote(user, comment, -1).await.unwrap();
        ledger.cast_vote(user, comment, -1).await.unwrap();
        ledger.cast_vote(user, other, 1).await.unwrap();

        let votes = run(&ledger, Some(3), submission.id).await.unwrap();

        assert_eq!(
            votes,
            json!({
                format!("submission:{}", submission.id): 1,
                format!("comment:{}", comment.id): 0,
            })
        );
    }

    #[tokio::test]
    async fn test_thread_votes_anonymous_is_empty() {
        let repository = Arc::new(InMemoryVotesRepository::new());
        let ledger = VoteLedger::new(repository);

        let votes = run(&ledger, None, 1).await.unwrap();

        assert_eq!(votes, json!({}));
    }
}
