use rand::Rng;
use serde::Serialize;
use tracing::info;
use vote_ledger_repository::VotesRepository;
use vote_ledger_shared::types::{VotableCounters, VotableRef};

use crate::errors::AppError;

const MAX_SUBMISSION_UPS: i64 = 1000;
const MAX_REPLY_DEPTH: usize = 5;

/// Totals of what a seed run created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeedSummary {
    pub submissions: usize,
    pub comments: usize,
}

/// Creates `threads` submissions with `root_comments` root comments each.
///
/// Submissions start with random tallies where `downs = ups / 2`. Each root
/// comment grows reply chains while a coin flip keeps coming up heads, and a
/// chain stops at depth five.
pub async fn run<R: Rng + Send>(
    repository: &dyn VotesRepository,
    threads: usize,
    root_comments: usize,
    rng: &mut R,
) -> Result<SeedSummary, AppError> {
    let mut summary = SeedSummary::default();

    for _ in 0..threads {
        let ups = rng.gen_range(0..=MAX_SUBMISSION_UPS);
        let submission = repository
            .insert_submission(VotableCounters::from_totals(ups, ups / 2))
            .await?;
        summary.submissions += 1;

        for _ in 0..root_comments {
            let root = repository
                .insert_comment(submission, VotableCounters::default())
                .await?;
            summary.comments += 1;

            while rng.gen_bool(0.5) {
                summary.comments += add_reply_chain(repository, root, rng).await?;
            }
        }
    }

    info!(
        submissions = summary.submissions,
        comments = summary.comments,
        "Seed data created"
    );
    Ok(summary)
}

/// Adds replies under `parent`, each one nested in the previous, until a coin
/// flip fails or the depth limit is reached. Returns the number of replies.
async fn add_reply_chain<R: Rng + Send>(
    repository: &dyn VotesRepository,
    parent: VotableRef,
    rng: &mut R,
) -> Result<usize, AppError> {
    let mut parent = parent;
    let mut created = 0;

    for _ in 0..MAX_REPLY_DEPTH {
        parent = repository
            .insert_comment(parent, VotableCounters::default())
            .await?;
        created += 1;
        if !rng.gen_bool(0.5) {
            break;
        }
    }

    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use vote_ledger_repository::InMemoryVotesRepository;
    use vote_ledger_shared::types::VotableKind;

    #[tokio::test]
    async fn test_seed_creates_consistent_submissions() {
        let repository = InMemoryVotesRepository::new();
        let mut rng = StdRng::seed_from_u64(42);

        let summary = run(&repository, 4, 3, &mut rng).await.unwrap();

        assert_eq!(summary.submissions, 4);
        assert!(summary.comments >= 12);

        for id in 1..=4 {
            let counters = repository
                .get_counters(VotableRef::submission(id))
                .await
                .unwrap()
                .unwrap();
            assert!(counters.ups <= MAX_SUBMISSION_UPS);
            assert_eq!(counters.downs, counters.ups / 2);
            assert_eq!(counters.score, counters.ups - counters.downs);
        }
    }

    #[tokio::test]
    async fn test_seed_comments_start_at_zero() {
        let repository = InMemoryVotesRepository::new();
        let mut rng = StdRng::seed_from_u64(7);

        let summary = run(&repository, 1, 2, &mut rng).await.unwrap();

        for id in 1..=summary.comments as i64 {
            let counters = repository
                .get_counters(VotableRef {
                    kind: VotableKind::Comment,
                    id,
                })
                .await
                .unwrap()
                .unwrap();
            assert_eq!(counters, VotableCounters::default());
        }
    }

    #[tokio::test]
    async fn test_seed_nothing() {
        let repository = InMemoryVotesRepository::new();
        let mut rng = StdRng::seed_from_u64(1);

        let summary = run(&repository, 0, 3, &mut rng).await.unwrap();

        assert_eq!(summary, SeedSummary::default());
    }
}
