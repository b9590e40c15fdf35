//! PostgreSQL implementation of the votes repository.
//!
//! Every cast runs in one transaction that first locks the votable's row with
//! `SELECT ... FOR UPDATE`, so concurrent casts on the same votable are
//! serialized while casts on different votables proceed in parallel. The
//! wait for that lock is bounded by a transaction-local `lock_timeout`.
//!
//! ## Database Tables
//!
//! - `submissions`: Submissions with cached `ups`, `downs` and `score`
//! - `comments`: Comments with cached counters and their thread
//! - `votes`: One row per (user, votable), upserted on every cast
use std::time::Duration;

use async_trait::async_trait;
use sqlx::Row;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgRow;
use tracing::{debug, instrument};
use vote_ledger_shared::types::{
    AppliedVote, Ballot, UserId, UserVote, VotableCounters, VotableKind, VotableRef, VoteChangeset,
    VoteValue,
};

use crate::{VotesRepository, VotesRepositoryError};

/// Embedded schema migrations for the vote ledger tables.
pub static MIGRATOR: Migrator = sqlx::migrate!("./src/postgres/migrations");

const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(2);

/// PostgreSQL implementation of the votes repository.
///
/// Holds a connection pool and the lock timeout applied to every cast transaction.
pub struct PostgresVotesRepository {
    pool: sqlx::PgPool,
    lock_timeout: Duration,
}

impl PostgresVotesRepository {
    /// Creates a new PostgreSQL repository instance.
    ///
    /// # Arguments
    ///
    /// * `pool` - Configured PostgreSQL connection pool with required schema
    ///
    /// # Returns
    ///
    /// * `Ok(PostgresVotesRepository)` - Ready-to-use repository instance
    /// * `Err(VotesRepositoryError)` - Future validation errors (currently always succeeds)
    pub async fn new(pool: sqlx::PgPool) -> Result<Self, VotesRepositoryError> {
        Ok(Self {
            pool,
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        })
    }

    /// Sets how long a cast waits for a votable's row lock before failing
    /// with `LockTimeout`.
    pub fn with_lock_timeout(mut self, lock_timeout: Duration) -> Self {
        self.lock_timeout = lock_timeout;
        self
    }

    /// Applies the embedded migrations.
    pub async fn migrate(&self) -> Result<(), VotesRepositoryError> {
        MIGRATOR.run(&self.pool).await?;
        Ok(())
    }

    /// Locks the votable's row for the rest of the transaction and reads its
    /// counters and thread.
    ///
    /// # Returns
    ///
    /// * `Ok(Some((counters, thread_id)))` - The votable exists and is now locked
    /// * `Ok(None)` - No such votable
    async fn lock_votable_tx(
        &self,
        votable: VotableRef,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    ) -> Result<Option<(VotableCounters, i64)>, VotesRepositoryError> {
        let query = match votable.kind {
            VotableKind::Submission => {
                "SELECT ups, downs, score, id AS thread_id FROM submissions WHERE id = $1 FOR UPDATE"
            }
            VotableKind::Comment => {
                "SELECT ups, downs, score, submission_id AS thread_id FROM comments WHERE id = $1 FOR UPDATE"
            }
        };

        let row = sqlx::query(query)
            .bind(votable.id)
            .fetch_optional(&mut **tx)
            .await?;

        match row {
            Some(row) => Ok(Some((counters_from_row(&row)?, row.try_get("thread_id")?))),
            None => Ok(None),
        }
    }

    /// Reads the raw stored value of a vote within an active transaction.
    async fn get_vote_value_tx(
        &self,
        user_id: UserId,
        votable: VotableRef,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    ) -> Result<Option<i16>, VotesRepositoryError> {
        let value = sqlx::query_scalar::<_, i16>(
            r#"
            SELECT value FROM votes
            WHERE user_id = $1 AND votable_kind = $2 AND votable_id = $3
            "#,
        )
        .bind(user_id.0)
        .bind(votable.kind.as_i16())
        .bind(votable.id)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(value)
    }

    /// Persists the vote upsert and the counter update within an active transaction.
    ///
    /// Uses `ON CONFLICT DO UPDATE` on the (user_id, votable_kind, votable_id) key,
    /// so a cancelled vote keeps its row.
    async fn persist_changeset_tx(
        &self,
        changeset: &VoteChangeset<'_>,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    ) -> Result<(), VotesRepositoryError> {
        let vote = changeset.vote;

        sqlx::query(
            r#"
            INSERT INTO votes (user_id, votable_kind, votable_id, thread_id, value, voted_at)
            VALUES ($1, $2, $3, $4, $5, now())
            ON CONFLICT (user_id, votable_kind, votable_id)
            DO UPDATE SET
                value = EXCLUDED.value,
                voted_at = EXCLUDED.voted_at
            "#,
        )
        .bind(vote.user_id.0)
        .bind(vote.votable.kind.as_i16())
        .bind(vote.votable.id)
        .bind(vote.thread_id)
        .bind(vote.value.as_i16())
        .execute(&mut **tx)
        .await?;

        let update = match vote.votable.kind {
            VotableKind::Submission => {
                "UPDATE submissions SET ups = $2, downs = $3, score = $4 WHERE id = $1"
            }
            VotableKind::Comment => {
                "UPDATE comments SET ups = $2, downs = $3, score = $4 WHERE id = $1"
            }
        };

        sqlx::query(update)
            .bind(vote.votable.id)
            .bind(changeset.counters.ups)
            .bind(changeset.counters.downs)
            .bind(changeset.counters.score)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }
}

fn counters_from_row(row: &PgRow) -> Result<VotableCounters, VotesRepositoryError> {
    Ok(VotableCounters {
        ups: row.try_get("ups")?,
        downs: row.try_get("downs")?,
        score: row.try_get("score")?,
    })
}

fn user_vote_from_row(row: &PgRow) -> Result<UserVote, VotesRepositoryError> {
    let votable = VotableRef::from_stored(row.try_get("votable_kind")?, row.try_get("votable_id")?)?;
    let value = VoteValue::try_from(row.try_get::<i16, _>("value")?)?;

    Ok(UserVote {
        user_id: UserId(row.try_get("user_id")?),
        votable,
        thread_id: row.try_get("thread_id")?,
        value,
    })
}

#[async_trait]
impl VotesRepository for PostgresVotesRepository {
    #[instrument(skip(self))]
    async fn apply_vote(
        &self,
        user_id: UserId,
        votable: VotableRef,
        ballot: Ballot,
    ) -> Result<AppliedVote, VotesRepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT set_config('lock_timeout', $1, true)")
            .bind(format!("{}ms", self.lock_timeout.as_millis()))
            .execute(&mut *tx)
            .await?;

        let (counters, thread_id) = self
            .lock_votable_tx(votable, &mut tx)
            .await?
            .ok_or(VotesRepositoryError::VotableNotFound(votable))?;

        let stored_value = self.get_vote_value_tx(user_id, votable, &mut tx).await?;
        let applied = AppliedVote::plan(user_id, votable, thread_id, stored_value, counters, ballot)?;

        self.persist_changeset_tx(&applied.changeset(), &mut tx).await?;
        tx.commit().await?;

        debug!(
            new_value = applied.vote.value.as_i16(),
            score_delta = applied.transition.delta.score,
            "Vote committed"
        );
        Ok(applied)
    }

    async fn get_user_vote(
        &self,
        user_id: UserId,
        votable: VotableRef,
    ) -> Result<Option<UserVote>, VotesRepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT user_id, votable_kind, votable_id, thread_id, value
            FROM votes
            WHERE user_id = $1 AND votable_kind = $2 AND votable_id = $3
            "#,
        )
        .bind(user_id.0)
        .bind(votable.kind.as_i16())
        .bind(votable.id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(user_vote_from_row).transpose()
    }

    async fn get_counters(
        &self,
        votable: VotableRef,
    ) -> Result<Option<VotableCounters>, VotesRepositoryError> {
        let query = match votable.kind {
            VotableKind::Submission => "SELECT ups, downs, score FROM submissions WHERE id = $1",
            VotableKind::Comment => "SELECT ups, downs, score FROM comments WHERE id = $1",
        };

        let row = sqlx::query(query)
            .bind(votable.id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(counters_from_row).transpose()
    }

    async fn get_thread_votes(
        &self,
        user_id: UserId,
        submission_id: i64,
    ) -> Result<Vec<UserVote>, VotesRepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT user_id, votable_kind, votable_id, thread_id, value
            FROM votes
            WHERE user_id = $1 AND thread_id = $2
            ORDER BY votable_kind, votable_id
            "#,
        )
        .bind(user_id.0)
        .bind(submission_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(user_vote_from_row).collect()
    }

    async fn insert_submission(
        &self,
        counters: VotableCounters,
    ) -> Result<VotableRef, VotesRepositoryError> {
        counters.validate()?;

        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO submissions (ups, downs, score) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(counters.ups)
        .bind(counters.downs)
        .bind(counters.score)
        .fetch_one(&self.pool)
        .await?;

        Ok(VotableRef::submission(id))
    }

    async fn insert_comment(
        &self,
        parent: VotableRef,
        counters: VotableCounters,
    ) -> Result<VotableRef, VotesRepositoryError> {
        counters.validate()?;

        let (submission_id, parent_id) = match parent.kind {
            VotableKind::Submission => {
                let exists = sqlx::query_scalar::<_, i64>("SELECT id FROM submissions WHERE id = $1")
                    .bind(parent.id)
                    .fetch_optional(&self.pool)
                    .await?;
                (exists.ok_or(VotesRepositoryError::VotableNotFound(parent))?, None)
            }
            VotableKind::Comment => {
                let submission_id =
                    sqlx::query_scalar::<_, i64>("SELECT submission_id FROM comments WHERE id = $1")
                        .bind(parent.id)
                        .fetch_optional(&self.pool)
                        .await?;
                (
                    submission_id.ok_or(VotesRepositoryError::VotableNotFound(parent))?,
                    Some(parent.id),
                )
            }
        };

        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO comments (submission_id, parent_id, ups, downs, score)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(submission_id)
        .bind(parent_id)
        .bind(counters.ups)
        .bind(counters.downs)
        .bind(counters.score)
        .fetch_one(&self.pool)
        .await?;

        Ok(VotableRef::comment(id))
    }

    async fn check_tables_created(&self) -> Result<bool, VotesRepositoryError> {
        for table in ["submissions", "comments", "votes"] {
            let table_exists: bool = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM information_schema.tables \
                 WHERE table_schema = current_schema() AND table_name = $1)",
            )
            .bind(table)
            .fetch_one(&self.pool)
            .await?;
            if !table_exists {
                return Ok(false);
            }
        }
        Ok(true)
    }
}
