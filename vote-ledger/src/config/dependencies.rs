use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tracing::info;
use vote_ledger_core::VoteLedger;
use vote_ledger_repository::{PostgresVotesRepository, VotesRepository};

use crate::config::Settings;
use crate::errors::AppError;

/// `Dependencies` holds the components the commands run against.
///
/// The repository is kept next to the ledger because migrations and seeding
/// work on storage directly.
pub struct Dependencies {
    pub repository: Arc<PostgresVotesRepository>,
    pub ledger: VoteLedger,
}

impl Dependencies {
    /// Connects to PostgreSQL and wires the ledger on top of the repository.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` when `DATABASE_URL` is missing and
    /// `AppError::Database` when the pool cannot connect.
    pub async fn new(settings: &Settings) -> Result<Self, AppError> {
        let database_url = settings.database_url()?;

        info!(
            max_connections = settings.max_connections,
            lock_timeout_ms = settings.lock_timeout.as_millis() as u64,
            max_retries = settings.ledger.max_retries,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .connect(database_url)
            .await?;

        let repository = Arc::new(
            PostgresVotesRepository::new(pool)
                .await?
                .with_lock_timeout(settings.lock_timeout),
        );
        let ledger = VoteLedger::with_config(
            repository.clone() as Arc<dyn VotesRepository>,
            settings.ledger.clone(),
        );

        Ok(Dependencies { repository, ledger })
    }

    /// Fails with `AppError::SchemaMissing` until `migrate` has been run.
    pub async fn ensure_schema(&self) -> Result<(), AppError> {
        if self.repository.check_tables_created().await? {
            Ok(())
        } else {
            Err(AppError::SchemaMissing)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ConfigError;
    use serial_test::serial;
    use std::env;

    #[tokio::test]
    #[serial]
    async fn test_dependencies_new_missing_database_url() {
        unsafe {
            env::remove_var("DATABASE_URL");
        }
        let settings = Settings::from_env().unwrap();

        let result = Dependencies::new(&settings).await;

        assert!(matches!(
            result,
            Err(AppError::Config(ConfigError::Missing("DATABASE_URL")))
        ));
    }

    #[tokio::test]
    #[serial]
    async fn test_dependencies_new_invalid_database_url() {
        let mut settings = Settings::from_env().unwrap();
        settings.database_url = Some("invalid-url".to_string());

        let result = Dependencies::new(&settings).await;

        assert!(matches!(result, Err(AppError::Database(_))));
    }
}
