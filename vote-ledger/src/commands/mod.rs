//! Command implementations for the `vote-ledger` binary.
//!
//! Each command returns the JSON document the binary prints, so the commands
//! can be exercised against any repository without touching stdout.
pub mod cast;
pub mod seed;
pub mod thread_votes;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde_json::{Value, json};
use tracing::info;

use crate::cli::Commands;
use crate::config::Dependencies;
use crate::errors::AppError;

/// Runs a parsed command against the wired dependencies.
pub async fn run(command: Commands, dependencies: &Dependencies) -> Result<Value, AppError> {
    match command {
        Commands::Migrate => {
            dependencies.repository.migrate().await?;
            info!("Migrations applied");
            Ok(json!({ "migrated": true }))
        }
        Commands::Cast {
            user,
            what,
            what_id,
            value,
        } => {
            dependencies.ensure_schema().await?;
            cast::run(&dependencies.ledger, user, &what, &what_id, &value).await
        }
        Commands::ThreadVotes { user, submission } => {
            dependencies.ensure_schema().await?;
            thread_votes::run(&dependencies.ledger, user, submission).await
        }
        Commands::Seed {
            threads,
            comments,
            seed,
        } => {
            dependencies.ensure_schema().await?;
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            let summary =
                seed::run(dependencies.repository.as_ref(), threads, comments, &mut rng).await?;
            Ok(serde_json::to_value(summary)?)
        }
    }
}
