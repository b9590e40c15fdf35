use clap::Parser;
use dotenv::dotenv;
use tracing::{error, info};
use vote_ledger::cli::{Cli, Commands};
use vote_ledger::telemetry::init_tracing;
use vote_ledger::{AppError, Dependencies, Settings, commands};

/// Main entry point for the Vote Ledger binary.
///
/// Loads `.env`, reads settings, initializes tracing, connects to PostgreSQL
/// and runs the requested command. The command's JSON result goes to stdout;
/// a failed `cast` prints its error document there as well.
#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenv().ok();

    let cli = Cli::parse();
    let settings = Settings::from_env()?;
    init_tracing(settings.log_format)?;

    info!(command = ?cli.command, "Starting vote ledger");
    let is_cast = matches!(cli.command, Commands::Cast { .. });

    let dependencies = match Dependencies::new(&settings).await {
        Ok(dependencies) => dependencies,
        Err(e) => {
            error!(error = %e, "Failed to initialize dependencies");
            if is_cast {
                println!("{}", commands::cast::error_response(&e));
            }
            return Err(e);
        }
    };

    match commands::run(cli.command, &dependencies).await {
        Ok(output) => {
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Command failed");
            if is_cast {
                println!("{}", commands::cast::error_response(&e));
            }
            Err(e)
        }
    }
}
