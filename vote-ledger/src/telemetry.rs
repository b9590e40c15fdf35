//! Tracing setup for the binary.
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LogFormat;
use crate::errors::AppError;

const DEFAULT_FILTER: &str = "vote_ledger=info,vote_ledger_core=info,vote_ledger_repository=info";

/// Installs the global subscriber. `RUST_LOG` overrides the default filter.
///
/// Logs go to stderr; stdout carries only command output.
pub fn init_tracing(format: LogFormat) -> Result<(), AppError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_writer(std::io::stderr)
                    .pretty(),
            )
            .try_init(),
    }
    .map_err(|e| AppError::Telemetry(e.to_string()))?;

    info!(
        service_name = "vote-ledger",
        service_version = env!("CARGO_PKG_VERSION"),
        log_format = ?format,
        "Tracing initialized"
    );

    Ok(())
}
