//! Error types for the Vote Ledger application.
//! Consolidates errors from configuration, storage, the ledger and request parsing.
use thiserror::Error;

/// Errors raised while reading configuration from the environment.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Repository error: {0}")]
    Repository(#[from] vote_ledger_repository::VotesRepositoryError),
    #[error("Ledger error: {0}")]
    Ledger(#[from] vote_ledger_core::LedgerError),
    #[error("Request error: {0}")]
    Request(#[from] vote_ledger_core::RequestError),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Tracing initialization failed: {0}")]
    Telemetry(String),
    #[error("Vote tables are missing, run `vote-ledger migrate` first")]
    SchemaMissing,
}
