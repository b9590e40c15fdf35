//! Vote Ledger Library
//!
//! This library provides the application layer of the vote ledger: configuration
//! from the environment, dependency wiring, tracing setup, the command line
//! interface and the commands it runs.

pub mod cli;
pub mod commands;
pub mod config;
pub mod errors;
pub mod telemetry;

pub use config::{Dependencies, Settings};
pub use errors::{AppError, ConfigError};
