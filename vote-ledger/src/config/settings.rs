use std::env;
use std::str::FromStr;
use std::time::Duration;

use vote_ledger_core::LedgerConfig;

use crate::errors::ConfigError;

const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_LOCK_TIMEOUT_MS: u64 = 2000;
const DEFAULT_MAX_RETRIES: usize = 3;
const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 10;
const DEFAULT_RETRY_MAX_DELAY_MS: u64 = 500;

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            _ => Err(ConfigError::Invalid {
                name: "LOG_FORMAT",
                value: value.to_string(),
            }),
        }
    }
}

/// `Settings` holds everything the binary reads from the environment.
///
/// Only `DATABASE_URL` has no default, and it is only required by commands
/// that talk to PostgreSQL.
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub lock_timeout: Duration,
    pub ledger: LedgerConfig,
    pub log_format: LogFormat,
}

impl Settings {
    /// Reads the settings from the process environment.
    ///
    /// Unset variables fall back to their defaults. Set but unparsable
    /// variables are reported as `ConfigError::Invalid`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = env::var("DATABASE_URL").ok().filter(|url| !url.is_empty());
        let max_connections = parse_var("DATABASE_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?;
        if max_connections == 0 {
            return Err(ConfigError::Invalid {
                name: "DATABASE_MAX_CONNECTIONS",
                value: "0".to_string(),
            });
        }

        let lock_timeout_ms = parse_var("VOTE_LOCK_TIMEOUT_MS", DEFAULT_LOCK_TIMEOUT_MS)?;
        let ledger = LedgerConfig {
            max_retries: parse_var("VOTE_MAX_RETRIES", DEFAULT_MAX_RETRIES)?,
            retry_base_delay: Duration::from_millis(parse_var(
                "VOTE_RETRY_BASE_DELAY_MS",
                DEFAULT_RETRY_BASE_DELAY_MS,
            )?),
            retry_max_delay: Duration::from_millis(parse_var(
                "VOTE_RETRY_MAX_DELAY_MS",
                DEFAULT_RETRY_MAX_DELAY_MS,
            )?),
        };
        let log_format = match env::var("LOG_FORMAT") {
            Ok(value) if !value.is_empty() => value.parse()?,
            _ => LogFormat::default(),
        };

        Ok(Settings {
            database_url,
            max_connections,
            lock_timeout: Duration::from_millis(lock_timeout_ms),
            ledger,
            log_format,
        })
    }

    pub fn database_url(&self) -> Result<&str, ConfigError> {
        self.database_url
            .as_deref()
            .ok_or(ConfigError::Missing("DATABASE_URL"))
    }
}

fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => {
            value.trim().parse().map_err(|_| ConfigError::Invalid { name, value })
        }
        _ => Ok(default),
    }
}
