//! # Vote Ledger Core
//! This crate defines the vote ledger service.
//! It includes the `VoteLedger` that validates callers and ballots, applies
//! votes through a `VotesRepository` with bounded retry on contention, the
//! parsing of raw vote requests, and the ledger's error taxonomy.
pub mod config;
pub mod errors;
pub mod ledger;
pub mod request;

pub use config::LedgerConfig;
pub use errors::{LedgerError, RequestError};
pub use ledger::VoteLedger;
pub use request::VoteRequest;
