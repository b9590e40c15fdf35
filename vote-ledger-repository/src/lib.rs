//! # Vote Ledger Repository
//! This crate provides the storage interface of the vote ledger and its
//! implementations. It includes definitions for errors, the `VotesRepository`
//! trait, a PostgreSQL implementation with embedded migrations, and an
//! in-memory implementation guarded by per-votable locks.
pub mod errors;
pub mod interfaces;
pub mod memory;
pub mod postgres;

pub use errors::VotesRepositoryError;
pub use interfaces::VotesRepository;
pub use memory::InMemoryVotesRepository;
pub use postgres::PostgresVotesRepository;
