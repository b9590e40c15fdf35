//! Error types for the vote ledger repository.
//! Consolidates and re-exports error types related to repository operations.
mod votes;

pub use votes::VotesRepositoryError;
