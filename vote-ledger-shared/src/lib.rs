//! # Vote Ledger Shared
//! This crate defines shared data structures and types used across the vote ledger crates.
//! It includes vote values and ballots, votable references and their cached counters,
//! user identities, stored user votes, and the pure vote transition function.
pub mod types;
