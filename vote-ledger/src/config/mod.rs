//! Configuration module for the Vote Ledger.
//! Reads settings from the environment and wires up dependencies.
mod dependencies;
mod settings;

pub use dependencies::Dependencies;
pub use settings::{LogFormat, Settings};
