//! Subcommand implementations.

pub mod generate;
