//! Subcommand implementations.

pub mod export;
pub mod ingest;
pub mod parse;
