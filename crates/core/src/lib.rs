//! Core types and configuration for the alert-ledger system.
//!
//! This crate provides shared types used across all other crates:
//! - Trade alert records and parse outcomes
//! - Flat row projection for CSV / database export
//! - Configuration structures
//! - Common error types

pub mod config;
pub mod error;
pub mod row;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use row::AlertRow;
pub use types::*;
