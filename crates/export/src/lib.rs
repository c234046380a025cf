//! CSV tooling around parsed trade alerts.
//!
//! This crate handles:
//! - Re-parsing subject lines in an exported CSV
//! - Filtering a CSV down to successfully parsed rows
//! - Extracting failed rows for manual review

pub mod failures;
pub mod filter;
pub mod reparse;
pub mod table;

pub use failures::{default_failures_path, extract_failures, FailureOptions, FailureReport};
pub use filter::{filter_csv, FilterReport};
pub use reparse::{reparse_csv, ReparseOptions, ReparseReport};
pub use table::{is_missing, is_truthy, Table};
