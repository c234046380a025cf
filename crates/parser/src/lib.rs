//! Trade-alert subject parsing for the alert-ledger system.
//!
//! This crate handles:
//! - Subject normalization
//! - Alert category classification (option, future, equity, non-trade)
//! - Typed field extraction and cross-field validation
//! - Failure classification for subjects that do not parse

pub mod extract;
pub mod failure;
pub mod grammar;
pub mod normalizer;
pub mod parser;
pub mod validate;

pub use grammar::Category;
pub use normalizer::Normalizer;
pub use parser::{parse_subject, BatchResult, ParseStats, SubjectParser};
