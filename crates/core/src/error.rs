//! Error types for the alert-ledger system.
//!
//! Subject parsing never produces these; a subject that cannot be parsed is a
//! [`FailReason`](crate::FailReason) value. This type covers the plumbing
//! around the parser: configuration, files, CSV and the database.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for ledger operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised outside the parser itself.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid parser, export or store settings.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A CSV lacks a column the operation needs.
    #[error("missing required column {0:?}")]
    MissingColumn(String),

    /// Refused to replace an existing output file.
    #[error("refusing to overwrite existing file {}", .0.display())]
    OutputExists(PathBuf),

    /// A row value that cannot be stored.
    #[error("Data error: {0}")]
    Data(String),

    /// Malformed CSV input or a failed CSV write.
    #[error("CSV error: {0}")]
    Csv(String),

    /// SQLite failure.
    #[error("Database error: {0}")]
    Database(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    pub fn data(msg: impl Into<String>) -> Self {
        Error::Data(msg.into())
    }

    pub fn csv(msg: impl Into<String>) -> Self {
        Error::Csv(msg.into())
    }

    pub fn database(msg: impl Into<String>) -> Self {
        Error::Database(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            Error::config("year_pivot must be <= 99").to_string(),
            "Configuration error: year_pivot must be <= 99"
        );
        assert_eq!(Error::csv("no header").to_string(), "CSV error: no header");
        assert_eq!(
            Error::MissingColumn("parse_ok".into()).to_string(),
            "missing required column \"parse_ok\""
        );
        assert_eq!(
            Error::OutputExists(PathBuf::from("out.csv")).to_string(),
            "refusing to overwrite existing file out.csv"
        );
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.csv");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
