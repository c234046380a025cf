//! Configuration structures for the alert-ledger system.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Two-digit years below this pivot map to 20YY, the rest to 19YY.
pub const DEFAULT_YEAR_PIVOT: u32 = 80;

/// Main configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Subject parser configuration.
    pub parser: ParserConfig,
    /// CSV export configuration.
    pub export: ExportConfig,
    /// Relational store configuration.
    pub store: StoreConfig,
}

impl Config {
    /// Load a configuration from a JSON file. Missing sections use defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config: Config = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<()> {
        self.parser.validate()?;
        if self.export.subject_column.trim().is_empty() {
            return Err(Error::config("export.subject_column must not be empty"));
        }
        if self.store.batch_size == 0 {
            return Err(Error::config("store.batch_size must be > 0"));
        }
        Ok(())
    }
}

/// Subject parser configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Exchange codes tolerated between the price and `MARK=`.
    pub exchange_codes: Vec<String>,
    /// Two-digit-year pivot for option expiries.
    pub year_pivot: u32,
    /// Noise words removed before parsing (matched case-insensitively).
    pub noise_tokens: Vec<String>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            exchange_codes: ["CBOE", "NYSE", "BATS", "EDGX", "NASDAQ BX"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            year_pivot: DEFAULT_YEAR_PIVOT,
            noise_tokens: vec!["tIP".to_string()],
        }
    }
}

impl ParserConfig {
    pub fn validate(&self) -> Result<()> {
        if self.year_pivot > 99 {
            return Err(Error::config(format!(
                "parser.year_pivot must be <= 99, got {}",
                self.year_pivot
            )));
        }
        for code in &self.exchange_codes {
            let valid = !code.is_empty()
                && code
                    .split(' ')
                    .all(|word| !word.is_empty() && word.chars().all(|c| c.is_ascii_uppercase()));
            if !valid {
                return Err(Error::config(format!(
                    "parser.exchange_codes entry {code:?} must be upper-case words"
                )));
            }
        }
        Ok(())
    }

    /// Whether `code` is an allowed exchange code.
    pub fn is_known_exchange(&self, code: &str) -> bool {
        self.exchange_codes.iter().any(|known| known == code)
    }
}

/// CSV export configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Column holding the raw subject line.
    pub subject_column: String,
    /// Column holding the mail message id.
    pub message_id_column: String,
    /// Columns that must be non-empty when `parse_ok` is unavailable.
    pub required_columns: Vec<String>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            subject_column: "subject".to_string(),
            message_id_column: "message_id".to_string(),
            required_columns: [
                "trade_id",
                "side",
                "qty_abs",
                "symbol",
                "price",
                "underlying_mark",
                "impl_vol",
                "account",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

/// Relational store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// SQLite database path.
    pub path: String,
    /// Rows per committed transaction during ingest.
    pub batch_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: "alerts.db".to_string(),
            batch_size: 1000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.parser.year_pivot, 80);
        assert!(config.parser.is_known_exchange("CBOE"));
        assert!(config.parser.is_known_exchange("NASDAQ BX"));
        assert!(!config.parser.is_known_exchange("XYZ"));
        assert_eq!(config.export.subject_column, "subject");
        assert_eq!(config.store.batch_size, 1000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_pivot() {
        let mut config = Config::default();
        config.parser.year_pivot = 120;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_lowercase_exchange_rejected() {
        let mut config = ParserConfig::default();
        config.exchange_codes.push("arca".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "parser": {{ "exchange_codes": ["CBOE", "ARCA"] }}, "store": {{ "path": "x.db" }} }}"#
        )
        .unwrap();

        let config = Config::from_json_file(file.path()).unwrap();
        assert!(config.parser.is_known_exchange("ARCA"));
        assert!(!config.parser.is_known_exchange("NYSE"));
        assert_eq!(config.parser.year_pivot, DEFAULT_YEAR_PIVOT);
        assert_eq!(config.store.path, "x.db");
        assert_eq!(config.store.batch_size, 1000);
    }
}
