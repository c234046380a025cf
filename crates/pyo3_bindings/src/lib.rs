//! PyO3 bindings for the trade-alert subject parser.
//!
//! Exposes to Python:
//! - `parse_subject(str) -> ParsedSubject` with the default configuration
//! - `SubjectParser` for custom exchange lists, year pivot and noise tokens

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use alert_core::config::ParserConfig;
use alert_core::{AlertRow, ParseOutcome};
use alert_parser::SubjectParser as RustSubjectParser;

// ============================================================================
// Python-exposed Types
// ============================================================================

/// Flat result of parsing one subject line.
///
/// Decimal fields are exposed as strings so Python can build exact
/// `decimal.Decimal` values from them.
#[pyclass(frozen)]
#[derive(Clone)]
pub struct ParsedSubject {
    row: AlertRow,
}

impl From<&ParseOutcome> for ParsedSubject {
    fn from(outcome: &ParseOutcome) -> Self {
        ParsedSubject {
            row: AlertRow::from(outcome),
        }
    }
}

#[pymethods]
impl ParsedSubject {
    #[getter]
    fn parse_ok(&self) -> bool {
        self.row.parse_ok
    }

    #[getter]
    fn fail_reason(&self) -> Option<&'static str> {
        self.row.fail_reason.map(|r| r.as_str())
    }

    #[getter]
    fn trade_id(&self) -> Option<u64> {
        self.row.trade_id
    }

    /// `BOT` or `SOLD`.
    #[getter]
    fn side(&self) -> Option<&'static str> {
        self.row.side.map(|s| s.keyword())
    }

    #[getter]
    fn qty_signed(&self) -> Option<i64> {
        self.row.qty_signed
    }

    #[getter]
    fn qty_abs(&self) -> Option<u64> {
        self.row.qty_abs
    }

    #[getter]
    fn symbol(&self) -> Option<String> {
        self.row.symbol.clone()
    }

    #[getter]
    fn is_option(&self) -> Option<bool> {
        self.row.is_option
    }

    #[getter]
    fn contract_multiplier(&self) -> Option<String> {
        self.row.contract_multiplier.clone()
    }

    /// ISO date (`YYYY-MM-DD`).
    #[getter]
    fn expiry_date(&self) -> Option<String> {
        self.row.expiry_date.map(|d| d.format("%Y-%m-%d").to_string())
    }

    #[getter]
    fn strike(&self) -> Option<String> {
        self.row.strike.map(|d| d.to_string())
    }

    #[getter]
    fn option_type(&self) -> Option<&'static str> {
        self.row.option_type.map(|t| t.as_str())
    }

    #[getter]
    fn price(&self) -> Option<String> {
        self.row.price.map(|d| d.to_string())
    }

    #[getter]
    fn underlying_mark(&self) -> Option<String> {
        self.row.underlying_mark.map(|d| d.to_string())
    }

    #[getter]
    fn impl_vol(&self) -> Option<String> {
        self.row.impl_vol.map(|d| d.to_string())
    }

    #[getter]
    fn account(&self) -> Option<String> {
        self.row.account.clone()
    }

    #[getter]
    fn option_root(&self) -> Option<String> {
        self.row.option_root.clone()
    }

    /// Column name/value pairs in export order; absent values are empty strings.
    fn items(&self) -> Vec<(&'static str, String)> {
        AlertRow::COLUMNS
            .iter()
            .copied()
            .zip(self.row.to_fields())
            .collect()
    }

    fn __repr__(&self) -> String {
        match self.row.fail_reason {
            Some(reason) => format!("ParsedSubject(parse_ok=False, fail_reason='{reason}')"),
            None => format!(
                "ParsedSubject(parse_ok=True, trade_id={}, symbol='{}', qty_signed={})",
                self.row.trade_id.unwrap_or_default(),
                self.row.symbol.as_deref().unwrap_or_default(),
                self.row.qty_signed.unwrap_or_default()
            ),
        }
    }
}

// ============================================================================
// Parser Class
// ============================================================================

/// Subject parser with its own configuration. Safe to share across threads.
#[pyclass(name = "SubjectParser", frozen)]
pub struct PySubjectParser {
    inner: RustSubjectParser,
}

#[pymethods]
impl PySubjectParser {
    #[new]
    #[pyo3(signature = (exchange_codes=None, year_pivot=None, noise_tokens=None))]
    fn new(
        exchange_codes: Option<Vec<String>>,
        year_pivot: Option<u32>,
        noise_tokens: Option<Vec<String>>,
    ) -> PyResult<Self> {
        let mut config = ParserConfig::default();
        if let Some(codes) = exchange_codes {
            config.exchange_codes = codes;
        }
        if let Some(pivot) = year_pivot {
            config.year_pivot = pivot;
        }
        if let Some(tokens) = noise_tokens {
            config.noise_tokens = tokens;
        }

        let inner = RustSubjectParser::new(config)
            .map_err(|e| PyValueError::new_err(e.to_string()))?;
        Ok(PySubjectParser { inner })
    }

    /// Parse one subject line.
    fn parse(&self, subject: &str) -> ParsedSubject {
        ParsedSubject::from(&self.inner.parse(subject))
    }

    /// Parse many subject lines without holding the GIL.
    fn parse_batch(&self, py: Python<'_>, subjects: Vec<String>) -> Vec<ParsedSubject> {
        let batch = py.allow_threads(|| self.inner.parse_batch(&subjects));
        batch.outcomes.iter().map(ParsedSubject::from).collect()
    }

    /// The normalized form of a subject line.
    fn normalize(&self, subject: &str) -> String {
        self.inner.normalize(subject)
    }

    #[getter]
    fn exchange_codes(&self) -> Vec<String> {
        self.inner.config().exchange_codes.clone()
    }

    #[getter]
    fn year_pivot(&self) -> u32 {
        self.inner.config().year_pivot
    }
}

/// Parse one subject line with the default configuration.
#[pyfunction]
fn parse_subject(subject: &str) -> ParsedSubject {
    ParsedSubject::from(&alert_parser::parse_subject(subject))
}

// ============================================================================
// Module Definition
// ============================================================================

/// Alert Ledger - trade-alert subject parsing for Python.
#[pymodule]
fn alert_ledger(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(parse_subject, m)?)?;
    m.add_class::<ParsedSubject>()?;
    m.add_class::<PySubjectParser>()?;
    Ok(())
}
