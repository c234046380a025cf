//! Extract failed rows from a parsed CSV for manual review.

use crate::table::{is_missing, is_truthy, Table};
use alert_core::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::info;

/// Column appended when reasons are requested.
pub const FAILURE_REASON_COLUMN: &str = "failure_reason";

#[derive(Debug, Clone)]
pub struct FailureOptions {
    /// Trust `parse_ok` when the column exists.
    pub prefer_parse_ok: bool,
    /// Append a `failure_reason` column.
    pub add_reason: bool,
    /// Replace an existing output file.
    pub overwrite: bool,
    /// Count failures without writing anything.
    pub dry_run: bool,
}

impl Default for FailureOptions {
    fn default() -> Self {
        Self {
            prefer_parse_ok: true,
            add_reason: false,
            overwrite: false,
            dry_run: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FailureReport {
    pub rows: u64,
    pub failed: u64,
    /// Output path, when a file was written.
    pub written: Option<PathBuf>,
}

/// `<input stem>.failures.csv` next to the input.
pub fn default_failures_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    input.with_file_name(format!("{stem}.failures.csv"))
}

/// Why `row` counts as a failure, if it does.
fn failure_reason(
    table: &Table,
    row: &[String],
    required: &[String],
    parse_ok: Option<usize>,
) -> Option<String> {
    if let Some(idx) = parse_ok {
        return (!is_truthy(&row[idx])).then(|| "parse_ok=false".to_string());
    }

    let missing: Vec<&str> = required
        .iter()
        .filter(|col| table.column(col).map_or(true, |idx| is_missing(&row[idx])))
        .map(String::as_str)
        .collect();
    (!missing.is_empty()).then(|| format!("missing_or_empty={}", missing.join(",")))
}

/// Select failed rows of `table`.
pub fn failure_table(table: &Table, required: &[String], options: &FailureOptions) -> Table {
    let parse_ok = if options.prefer_parse_ok {
        table.column("parse_ok")
    } else {
        None
    };

    let mut out = Table::new(table.headers.clone());
    let reason_idx = options
        .add_reason
        .then(|| out.ensure_column(FAILURE_REASON_COLUMN));

    for row in &table.rows {
        let Some(reason) = failure_reason(table, row, required, parse_ok) else {
            continue;
        };
        let mut row = row.clone();
        if let Some(idx) = reason_idx {
            row.resize(out.headers.len(), String::new());
            row[idx] = reason;
        }
        out.rows.push(row);
    }
    out
}

/// Write the failed rows of `input` to `output` (or the default path).
///
/// Nothing is written when there are no failures or on a dry run. An
/// existing output file is an error unless `overwrite` is set.
pub fn extract_failures(
    input: impl AsRef<Path>,
    output: Option<&Path>,
    required: &[String],
    options: &FailureOptions,
) -> Result<FailureReport> {
    let input = input.as_ref();
    let table = Table::read(input)?;
    let failures = failure_table(&table, required, options);

    let mut report = FailureReport {
        rows: table.len() as u64,
        failed: failures.len() as u64,
        written: None,
    };
    info!(rows = report.rows, failures = report.failed, "scanned for failures");

    if options.dry_run || failures.is_empty() {
        return Ok(report);
    }

    let out_path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_failures_path(input));
    if out_path.exists() && !options.overwrite {
        return Err(Error::OutputExists(out_path));
    }

    failures.write(&out_path)?;
    info!(path = %out_path.display(), rows = report.failed, "wrote failures");
    report.written = Some(out_path);
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn required() -> Vec<String> {
        vec!["trade_id".to_string(), "symbol".to_string()]
    }

    #[test]
    fn test_prefers_parse_ok() {
        let data = "trade_id,symbol,parse_ok\n1,SPY,true\n,,true\n2,QQQ,false\n";
        let table = Table::from_reader(data.as_bytes()).unwrap();
        let options = FailureOptions { add_reason: true, ..Default::default() };

        let out = failure_table(&table, &required(), &options);
        assert_eq!(out.len(), 1);
        assert_eq!(out.headers.last().unwrap(), FAILURE_REASON_COLUMN);
        assert_eq!(out.rows[0], vec!["2", "QQQ", "false", "parse_ok=false"]);
    }

    #[test]
    fn test_required_columns_without_parse_ok() {
        let data = "trade_id,symbol\n1,SPY\nnull,\n3,NaN\n";
        let table = Table::from_reader(data.as_bytes()).unwrap();
        let options = FailureOptions { add_reason: true, ..Default::default() };

        let out = failure_table(&table, &required(), &options);
        assert_eq!(out.len(), 2);
        assert_eq!(out.rows[0][2], "missing_or_empty=trade_id,symbol");
        assert_eq!(out.rows[1][2], "missing_or_empty=symbol");
    }

    #[test]
    fn test_parse_ok_ignored_on_request() {
        let data = "trade_id,symbol,parse_ok\n1,SPY,false\n";
        let table = Table::from_reader(data.as_bytes()).unwrap();
        let options = FailureOptions { prefer_parse_ok: false, ..Default::default() };
        assert!(failure_table(&table, &required(), &options).is_empty());
    }

    #[test]
    fn test_absent_required_column_fails_row() {
        let table = Table::from_reader("trade_id\n1\n".as_bytes()).unwrap();
        let out = failure_table(&table, &required(), &FailureOptions::default());
        assert_eq!(out.len(), 1);
        assert_eq!(out.headers, vec!["trade_id"]);
    }

    #[test]
    fn test_default_path() {
        assert_eq!(
            default_failures_path(Path::new("/tmp/trades.csv")),
            PathBuf::from("/tmp/trades.failures.csv")
        );
    }
}
