//! Re-parse subject lines of an exported CSV.
//!
//! Every input column is kept. Parse columns missing from the input are
//! appended, and stale parse values are overwritten for every re-parsed row.

use crate::table::{is_truthy, Table};
use alert_core::config::ExportConfig;
use alert_core::{AlertRow, Result};
use alert_parser::SubjectParser;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Options for a re-parse run.
#[derive(Debug, Clone, Default)]
pub struct ReparseOptions {
    /// Only re-parse rows whose `parse_ok` is not truthy.
    pub only_bad: bool,
    /// Write `message_id, subject, fail_reason` for rows that still fail.
    pub fail_log: Option<PathBuf>,
}

/// Counts from a re-parse run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReparseReport {
    /// Data rows read.
    pub rows: u64,
    /// Rows with a successful parse in the output.
    pub ok: u64,
    /// Rows that failed to parse.
    pub failed: u64,
    /// Rows whose subject was parsed in this run.
    pub reparsed: u64,
}

/// Re-parse `table` in place and return the fail log rows alongside the report.
pub fn reparse_table(
    table: &mut Table,
    parser: &SubjectParser,
    config: &ExportConfig,
    only_bad: bool,
) -> Result<(ReparseReport, Table)> {
    let subject_idx = table.require_column(&config.subject_column)?;
    let message_idx = table.column(&config.message_id_column);
    let parse_cols: Vec<usize> = AlertRow::COLUMNS
        .iter()
        .map(|name| table.ensure_column(name))
        .collect();
    let parse_ok_idx = parse_cols[0];

    let mut fail_log = Table::new(
        ["message_id", "subject", "fail_reason"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
    );
    let mut report = ReparseReport::default();

    for row in &mut table.rows {
        report.rows += 1;

        if only_bad && is_truthy(&row[parse_ok_idx]) {
            report.ok += 1;
            continue;
        }

        let outcome = parser.parse(&row[subject_idx]);
        report.reparsed += 1;
        let fields = AlertRow::from(&outcome).to_fields();
        for (&idx, value) in parse_cols.iter().zip(fields) {
            row[idx] = value;
        }

        match outcome.fail_reason() {
            None => report.ok += 1,
            Some(reason) => {
                report.failed += 1;
                debug!(subject = %row[subject_idx], %reason, "subject still fails");
                fail_log.rows.push(vec![
                    message_idx.map(|i| row[i].clone()).unwrap_or_default(),
                    row[subject_idx].clone(),
                    reason.to_string(),
                ]);
            }
        }
    }

    Ok((report, fail_log))
}

/// Re-parse the CSV at `input` and write the result to `output`.
pub fn reparse_csv(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    parser: &SubjectParser,
    config: &ExportConfig,
    options: &ReparseOptions,
) -> Result<ReparseReport> {
    let (input, output) = (input.as_ref(), output.as_ref());
    let mut table = Table::read(input)?;
    let (report, fail_log) = reparse_table(&mut table, parser, config, options.only_bad)?;
    table.write(output)?;

    if let Some(path) = &options.fail_log {
        if !fail_log.is_empty() {
            fail_log.write(path)?;
            info!(path = %path.display(), rows = fail_log.len(), "wrote fail log");
        }
    }

    info!(
        input = %input.display(),
        output = %output.display(),
        rows = report.rows,
        reparsed = report.reparsed,
        ok = report.ok,
        failed = report.failed,
        "reparsed csv"
    );
    Ok(report)
}
