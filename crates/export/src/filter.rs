//! Keep only successfully parsed rows.

use crate::table::{is_truthy, Table};
use alert_core::Result;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterReport {
    pub rows: u64,
    pub kept: u64,
}

impl FilterReport {
    pub fn dropped(&self) -> u64 {
        self.rows - self.kept
    }
}

/// Rows of `table` whose `parse_ok` is truthy, with the same headers.
pub fn filter_table(table: &Table) -> Result<(Table, FilterReport)> {
    let parse_ok = table.require_column("parse_ok")?;

    let mut kept = Table::new(table.headers.clone());
    kept.rows = table
        .rows
        .iter()
        .filter(|row| is_truthy(&row[parse_ok]))
        .cloned()
        .collect();

    let report = FilterReport {
        rows: table.len() as u64,
        kept: kept.len() as u64,
    };
    Ok((kept, report))
}

/// Copy the parsed rows of `input` to `output`.
pub fn filter_csv(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<FilterReport> {
    let table = Table::read(input.as_ref())?;
    let (kept, report) = filter_table(&table)?;
    kept.write(output.as_ref())?;

    info!(
        rows = report.rows,
        kept = report.kept,
        dropped = report.dropped(),
        "filtered parsed rows"
    );
    Ok(report)
}
