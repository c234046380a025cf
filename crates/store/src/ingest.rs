//! Batched ingest of a parsed-alerts CSV into the store.
//!
//! Each row runs inside a savepoint so a bad row rolls back on its own and
//! never aborts the batch. The outer transaction is committed every
//! `batch_size` ingested rows and once more at the end.

use crate::models::{TradeEntry, UpsertResult};
use crate::store::{db_error, record_trade, Store};
use alert_core::{Error, OptionType, Result, Side};
use alert_export::{is_missing, is_truthy, Table};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;
use tracing::{info, warn};

/// A row that could not be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestError {
    /// 1-based data row number (the header is row 0).
    pub row: u64,
    pub message: String,
}

/// Counts from an ingest run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Data rows read.
    pub rows: u64,
    /// Trades inserted.
    pub created: u64,
    /// Existing trades updated.
    pub updated: u64,
    /// Rows skipped because `parse_ok` was false.
    pub skipped: u64,
    pub errors: Vec<IngestError>,
}

impl IngestReport {
    /// Write the errors as a `row,error` CSV.
    pub fn write_errors(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut table = Table::new(vec!["row".to_string(), "error".to_string()]);
        table.rows = self
            .errors
            .iter()
            .map(|e| vec![e.row.to_string(), e.message.clone()])
            .collect();
        table.write(path)
    }
}

/// Column positions used by ingest.
struct Columns {
    parse_ok: Option<usize>,
    message_id: Option<usize>,
    date_iso: Option<usize>,
    subject: Option<usize>,
    trade_id: Option<usize>,
    side: Option<usize>,
    qty_abs: Option<usize>,
    symbol: Option<usize>,
    is_option: Option<usize>,
    multiplier: Option<usize>,
    expiry_date: Option<usize>,
    strike: Option<usize>,
    option_type: Option<usize>,
    price: Option<usize>,
    account: Option<usize>,
    root: Option<usize>,
}

impl Columns {
    fn locate(table: &Table) -> Self {
        Self {
            parse_ok: table.column("parse_ok"),
            message_id: table.column("message_id"),
            date_iso: table.column("date_iso"),
            subject: table.column("subject"),
            trade_id: table.column("trade_id"),
            side: table.column("side"),
            qty_abs: table.column("qty_abs"),
            symbol: table.column("symbol"),
            is_option: table.column("is_option"),
            multiplier: table.column("contract_multiplier"),
            expiry_date: table.column("expiry_date"),
            strike: table.column("strike"),
            option_type: table.column("option_type"),
            price: table.column("price"),
            account: table.column("account"),
            root: table.column("option_root"),
        }
    }
}

/// Trimmed cell value, or `None` when absent or effectively empty.
fn cell(row: &[String], idx: Option<usize>) -> Option<&str> {
    idx.and_then(|i| row.get(i))
        .map(|v| v.trim())
        .filter(|v| !is_missing(v))
}

fn required<'r>(row: &'r [String], idx: Option<usize>, name: &str) -> Result<&'r str> {
    cell(row, idx).ok_or_else(|| Error::data(format!("missing {name}")))
}

fn parse_side(value: &str) -> Result<Side> {
    match value.to_ascii_uppercase().as_str() {
        "BOT" | "BUY" => Ok(Side::Bought),
        "SOLD" | "SELL" => Ok(Side::Sold),
        other => Err(Error::data(format!("invalid side {other:?}"))),
    }
}

fn parse_decimal(value: &str, name: &str) -> Result<Decimal> {
    Decimal::from_str(value).map_err(|_| Error::data(format!("invalid {name} {value:?}")))
}

/// Parse a timestamp as UTC. Naive timestamps are taken to be UTC already.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| Error::data(format!("invalid date_iso {value:?}")))
}

/// Build a trade entry from one CSV row.
fn entry_from_row(row: &[String], cols: &Columns) -> Result<TradeEntry> {
    let is_option = cell(row, cols.is_option).is_some_and(is_truthy);

    let (option_type, expiry_date, strike) = if is_option {
        let option_type = required(row, cols.option_type, "option_type")?;
        let option_type = OptionType::from_keyword(&option_type.to_ascii_uppercase())
            .ok_or_else(|| Error::data(format!("invalid option_type {option_type:?}")))?;
        let expiry = required(row, cols.expiry_date, "expiry_date")?;
        let expiry = NaiveDate::parse_from_str(expiry, "%Y-%m-%d")
            .map_err(|_| Error::data(format!("invalid expiry_date {expiry:?}")))?;
        let strike = parse_decimal(required(row, cols.strike, "strike")?, "strike")?;
        (Some(option_type), Some(expiry), Some(strike))
    } else {
        (None, None, None)
    };

    let qty_raw = required(row, cols.qty_abs, "qty_abs")?;
    let qty: u64 = qty_raw
        .parse()
        .map_err(|_| Error::data(format!("invalid qty_abs {qty_raw:?}")))?;
    if qty == 0 {
        return Err(Error::data("qty_abs must be > 0"));
    }

    Ok(TradeEntry {
        broker_trade_id: cell(row, cols.trade_id).map(str::to_string),
        account: required(row, cols.account, "account")?.to_string(),
        symbol: required(row, cols.symbol, "symbol")?.to_string(),
        is_option,
        option_type,
        expiry_date,
        strike,
        root: cell(row, cols.root).map(str::to_string),
        multiplier: cell(row, cols.multiplier).map(str::to_string),
        side: parse_side(required(row, cols.side, "side")?)?,
        qty,
        price: parse_decimal(required(row, cols.price, "price")?, "price")?,
        dt: parse_timestamp(required(row, cols.date_iso, "date_iso")?)?,
        message_id: cell(row, cols.message_id).map(str::to_string),
        subject: cell(row, cols.subject).map(str::to_string),
    })
}

impl Store {
    /// Ingest an in-memory table of parsed rows.
    pub fn ingest_table(&mut self, table: &Table, batch_size: usize) -> Result<IngestReport> {
        if batch_size == 0 {
            return Err(Error::config("batch_size must be > 0"));
        }
        let cols = Columns::locate(table);
        let mut report = IngestReport::default();
        let mut pending = 0usize;

        let conn = self.connection_mut();
        let mut tx = conn.transaction().map_err(db_error)?;

        for (i, row) in table.rows.iter().enumerate() {
            let row_number = i as u64 + 1;
            report.rows += 1;

            if cell(row, cols.parse_ok).is_some_and(|v| !is_truthy(v)) {
                report.skipped += 1;
                continue;
            }

            let outcome = {
                let sp = tx.savepoint().map_err(db_error)?;
                let result = entry_from_row(row, &cols).and_then(|entry| record_trade(&sp, &entry));
                if result.is_ok() {
                    sp.commit().map_err(db_error)?;
                }
                result
            };

            match outcome {
                Ok(UpsertResult::Created(_)) => report.created += 1,
                Ok(UpsertResult::Updated(_)) => report.updated += 1,
                Err(e) => {
                    warn!(row = row_number, error = %e, "row not ingested");
                    report.errors.push(IngestError {
                        row: row_number,
                        message: e.to_string(),
                    });
                    continue;
                }
            }

            pending += 1;
            if pending == batch_size {
                tx.commit().map_err(db_error)?;
                info!(rows = report.rows, "committed batch");
                tx = conn.transaction().map_err(db_error)?;
                pending = 0;
            }
        }
        tx.commit().map_err(db_error)?;

        info!(
            rows = report.rows,
            created = report.created,
            updated = report.updated,
            skipped = report.skipped,
            errors = report.errors.len(),
            "ingest complete"
        );
        Ok(report)
    }

    /// Ingest a parsed-alerts CSV file.
    pub fn ingest_csv(&mut self, path: impl AsRef<Path>, batch_size: usize) -> Result<IngestReport> {
        let table = Table::read(path)?;
        self.ingest_table(&table, batch_size)
    }
}
