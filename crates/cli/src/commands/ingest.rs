//! Ingest parsed rows into the SQLite store.

use alert_core::Config;
use alert_store::Store;
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::warn;

/// Arguments for the ingest command
#[derive(Parser)]
pub struct IngestArgs {
    /// Parsed CSV (output of reparse)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Database path (overrides config)
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// Rows per committed transaction (overrides config)
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Write row errors to this CSV
    #[arg(long)]
    pub errors: Option<PathBuf>,
}

pub fn run(args: IngestArgs, config: &Config) -> Result<()> {
    let db_path = args
        .db
        .unwrap_or_else(|| PathBuf::from(&config.store.path));
    let batch_size = args.batch_size.unwrap_or(config.store.batch_size);

    let mut store = Store::open(&db_path)
        .with_context(|| format!("failed to open database {}", db_path.display()))?;
    let report = store
        .ingest_csv(&args.input, batch_size)
        .with_context(|| format!("failed to ingest {}", args.input.display()))?;

    println!(
        "rows={} created={} updated={} skipped={} errors={}",
        report.rows,
        report.created,
        report.updated,
        report.skipped,
        report.errors.len()
    );

    if !report.errors.is_empty() {
        for error in report.errors.iter().take(5) {
            warn!(row = error.row, "{}", error.message);
        }
        if let Some(path) = &args.errors {
            report.write_errors(path)?;
            println!("wrote {} row errors -> {}", report.errors.len(), path.display());
        }
    }
    Ok(())
}
