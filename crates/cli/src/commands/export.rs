//! CSV cleanup commands: reparse, filter and failures.

use alert_core::Config;
use alert_export::{
    default_failures_path, extract_failures, filter_csv, reparse_csv, FailureOptions,
    ReparseOptions,
};
use alert_parser::SubjectParser;
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

/// Arguments for the reparse command
#[derive(Parser)]
pub struct ReparseArgs {
    /// Input CSV (existing export)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output CSV
    #[arg(short, long)]
    pub output: PathBuf,

    /// Write message_id, subject and fail_reason of rows that still fail
    #[arg(long)]
    pub fail_log: Option<PathBuf>,

    /// Only re-parse rows whose parse_ok is not truthy
    #[arg(long)]
    pub only_bad: bool,

    /// Subject column name (overrides config)
    #[arg(long)]
    pub subject_column: Option<String>,
}

/// Arguments for the filter command
#[derive(Parser)]
pub struct FilterArgs {
    /// Input CSV with a parse_ok column
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output CSV
    #[arg(short, long)]
    pub output: PathBuf,
}

/// Arguments for the failures command
#[derive(Parser)]
pub struct FailuresArgs {
    /// Input CSV
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output CSV (default: <input>.failures.csv)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Ignore parse_ok and check required columns instead
    #[arg(long)]
    pub no_prefer_parse_ok: bool,

    /// Comma-separated required columns (overrides config)
    #[arg(long, value_delimiter = ',')]
    pub required_cols: Option<Vec<String>>,

    /// Append a failure_reason column
    #[arg(long)]
    pub add_reason: bool,

    /// Overwrite the output if it exists
    #[arg(long)]
    pub overwrite: bool,

    /// Scan and report counts only
    #[arg(long)]
    pub dry_run: bool,
}

pub fn reparse(args: ReparseArgs, config: &Config) -> Result<()> {
    let parser = SubjectParser::new(config.parser.clone()).context("invalid parser config")?;
    let mut export = config.export.clone();
    if let Some(column) = args.subject_column {
        export.subject_column = column;
    }

    let options = ReparseOptions {
        only_bad: args.only_bad,
        fail_log: args.fail_log,
    };
    let report = reparse_csv(&args.input, &args.output, &parser, &export, &options)
        .with_context(|| format!("failed to reparse {}", args.input.display()))?;

    println!(
        "scanned={} reparsed={} ok={} still_bad={} -> {}",
        report.rows,
        report.reparsed,
        report.ok,
        report.failed,
        args.output.display()
    );
    Ok(())
}

pub fn filter(args: FilterArgs) -> Result<()> {
    let report = filter_csv(&args.input, &args.output)
        .with_context(|| format!("failed to filter {}", args.input.display()))?;
    println!(
        "rows={} kept={} dropped={} -> {}",
        report.rows,
        report.kept,
        report.dropped(),
        args.output.display()
    );
    Ok(())
}

pub fn failures(args: FailuresArgs, config: &Config) -> Result<()> {
    let required: Vec<String> = args
        .required_cols
        .unwrap_or_else(|| config.export.required_columns.clone())
        .into_iter()
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect();

    let options = FailureOptions {
        prefer_parse_ok: !args.no_prefer_parse_ok,
        add_reason: args.add_reason,
        overwrite: args.overwrite,
        dry_run: args.dry_run,
    };
    let report = extract_failures(&args.input, args.output.as_deref(), &required, &options)
        .with_context(|| format!("failed to extract failures from {}", args.input.display()))?;

    println!(
        "rows={} failures={} ok={}",
        report.rows,
        report.failed,
        report.rows - report.failed
    );
    match &report.written {
        Some(path) => println!("wrote {} failure rows -> {}", report.failed, path.display()),
        None if args.dry_run => {
            let target = args
                .output
                .unwrap_or_else(|| default_failures_path(&args.input));
            info!(path = %target.display(), "dry run, nothing written");
        }
        None => println!("no failures detected; not writing a file"),
    }
    Ok(())
}
