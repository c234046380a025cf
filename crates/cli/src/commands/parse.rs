//! Parse subject lines from arguments or stdin.

use alert_core::{AlertRow, Config};
use alert_parser::SubjectParser;
use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, BufRead, Write};
use tracing::info;

/// Arguments for the parse command
#[derive(Parser)]
pub struct ParseArgs {
    /// Subject lines to parse; reads one per line from stdin when empty
    pub subjects: Vec<String>,

    /// Print the normalized text instead of the parsed row
    #[arg(long)]
    pub normalized: bool,

    /// Pretty-print JSON
    #[arg(long)]
    pub pretty: bool,

    /// Print batch statistics as JSON to stderr
    #[arg(long)]
    pub stats: bool,
}

pub fn run(args: ParseArgs, config: &Config) -> Result<()> {
    let parser = SubjectParser::new(config.parser.clone()).context("invalid parser config")?;

    let subjects = if args.subjects.is_empty() {
        io::stdin()
            .lock()
            .lines()
            .collect::<io::Result<Vec<_>>>()
            .context("failed to read subjects from stdin")?
    } else {
        args.subjects
    };

    let mut out = io::stdout().lock();
    if args.normalized {
        for subject in &subjects {
            writeln!(out, "{}", parser.normalize(subject))?;
        }
        return Ok(());
    }

    let batch = parser.parse_batch(&subjects);
    for outcome in &batch.outcomes {
        let row = AlertRow::from(outcome);
        let json = if args.pretty {
            serde_json::to_string_pretty(&row)?
        } else {
            serde_json::to_string(&row)?
        };
        writeln!(out, "{json}")?;
    }

    if args.stats {
        eprintln!("{}", serde_json::to_string(&batch.stats)?);
    }
    info!(
        total = batch.stats.total,
        ok = batch.stats.succeeded(),
        failed = batch.stats.failed(),
        "parsed"
    );
    Ok(())
}
