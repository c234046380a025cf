//! # alerts
//!
//! Command-line interface for the trade-alert ledger.
//!
//! This CLI provides commands for:
//! - Parsing single subject lines
//! - Re-parsing, filtering and failure extraction on exported CSVs
//! - Ingesting parsed rows into SQLite

mod commands;
mod logging;

use alert_core::Config;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::{export, ingest, parse};

/// Trade-alert subject parser and ledger tools
#[derive(Parser)]
#[command(name = "alerts")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// JSON configuration file (defaults apply when omitted)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse subject lines and print the flat rows as JSON
    Parse(parse::ParseArgs),

    /// Re-parse the subject column of an exported CSV
    Reparse(export::ReparseArgs),

    /// Keep only rows with a truthy parse_ok
    Filter(export::FilterArgs),

    /// Extract failed rows for review
    Failures(export::FailuresArgs),

    /// Ingest parsed rows into the SQLite store
    Ingest(ingest::IngestArgs),
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    match path {
        Some(path) => Config::from_json_file(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(Config::default()),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::setup_logging(cli.verbose);

    let config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Parse(args) => parse::run(args, &config),
        Commands::Reparse(args) => export::reparse(args, &config),
        Commands::Filter(args) => export::filter(args),
        Commands::Failures(args) => export::failures(args, &config),
        Commands::Ingest(args) => ingest::run(args, &config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_subjects_and_globals() {
        let cli = Cli::try_parse_from(["alerts", "parse", "#1 BOT", "--pretty", "-v"]).unwrap();
        assert!(cli.verbose);
        assert!(cli.config.is_none());
        match cli.command {
            Commands::Parse(args) => {
                assert_eq!(args.subjects, vec!["#1 BOT"]);
                assert!(args.pretty);
            }
            _ => panic!("expected parse"),
        }
    }

    #[test]
    fn test_failures_required_cols_split() {
        let cli = Cli::try_parse_from([
            "alerts",
            "failures",
            "-i",
            "in.csv",
            "--required-cols",
            "trade_id,symbol",
            "--add-reason",
        ])
        .unwrap();
        match cli.command {
            Commands::Failures(args) => {
                assert_eq!(
                    args.required_cols,
                    Some(vec!["trade_id".to_string(), "symbol".to_string()])
                );
                assert!(args.add_reason);
                assert!(!args.overwrite);
            }
            _ => panic!("expected failures"),
        }
    }

    #[test]
    fn test_missing_config_file_is_error() {
        let path = PathBuf::from("/nonexistent/alerts.json");
        assert!(load_config(Some(&path)).is_err());
        assert_eq!(load_config(None).unwrap().store.batch_size, 1000);
    }
}
