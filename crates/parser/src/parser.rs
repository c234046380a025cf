//! Subject parsing pipeline.
//!
//! raw text → normalize → classify → extract → assemble, with any failure
//! mapped to a [`FailReason`]. Parsing is pure: the parser holds only
//! configuration and compiled patterns, so one instance can be shared across
//! threads.

use crate::extract::{ExtractedFields, Extractor, FieldError};
use crate::failure::classify_failure;
use crate::grammar::{classify, Classification};
use crate::normalizer::Normalizer;
use crate::validate::assemble;
use alert_core::config::ParserConfig;
use alert_core::{AlertKind, Error, FailReason, ParseOutcome, Result, TradeAlertRecord};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::{debug, info};

static DEFAULT_PARSER: LazyLock<SubjectParser> = LazyLock::new(SubjectParser::default);

/// Parse one subject with the default configuration.
pub fn parse_subject(subject: &str) -> ParseOutcome {
    DEFAULT_PARSER.parse(subject)
}

/// Statistics about a batch of parsed subjects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseStats {
    /// Total subjects parsed.
    pub total: u64,
    /// Option records produced.
    pub options: u64,
    /// Outright futures records produced.
    pub futures: u64,
    /// Equity/ETF records produced.
    pub equities: u64,
    /// Non-trade alerts.
    pub non_trade_alerts: u64,
    /// Trade-headed subjects without an instrument.
    pub not_a_trade: u64,
    /// Trade-shaped subjects that failed to parse.
    pub unrecognized: u64,
}

impl ParseStats {
    /// Count one outcome.
    pub fn record(&mut self, outcome: &ParseOutcome) {
        self.total += 1;
        match outcome {
            ParseOutcome::Success(record) => match record.kind() {
                AlertKind::Option => self.options += 1,
                AlertKind::Future => self.futures += 1,
                AlertKind::Equity => self.equities += 1,
            },
            ParseOutcome::Failure { reason } => match reason {
                FailReason::NonTradeAlert => self.non_trade_alerts += 1,
                FailReason::NotATrade => self.not_a_trade += 1,
                FailReason::UnrecognizedTradeFormat => self.unrecognized += 1,
            },
        }
    }

    /// Successful parses.
    pub fn succeeded(&self) -> u64 {
        self.options + self.futures + self.equities
    }

    /// Failed parses.
    pub fn failed(&self) -> u64 {
        self.total - self.succeeded()
    }

    /// Fraction of subjects that parsed.
    pub fn success_rate(&self) -> f64 {
        if self.total > 0 {
            self.succeeded() as f64 / self.total as f64
        } else {
            0.0
        }
    }

    /// Reset statistics.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Outcomes of a batch, index-aligned with the input.
#[derive(Debug, Clone)]
pub struct BatchResult {
    pub outcomes: Vec<ParseOutcome>,
    pub stats: ParseStats,
}

/// Stateless trade-alert subject parser.
#[derive(Debug, Clone)]
pub struct SubjectParser {
    config: ParserConfig,
    normalizer: Normalizer,
}

impl SubjectParser {
    /// Create a parser from a configuration.
    pub fn new(config: ParserConfig) -> Result<Self> {
        config.validate()?;
        let normalizer = Normalizer::new(&config.noise_tokens)
            .map_err(|e| Error::config(format!("invalid noise token pattern: {e}")))?;
        Ok(Self { config, normalizer })
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Normalize a raw subject the way [`parse`](Self::parse) does.
    pub fn normalize(&self, subject: &str) -> String {
        self.normalizer.normalize(subject)
    }

    /// Parse one subject line. Never fails: every input yields an outcome.
    pub fn parse(&self, subject: &str) -> ParseOutcome {
        let text = self.normalizer.normalize(subject);
        let classification = classify(&text);
        let category = classification.category();

        let extracted = match classification {
            Classification::NonTrade | Classification::Unmatched => None,
            Classification::Option(caps) => Some(self.build(|x| x.option(&caps))),
            Classification::Future(caps) => Some(self.build(|x| x.future(&caps))),
            Classification::Equity(caps) => Some(self.build(|x| x.equity(&caps))),
        };

        match extracted {
            Some(Ok(record)) => ParseOutcome::Success(record),
            Some(Err(error)) => {
                debug!(subject = %text, ?category, %error, "trade fields rejected");
                ParseOutcome::failure(classify_failure(&text, category))
            }
            None => {
                let reason = classify_failure(&text, category);
                debug!(subject = %text, ?category, %reason, "subject not parsed");
                ParseOutcome::failure(reason)
            }
        }
    }

    /// Parse many subjects, preserving input order.
    pub fn parse_batch<S: AsRef<str>>(&self, subjects: &[S]) -> BatchResult {
        let mut stats = ParseStats::default();
        let outcomes: Vec<ParseOutcome> = subjects
            .iter()
            .map(|s| {
                let outcome = self.parse(s.as_ref());
                stats.record(&outcome);
                outcome
            })
            .collect();

        info!(
            total = stats.total,
            ok = stats.succeeded(),
            failed = stats.failed(),
            "parsed subject batch"
        );
        BatchResult { outcomes, stats }
    }

    fn build<F>(&self, extract: F) -> std::result::Result<TradeAlertRecord, FieldError>
    where
        F: FnOnce(&Extractor<'_>) -> std::result::Result<ExtractedFields, FieldError>,
    {
        extract(&Extractor::new(&self.config)).and_then(assemble)
    }
}

impl Default for SubjectParser {
    fn default() -> Self {
        Self {
            config: ParserConfig::default(),
            normalizer: Normalizer::new(&ParserConfig::default().noise_tokens)
                .unwrap_or_default(),
        }
    }
}
