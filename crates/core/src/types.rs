//! Core data types for the alert-ledger system.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Broker-assigned alert identifier (the digits after the leading `#`).
pub type TradeId = u64;

/// Execution side, as spelled by the broker keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i8)]
pub enum Side {
    /// `BOT` keyword.
    #[serde(rename = "BOT")]
    Bought = 1,
    /// `SOLD` keyword.
    #[serde(rename = "SOLD")]
    Sold = -1,
}

impl Side {
    /// Parse the broker keyword (`BOT` / `SOLD`).
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "BOT" => Some(Side::Bought),
            "SOLD" => Some(Side::Sold),
            _ => None,
        }
    }

    /// Broker keyword for this side.
    pub fn keyword(self) -> &'static str {
        match self {
            Side::Bought => "BOT",
            Side::Sold => "SOLD",
        }
    }

    /// Order-side spelling used by the relational store.
    pub fn order_side(self) -> &'static str {
        match self {
            Side::Bought => "BUY",
            Side::Sold => "SELL",
        }
    }

    /// Get the sign as i64.
    #[inline]
    pub fn sign(self) -> i64 {
        self as i8 as i64
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Option right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OptionType {
    Call,
    Put,
}

impl OptionType {
    /// Parse the subject keyword (`CALL` / `PUT`).
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "CALL" => Some(OptionType::Call),
            "PUT" => Some(OptionType::Put),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OptionType::Call => "CALL",
            OptionType::Put => "PUT",
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Instrument shape of a successfully parsed alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    /// Option on an equity, index, ETF or future.
    Option,
    /// Outright future (`/`-prefixed root, no option fields).
    Future,
    /// Equity or ETF shares.
    Equity,
}

/// Why a subject did not produce a record. Closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailReason {
    /// Not a fill notification at all (price alerts and the like).
    NonTradeAlert,
    /// Has a trade id and side keyword but no instrument symbol.
    NotATrade,
    /// Looks like a trade but some required token is missing or malformed.
    UnrecognizedTradeFormat,
}

impl FailReason {
    pub fn as_str(self) -> &'static str {
        match self {
            FailReason::NonTradeAlert => "non_trade_alert",
            FailReason::NotATrade => "not_a_trade",
            FailReason::UnrecognizedTradeFormat => "unrecognized_trade_format",
        }
    }

    /// Parse the snake_case spelling used in exported rows.
    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s {
            "non_trade_alert" => Some(FailReason::NonTradeAlert),
            "not_a_trade" => Some(FailReason::NotATrade),
            "unrecognized_trade_format" => Some(FailReason::UnrecognizedTradeFormat),
            _ => None,
        }
    }

    /// All reasons, in triage order.
    pub const ALL: [FailReason; 3] = [
        FailReason::NonTradeAlert,
        FailReason::NotATrade,
        FailReason::UnrecognizedTradeFormat,
    ];
}

impl fmt::Display for FailReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully parsed trade alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeAlertRecord {
    /// Broker alert id.
    pub trade_id: TradeId,
    /// Side keyword.
    pub side: Side,
    /// Positive for BOT, negative for SOLD.
    pub qty_signed: i64,
    /// Absolute quantity, always > 0.
    pub qty_abs: u64,
    /// Underlying ticker or futures root (futures keep the leading `/`).
    pub symbol: String,
    /// Whether this is an option fill.
    pub is_option: bool,
    /// Literal multiplier (`"100"`, `"1/50"`); empty for non-options.
    pub contract_multiplier: String,
    /// Option expiry.
    pub expiry_date: Option<NaiveDate>,
    /// Option strike.
    pub strike: Option<Decimal>,
    /// Option right.
    pub option_type: Option<OptionType>,
    /// Per-unit execution price after `@`.
    pub price: Decimal,
    /// Underlying mark after `MARK=`.
    pub underlying_mark: Decimal,
    /// Implied volatility in percent, without the `%` sign.
    pub impl_vol: Decimal,
    /// Broker account identifier.
    pub account: String,
    /// Option root of an option on a future (e.g. `/EW2M24`).
    pub option_root: Option<String>,
}

impl TradeAlertRecord {
    /// Instrument shape of this record.
    pub fn kind(&self) -> AlertKind {
        if self.is_option {
            AlertKind::Option
        } else if self.symbol.starts_with('/') {
            AlertKind::Future
        } else {
            AlertKind::Equity
        }
    }

    /// Check the record-level invariants.
    ///
    /// - `is_option` iff the multiplier is non-empty
    /// - expiry, strike and option type are jointly present iff `is_option`
    /// - `qty_abs == |qty_signed| > 0` and the sign agrees with `side`
    pub fn is_consistent(&self) -> bool {
        let option_fields = [
            self.expiry_date.is_some(),
            self.strike.is_some(),
            self.option_type.is_some(),
        ];
        let options_agree = option_fields.iter().all(|&present| present == self.is_option);

        self.is_option == !self.contract_multiplier.is_empty()
            && options_agree
            && (self.is_option || self.option_root.is_none())
            && self.qty_abs > 0
            && self.qty_signed.unsigned_abs() == self.qty_abs
            && self.qty_signed.signum() == self.side.sign()
    }
}

/// Result of parsing one subject line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ParseOutcome {
    Success(TradeAlertRecord),
    Failure { reason: FailReason },
}

impl ParseOutcome {
    /// Build a failure outcome.
    pub fn failure(reason: FailReason) -> Self {
        ParseOutcome::Failure { reason }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ParseOutcome::Success(_))
    }

    /// The record, if the parse succeeded.
    pub fn record(&self) -> Option<&TradeAlertRecord> {
        match self {
            ParseOutcome::Success(record) => Some(record),
            ParseOutcome::Failure { .. } => None,
        }
    }

    /// The failure reason, if the parse failed.
    pub fn fail_reason(&self) -> Option<FailReason> {
        match self {
            ParseOutcome::Success(_) => None,
            ParseOutcome::Failure { reason } => Some(*reason),
        }
    }
}
