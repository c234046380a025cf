//! Flat row projection of a parse outcome.
//!
//! Success rows carry every record field with `parse_ok=true` and an empty
//! `fail_reason`; failure rows carry only `parse_ok=false` and the reason.

use crate::types::{FailReason, OptionType, ParseOutcome, Side, TradeAlertRecord};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One exported row. Absent values serialize as empty CSV fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertRow {
    pub parse_ok: bool,
    pub fail_reason: Option<FailReason>,
    pub trade_id: Option<u64>,
    pub side: Option<Side>,
    pub qty_signed: Option<i64>,
    pub qty_abs: Option<u64>,
    pub symbol: Option<String>,
    pub is_option: Option<bool>,
    pub contract_multiplier: Option<String>,
    pub expiry_date: Option<NaiveDate>,
    pub strike: Option<Decimal>,
    pub option_type: Option<OptionType>,
    pub price: Option<Decimal>,
    pub underlying_mark: Option<Decimal>,
    pub impl_vol: Option<Decimal>,
    pub account: Option<String>,
    pub option_root: Option<String>,
}

impl AlertRow {
    /// Column names, in export order.
    pub const COLUMNS: [&'static str; 17] = [
        "parse_ok",
        "fail_reason",
        "trade_id",
        "side",
        "qty_signed",
        "qty_abs",
        "symbol",
        "is_option",
        "contract_multiplier",
        "expiry_date",
        "strike",
        "option_type",
        "price",
        "underlying_mark",
        "impl_vol",
        "account",
        "option_root",
    ];

    /// Row for a failed parse.
    pub fn failed(reason: FailReason) -> Self {
        Self {
            parse_ok: false,
            fail_reason: Some(reason),
            ..Self::default()
        }
    }

    /// Field values as strings, aligned with [`AlertRow::COLUMNS`].
    pub fn to_fields(&self) -> Vec<String> {
        fn opt<T: ToString>(v: &Option<T>) -> String {
            v.as_ref().map(ToString::to_string).unwrap_or_default()
        }

        vec![
            self.parse_ok.to_string(),
            opt(&self.fail_reason),
            opt(&self.trade_id),
            opt(&self.side),
            opt(&self.qty_signed),
            opt(&self.qty_abs),
            opt(&self.symbol),
            opt(&self.is_option),
            opt(&self.contract_multiplier),
            self.expiry_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            opt(&self.strike),
            opt(&self.option_type),
            opt(&self.price),
            opt(&self.underlying_mark),
            opt(&self.impl_vol),
            opt(&self.account),
            opt(&self.option_root),
        ]
    }
}

impl From<&TradeAlertRecord> for AlertRow {
    fn from(r: &TradeAlertRecord) -> Self {
        Self {
            parse_ok: true,
            fail_reason: None,
            trade_id: Some(r.trade_id),
            side: Some(r.side),
            qty_signed: Some(r.qty_signed),
            qty_abs: Some(r.qty_abs),
            symbol: Some(r.symbol.clone()),
            is_option: Some(r.is_option),
            contract_multiplier: (!r.contract_multiplier.is_empty())
                .then(|| r.contract_multiplier.clone()),
            expiry_date: r.expiry_date,
            strike: r.strike,
            option_type: r.option_type,
            price: Some(r.price),
            underlying_mark: Some(r.underlying_mark),
            impl_vol: Some(r.impl_vol),
            account: Some(r.account.clone()),
            option_root: r.option_root.clone(),
        }
    }
}

impl From<&ParseOutcome> for AlertRow {
    fn from(outcome: &ParseOutcome) -> Self {
        match outcome {
            ParseOutcome::Success(record) => record.into(),
            ParseOutcome::Failure { reason } => AlertRow::failed(*reason),
        }
    }
}
