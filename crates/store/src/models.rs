//! Row types for the relational store.

use alert_core::{OptionType, Side, TradeAlertRecord};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rust_decimal::Decimal;
use sha2::{Digest, Sha256};
use std::fmt;

const INDEX_SYMBOLS: [&str; 4] = ["SPX", "NDX", "RUT", "VIX"];
const ETF_SYMBOLS: [&str; 3] = ["SPY", "QQQ", "IWM"];

/// Instrument asset class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetClass {
    Equity,
    Etf,
    Index,
    Future,
}

impl AssetClass {
    /// Infer the asset class from a symbol.
    pub fn infer(symbol: &str) -> Self {
        let symbol = symbol.trim().to_ascii_uppercase();
        if symbol.starts_with('/') {
            AssetClass::Future
        } else if INDEX_SYMBOLS.contains(&symbol.as_str()) {
            AssetClass::Index
        } else if ETF_SYMBOLS.contains(&symbol.as_str()) {
            AssetClass::Etf
        } else {
            AssetClass::Equity
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AssetClass::Equity => "EQUITY",
            AssetClass::Etf => "ETF",
            AssetClass::Index => "INDEX",
            AssetClass::Future => "FUTURE",
        }
    }
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical text for a stored decimal (`500`, `0.12`).
pub fn decimal_text(value: Decimal) -> String {
    value.normalize().to_string()
}

/// Fields that identify a contract.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContractKey {
    pub instrument_id: i64,
    pub is_option: bool,
    pub option_type: Option<OptionType>,
    pub expiry_date: Option<NaiveDate>,
    pub strike: Option<Decimal>,
    pub root: Option<String>,
    pub multiplier: Option<String>,
}

/// One trade ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeEntry {
    pub broker_trade_id: Option<String>,
    pub account: String,
    pub symbol: String,
    pub is_option: bool,
    pub option_type: Option<OptionType>,
    pub expiry_date: Option<NaiveDate>,
    pub strike: Option<Decimal>,
    pub root: Option<String>,
    pub multiplier: Option<String>,
    pub side: Side,
    /// Absolute fill size; direction comes from `side`.
    pub qty: u64,
    pub price: Decimal,
    pub dt: DateTime<Utc>,
    pub message_id: Option<String>,
    pub subject: Option<String>,
}

impl TradeEntry {
    /// Build an entry from a parsed alert and its message metadata.
    pub fn from_record(
        record: &TradeAlertRecord,
        dt: DateTime<Utc>,
        message_id: Option<String>,
        subject: Option<String>,
    ) -> Self {
        Self {
            broker_trade_id: Some(record.trade_id.to_string()),
            account: record.account.clone(),
            symbol: record.symbol.clone(),
            is_option: record.is_option,
            option_type: record.option_type,
            expiry_date: record.expiry_date,
            strike: record.strike,
            root: record.option_root.clone(),
            multiplier: (!record.contract_multiplier.is_empty())
                .then(|| record.contract_multiplier.clone()),
            side: record.side,
            qty: record.qty_abs,
            price: record.price,
            dt,
            message_id,
            subject,
        }
    }

    pub fn asset_class(&self) -> AssetClass {
        AssetClass::infer(&self.symbol)
    }

    /// Timestamp as stored: RFC 3339 in UTC with a `Z` suffix.
    pub fn dt_text(&self) -> String {
        self.dt.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    /// Content hash used as the dedupe key when there is no broker id.
    pub fn trade_hash(&self, account_id: i64, contract_id: i64) -> String {
        let parts = [
            account_id.to_string(),
            contract_id.to_string(),
            self.side.order_side().to_string(),
            self.qty.to_string(),
            decimal_text(self.price),
            self.dt_text(),
            self.message_id.clone().unwrap_or_default(),
        ];
        hex::encode(Sha256::digest(parts.join("|").as_bytes()))
    }
}

/// Whether an upsert inserted a new trade or updated an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertResult {
    Created(i64),
    Updated(i64),
}

impl UpsertResult {
    pub fn trade_id(self) -> i64 {
        match self {
            UpsertResult::Created(id) | UpsertResult::Updated(id) => id,
        }
    }

    pub fn is_created(self) -> bool {
        matches!(self, UpsertResult::Created(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry() -> TradeEntry {
        TradeEntry {
            broker_trade_id: None,
            account: "49*****60".to_string(),
            symbol: "/ESM23".to_string(),
            is_option: false,
            option_type: None,
            expiry_date: None,
            strike: None,
            root: None,
            multiplier: None,
            side: Side::Bought,
            qty: 1,
            price: Decimal::new(416025, 2),
            dt: Utc.with_ymd_and_hms(2023, 5, 1, 14, 30, 0).unwrap(),
            message_id: Some("m1".to_string()),
            subject: None,
        }
    }

    #[test]
    fn test_infer_asset_class() {
        assert_eq!(AssetClass::infer("/ESM23"), AssetClass::Future);
        assert_eq!(AssetClass::infer("SPX"), AssetClass::Index);
        assert_eq!(AssetClass::infer("vix"), AssetClass::Index);
        assert_eq!(AssetClass::infer("QQQ"), AssetClass::Etf);
        assert_eq!(AssetClass::infer("SQQQ"), AssetClass::Equity);
        assert_eq!(AssetClass::Future.to_string(), "FUTURE");
    }

    #[test]
    fn test_decimal_text() {
        assert_eq!(decimal_text(Decimal::new(50000, 2)), "500");
        assert_eq!(decimal_text(Decimal::new(12, 2)), "0.12");
    }

    #[test]
    fn test_dt_text() {
        assert_eq!(entry().dt_text(), "2023-05-01T14:30:00Z");
    }

    #[test]
    fn test_trade_hash_stable_and_sensitive() {
        let a = entry();
        let hash = a.trade_hash(1, 2);
        assert_eq!(hash.len(), 64);
        assert_eq!(hash, a.trade_hash(1, 2));
        assert_ne!(hash, a.trade_hash(1, 3));

        let mut b = entry();
        b.price = Decimal::new(4160250, 3);
        assert_eq!(hash, b.trade_hash(1, 2));

        b.message_id = Some("m2".to_string());
        assert_ne!(hash, b.trade_hash(1, 2));
    }
}
