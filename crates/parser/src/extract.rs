//! Typed field extraction from classified captures.
//!
//! Extractors turn capture groups into typed values. They reject tokens that
//! cannot be parsed (numbers, dates, unknown exchange codes) but do not
//! cross-check fields against each other; that happens in
//! [`validate`](crate::validate).

use alert_core::config::ParserConfig;
use alert_core::{AlertKind, OptionType, Side, TradeId};
use chrono::{Datelike, NaiveDate, Weekday};
use regex::{Captures, Regex};
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::LazyLock;
use thiserror::Error;

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\(([^)]*)\)").unwrap());
static WEEK_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:wk|wkly|weeklys)\s*(\d)$").unwrap());

/// Why a matched subject could not be turned into a record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("missing capture group {0}")]
    MissingGroup(&'static str),
    #[error("invalid trade id {0:?}")]
    TradeId(String),
    #[error("invalid side keyword {0:?}")]
    Side(String),
    #[error("invalid quantity {0:?}")]
    Quantity(String),
    #[error("invalid decimal {field}={value:?}")]
    Decimal { field: &'static str, value: String },
    #[error("unknown exchange code {0:?}")]
    UnknownExchange(String),
    #[error("invalid expiry {0:?}")]
    Expiry(String),
    #[error("invalid option type {0:?}")]
    OptionType(String),
    #[error("quantity sign disagrees with side {side}: {qty}")]
    SignMismatch { side: Side, qty: i64 },
    #[error("zero quantity")]
    ZeroQuantity,
    #[error("negative {0}")]
    Negative(&'static str),
    #[error("option fields do not match {0:?} alert")]
    OptionFieldsMismatch(AlertKind),
    #[error("futures symbol must start with '/': {0:?}")]
    FutureSymbol(String),
    #[error("empty {0}")]
    Empty(&'static str),
}

/// A quantity as written in the subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quantity {
    /// Magnitude with thousands separators removed.
    pub abs: u64,
    /// Explicit sign character, if any: `+1` or `-1`.
    pub sign: Option<i64>,
}

/// Option-only fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionFields {
    pub multiplier: String,
    pub expiry: NaiveDate,
    pub strike: Decimal,
    pub option_type: OptionType,
    pub root: Option<String>,
}

/// Typed but not yet cross-validated fields of one alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedFields {
    pub kind: AlertKind,
    pub trade_id: TradeId,
    pub side: Side,
    pub quantity: Quantity,
    pub symbol: String,
    pub option: Option<OptionFields>,
    pub price: Decimal,
    pub underlying_mark: Decimal,
    pub impl_vol: Decimal,
    pub account: String,
}

fn group<'t>(caps: &Captures<'t>, name: &'static str) -> Result<&'t str, FieldError> {
    caps.name(name)
        .map(|m| m.as_str())
        .ok_or(FieldError::MissingGroup(name))
}

/// Parse a quantity such as `+1`, `-12`, `+1,000` or `25`.
pub fn parse_quantity(literal: &str) -> Result<Quantity, FieldError> {
    let err = || FieldError::Quantity(literal.to_string());

    let (sign, digits) = match literal.as_bytes().first() {
        Some(b'+') => (Some(1), &literal[1..]),
        Some(b'-') => (Some(-1), &literal[1..]),
        _ => (None, literal),
    };

    if digits.contains(',') {
        let mut groups = digits.split(',');
        let first = groups.next().ok_or_else(err)?;
        let well_grouped = (1..=3).contains(&first.len()) && groups.all(|g| g.len() == 3);
        if !well_grouped {
            return Err(err());
        }
    }

    let cleaned: String = digits.chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() || !cleaned.bytes().all(|b| b.is_ascii_digit()) {
        return Err(err());
    }
    let abs = cleaned.parse::<u64>().map_err(|_| err())?;
    if abs > i64::MAX as u64 {
        return Err(err());
    }

    Ok(Quantity { abs, sign })
}

/// Parse a decimal literal, accepting a leading `.` (e.g. `.12`).
pub fn parse_decimal(field: &'static str, literal: &str) -> Result<Decimal, FieldError> {
    let normalized = if literal.starts_with('.') {
        format!("0{literal}")
    } else {
        literal.to_string()
    };
    Decimal::from_str(&normalized).map_err(|_| FieldError::Decimal {
        field,
        value: literal.to_string(),
    })
}

/// Expand a two-digit year: below `pivot` is 20YY, otherwise 19YY.
pub fn expand_year(yy: u32, pivot: u32) -> i32 {
    if yy < pivot {
        2000 + yy as i32
    } else {
        1900 + yy as i32
    }
}

/// Month number for a three-letter upper-case month abbreviation.
pub fn month_number(mon: &str) -> Option<u32> {
    const MONTHS: [&str; 12] = [
        "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
    ];
    MONTHS.iter().position(|m| *m == mon).map(|i| i as u32 + 1)
}

/// The `n`-th (1-based) `weekday` of a month.
pub fn nth_weekday(year: i32, month: u32, weekday: Weekday, n: u32) -> Option<NaiveDate> {
    if n == 0 {
        return None;
    }
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let offset = (7 + weekday.num_days_from_monday() - first.weekday().num_days_from_monday()) % 7;
    let day = 1 + offset + 7 * (n - 1);
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Resolve an option expiry from its day/month/year tokens and tags.
///
/// With an explicit day the date is taken as written. Without one, a week tag
/// (`(Wk2)`) selects the n-th Friday of the month, or the n-th Thursday when a
/// `(Thursday)` tag is present.
fn resolve_expiry(
    day: Option<&str>,
    mon: &str,
    yy: &str,
    tags: &[&str],
    year_pivot: u32,
) -> Result<NaiveDate, FieldError> {
    let invalid = || FieldError::Expiry(format!("{} {mon} {yy}", day.unwrap_or("")).trim().to_string());

    let month = month_number(mon).ok_or_else(invalid)?;
    let yy: u32 = yy.parse().map_err(|_| invalid())?;
    let year = expand_year(yy, year_pivot);

    if let Some(day) = day {
        let day: u32 = day.parse().map_err(|_| invalid())?;
        return NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid);
    }

    let week = tags
        .iter()
        .find_map(|tag| WEEK_TAG.captures(tag.trim()))
        .and_then(|caps| caps[1].parse::<u32>().ok())
        .ok_or_else(invalid)?;
    let weekday = if tags.iter().any(|t| t.trim().eq_ignore_ascii_case("thursday")) {
        Weekday::Thu
    } else {
        Weekday::Fri
    };

    nth_weekday(year, month, weekday, week).ok_or_else(invalid)
}

fn parse_option_type(keyword: &str) -> Result<OptionType, FieldError> {
    OptionType::from_keyword(keyword).ok_or_else(|| FieldError::OptionType(keyword.to_string()))
}

/// Field extraction bound to a parser configuration.
#[derive(Debug, Clone, Copy)]
pub struct Extractor<'c> {
    config: &'c ParserConfig,
}

impl<'c> Extractor<'c> {
    pub fn new(config: &'c ParserConfig) -> Self {
        Self { config }
    }

    /// Extract an option alert (equity, index or futures option).
    pub fn option(&self, caps: &Captures<'_>) -> Result<ExtractedFields, FieldError> {
        let mut fields = self.common(AlertKind::Option, caps)?;

        let tag_text = format!(
            "{}{}",
            caps.name("pre_tags").map_or("", |m| m.as_str()),
            caps.name("post_tags").map_or("", |m| m.as_str())
        );
        let tags: Vec<&str> = TAG
            .captures_iter(&tag_text)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str())
            .collect();

        let expiry = resolve_expiry(
            caps.name("day").map(|m| m.as_str()),
            group(caps, "mon")?,
            group(caps, "yy")?,
            &tags,
            self.config.year_pivot,
        )?;

        fields.option = Some(OptionFields {
            multiplier: group(caps, "multiplier")?.to_string(),
            expiry,
            strike: parse_decimal("strike", group(caps, "strike")?)?,
            option_type: parse_option_type(group(caps, "right")?)?,
            root: caps.name("root").map(|m| m.as_str().to_string()),
        });
        Ok(fields)
    }

    /// Extract an outright futures alert.
    pub fn future(&self, caps: &Captures<'_>) -> Result<ExtractedFields, FieldError> {
        self.common(AlertKind::Future, caps)
    }

    /// Extract an equity/ETF alert.
    pub fn equity(&self, caps: &Captures<'_>) -> Result<ExtractedFields, FieldError> {
        self.common(AlertKind::Equity, caps)
    }

    /// Fields shared by every trade grammar: head, quantity, symbol and tail.
    fn common(&self, kind: AlertKind, caps: &Captures<'_>) -> Result<ExtractedFields, FieldError> {
        let trade_id_raw = group(caps, "trade_id")?;
        let trade_id = trade_id_raw
            .parse::<TradeId>()
            .map_err(|_| FieldError::TradeId(trade_id_raw.to_string()))?;

        let side_raw = group(caps, "side")?;
        let side = Side::from_keyword(side_raw).ok_or_else(|| FieldError::Side(side_raw.to_string()))?;

        if let Some(exchange) = caps.name("exchange") {
            if !self.config.is_known_exchange(exchange.as_str()) {
                return Err(FieldError::UnknownExchange(exchange.as_str().to_string()));
            }
        }

        Ok(ExtractedFields {
            kind,
            trade_id,
            side,
            quantity: parse_quantity(group(caps, "qty")?)?,
            symbol: group(caps, "symbol")?.to_string(),
            option: None,
            price: parse_decimal("price", group(caps, "price")?)?,
            underlying_mark: parse_decimal("underlying_mark", group(caps, "mark")?)?,
            impl_vol: parse_decimal("impl_vol", group(caps, "iv")?)?,
            account: group(caps, "account")?.trim().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{classify, Classification};

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("+1").unwrap(), Quantity { abs: 1, sign: Some(1) });
        assert_eq!(parse_quantity("-12").unwrap(), Quantity { abs: 12, sign: Some(-1) });
        assert_eq!(parse_quantity("+1,000").unwrap().abs, 1000);
        assert_eq!(parse_quantity("12,345,678").unwrap(), Quantity { abs: 12_345_678, sign: None });
        assert!(parse_quantity("+1,00").is_err());
        assert!(parse_quantity("1,,000").is_err());
        assert!(parse_quantity("+").is_err());
        assert!(parse_quantity("99999999999999999999").is_err());
    }

    #[test]
    fn test_parse_decimal_leading_dot() {
        assert_eq!(parse_decimal("price", ".12").unwrap(), dec("0.12"));
        assert_eq!(parse_decimal("price", "4160.25").unwrap(), dec("4160.25"));
        assert!(parse_decimal("price", "1.2.3").is_err());
    }

    #[test]
    fn test_year_window() {
        assert_eq!(expand_year(0, 80), 2000);
        assert_eq!(expand_year(24, 80), 2024);
        assert_eq!(expand_year(79, 80), 2079);
        assert_eq!(expand_year(80, 80), 1980);
        assert_eq!(expand_year(99, 80), 1999);
    }

    #[test]
    fn test_nth_weekday() {
        // May 2024 starts on a Wednesday.
        assert_eq!(nth_weekday(2024, 5, Weekday::Fri, 1), NaiveDate::from_ymd_opt(2024, 5, 3));
        assert_eq!(nth_weekday(2024, 5, Weekday::Fri, 2), NaiveDate::from_ymd_opt(2024, 5, 10));
        assert_eq!(nth_weekday(2024, 5, Weekday::Wed, 1), NaiveDate::from_ymd_opt(2024, 5, 1));
        assert_eq!(nth_weekday(2024, 5, Weekday::Thu, 5), NaiveDate::from_ymd_opt(2024, 5, 30));
        assert_eq!(nth_weekday(2024, 5, Weekday::Fri, 5), NaiveDate::from_ymd_opt(2024, 5, 31));
        assert_eq!(nth_weekday(2024, 5, Weekday::Mon, 5), None);
        assert_eq!(nth_weekday(2024, 5, Weekday::Mon, 0), None);
    }

    #[test]
    fn test_resolve_expiry() {
        assert_eq!(
            resolve_expiry(Some("17"), "MAY", "24", &[], 80).unwrap(),
            NaiveDate::from_ymd_opt(2024, 5, 17).unwrap()
        );
        assert_eq!(
            resolve_expiry(None, "MAY", "24", &["Wk2"], 80).unwrap(),
            NaiveDate::from_ymd_opt(2024, 5, 10).unwrap()
        );
        assert_eq!(
            resolve_expiry(None, "MAY", "24", &["Thursday", "Wk2"], 80).unwrap(),
            NaiveDate::from_ymd_opt(2024, 5, 9).unwrap()
        );
        assert!(resolve_expiry(Some("31"), "FEB", "24", &[], 80).is_err());
        assert!(resolve_expiry(Some("1"), "FOO", "24", &[], 80).is_err());
        assert!(resolve_expiry(None, "MAY", "24", &["Weeklys"], 80).is_err());
    }

    #[test]
    fn test_extract_option() {
        let config = ParserConfig::default();
        let text = "#66066620674 SOLD -12 SPY 100 17 MAY 24 500 PUT @.12 MARK=520.79 IMPL VOL=13.29% , ACCOUNT *****0960TDA";
        let Classification::Option(caps) = classify(text) else {
            panic!("expected option");
        };
        let fields = Extractor::new(&config).option(&caps).unwrap();

        assert_eq!(fields.trade_id, 66066620674);
        assert_eq!(fields.side, Side::Sold);
        assert_eq!(fields.quantity, Quantity { abs: 12, sign: Some(-1) });
        let option = fields.option.unwrap();
        assert_eq!(option.multiplier, "100");
        assert_eq!(option.expiry, NaiveDate::from_ymd_opt(2024, 5, 17).unwrap());
        assert_eq!(option.strike, dec("500"));
        assert_eq!(option.option_type, OptionType::Put);
        assert_eq!(fields.price, dec("0.12"));
        assert_eq!(fields.impl_vol, dec("13.29"));
    }

    #[test]
    fn test_unknown_exchange_rejected() {
        let config = ParserConfig::default();
        let text = "#1 BOT +1 SPY @520 ZZZZ MARK=520.79 IMPL VOL=13% , ACCOUNT A";
        let Classification::Equity(caps) = classify(text) else {
            panic!("expected equity");
        };
        assert_eq!(
            Extractor::new(&config).equity(&caps),
            Err(FieldError::UnknownExchange("ZZZZ".to_string()))
        );
    }
}
