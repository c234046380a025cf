//! Alert category classification.
//!
//! Decides which alert shape normalized text matches. Rules are tried in a
//! fixed order and the first match wins:
//!
//! 1. No `#<digits> BOT|SOLD` head: non-trade alert.
//! 2. Option grammar (multiplier, date, strike and `PUT`/`CALL` present).
//! 3. Symbol token starting with `/`: future.
//! 4. Equity/ETF grammar.
//! 5. Unmatched.
//!
//! All trade grammars share the same tail (`@price … MARK= … IMPL VOL= …
//! ACCOUNT …`), so the option rule must be tried before the more permissive
//! equity rule.

use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Decimal literal: `1`, `1.23`, `.45`.
const NUM: &str = r"(?:\d+(?:\.\d+)?|\.\d+)";
/// Quantity with optional sign and thousands separators; grouping is
/// checked during extraction.
const QTY: &str = r"[+-]?\d[\d,]*";
const HEAD: &str = r"^#(?P<trade_id>\d+) (?P<side>BOT|SOLD)\b";
/// Zero or more parenthesized tags such as `(Weeklys)` or `(Wk2)`.
const TAGS: &str = r"(?: \([^)]*\))*";

fn tail() -> String {
    format!(
        r" @(?P<price>{NUM})(?: (?P<exchange>[A-Z]+(?: [A-Z]+)*))? MARK=(?P<mark>{NUM}) IMPL VOL=(?P<iv>{NUM})% , ACCOUNT (?P<account>\S.*)$"
    )
}

static TRADE_HEAD: LazyLock<Regex> = LazyLock::new(|| Regex::new(HEAD).unwrap());

static OPTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"{HEAD} (?P<qty>{QTY}) (?P<symbol>/?[A-Z][A-Z0-9.]*) (?P<multiplier>\d+(?:/\d+)?)(?P<pre_tags>{TAGS}) (?:(?P<day>\d{{1,2}}) )?(?P<mon>[A-Z]{{3}}) (?P<yy>\d{{2}})(?P<post_tags>{TAGS})(?: (?P<root>/[A-Z0-9]+))? (?P<strike>{NUM}) (?P<right>PUT|CALL){}",
        tail()
    ))
    .unwrap()
});

static FUTURE_SYMBOL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"{HEAD} {QTY} /")).unwrap());

static FUTURE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"{HEAD} (?P<qty>{QTY}) (?P<symbol>/[A-Z][A-Z0-9]*){}",
        tail()
    ))
    .unwrap()
});

static EQUITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"{HEAD} (?P<qty>{QTY}) (?P<symbol>[A-Z][A-Z0-9.]*){}",
        tail()
    ))
    .unwrap()
});

/// Any instrument-looking token right after the head (and optional qty).
static SYMBOL_PROBE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"{HEAD}(?: {QTY})? (?P<symbol>/?[A-Z][A-Z0-9.]*)(?: |$)")).unwrap()
});

/// Alert category without captures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    NonTrade,
    Option,
    Future,
    Equity,
    Unmatched,
}

/// Classification result with the captures the extractor needs.
#[derive(Debug)]
pub enum Classification<'t> {
    NonTrade,
    Option(Captures<'t>),
    Future(Captures<'t>),
    Equity(Captures<'t>),
    Unmatched,
}

impl Classification<'_> {
    pub fn category(&self) -> Category {
        match self {
            Classification::NonTrade => Category::NonTrade,
            Classification::Option(_) => Category::Option,
            Classification::Future(_) => Category::Future,
            Classification::Equity(_) => Category::Equity,
            Classification::Unmatched => Category::Unmatched,
        }
    }
}

/// Classify normalized subject text.
pub fn classify(text: &str) -> Classification<'_> {
    if !TRADE_HEAD.is_match(text) {
        return Classification::NonTrade;
    }

    if let Some(caps) = OPTION.captures(text) {
        return Classification::Option(caps);
    }

    if FUTURE_SYMBOL.is_match(text) {
        return match FUTURE.captures(text) {
            Some(caps) => Classification::Future(caps),
            None => Classification::Unmatched,
        };
    }

    match EQUITY.captures(text) {
        Some(caps) => Classification::Equity(caps),
        None => Classification::Unmatched,
    }
}

/// Whether text carries a trade id followed by a side keyword.
pub fn has_trade_head(text: &str) -> bool {
    TRADE_HEAD.is_match(text)
}

/// The first instrument-looking token after the trade head, if any.
pub fn probe_symbol(text: &str) -> Option<&str> {
    SYMBOL_PROBE
        .captures(text)
        .and_then(|caps| caps.name("symbol"))
        .map(|m| m.as_str())
}
