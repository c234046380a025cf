//! Failure classification for subjects that did not become records.

use crate::grammar::{self, Category};
use alert_core::FailReason;

/// Assign a failure reason to normalized text that reached `category`
/// without producing a record.
///
/// - non-trade shape, or a "price alert" notification: `non_trade_alert`
/// - trade head but no instrument symbol: `not_a_trade`
/// - trade head and symbol but a broken remainder: `unrecognized_trade_format`
pub fn classify_failure(text: &str, category: Category) -> FailReason {
    if category == Category::NonTrade
        || !grammar::has_trade_head(text)
        || text.to_ascii_lowercase().contains("price alert")
    {
        return FailReason::NonTradeAlert;
    }

    match category {
        // A trade grammar matched, so a symbol was present; extraction or
        // validation rejected the fields.
        Category::Option | Category::Future | Category::Equity => {
            FailReason::UnrecognizedTradeFormat
        }
        Category::Unmatched | Category::NonTrade => match grammar::probe_symbol(text) {
            Some(_) => FailReason::UnrecognizedTradeFormat,
            None => FailReason::NotATrade,
        },
    }
}
