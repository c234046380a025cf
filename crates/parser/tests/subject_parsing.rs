//! End-to-end subject parsing against real alert shapes.

use alert_core::{FailReason, OptionType, ParseOutcome, Side, TradeAlertRecord};
use alert_parser::{parse_subject, SubjectParser};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

const SPY_PUT: &str = "#66066620674 SOLD -12 SPY 100 17 MAY 24 500 PUT @.12MARK=520.79 IMPL VOL=13.29% , ACCOUNT *****0960TDA";
const ES_FUTURE: &str =
    "#9917289343 BOT +1 /ESM23 @4160.25MARK=4160.00 IMPL VOL=19.29% , ACCOUNT 49*****60";
const SQQQ_SHARES: &str =
    "#9977956423 BOT +1,000 SQQQ @19.2499MARK=19.2499 IMPL VOL=60.67% , ACCOUNT 49*****60";
const PRICE_ALERT: &str = ".AMZN201204C3340 price alert";

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn success(subject: &str) -> TradeAlertRecord {
    match parse_subject(subject) {
        ParseOutcome::Success(record) => record,
        ParseOutcome::Failure { reason } => panic!("{subject:?} failed: {reason}"),
    }
}

fn reason(subject: &str) -> FailReason {
    parse_subject(subject)
        .fail_reason()
        .unwrap_or_else(|| panic!("{subject:?} unexpectedly parsed"))
}

#[test]
fn test_option_alert_fields() {
    let r = success(SPY_PUT);
    assert_eq!(r.trade_id, 66066620674);
    assert_eq!(r.side, Side::Sold);
    assert_eq!(r.qty_signed, -12);
    assert_eq!(r.qty_abs, 12);
    assert_eq!(r.symbol, "SPY");
    assert!(r.is_option);
    assert_eq!(r.contract_multiplier, "100");
    assert_eq!(r.expiry_date, NaiveDate::from_ymd_opt(2024, 5, 17));
    assert_eq!(r.strike, Some(dec("500")));
    assert_eq!(r.option_type, Some(OptionType::Put));
    assert_eq!(r.price, dec("0.12"));
    assert_eq!(r.underlying_mark, dec("520.79"));
    assert_eq!(r.impl_vol, dec("13.29"));
    assert_eq!(r.account, "*****0960TDA");
    assert_eq!(r.option_root, None);
}

#[test]
fn test_future_alert_fields() {
    let r = success(ES_FUTURE);
    assert_eq!(r.trade_id, 9917289343);
    assert_eq!(r.side, Side::Bought);
    assert_eq!(r.qty_signed, 1);
    assert_eq!(r.qty_abs, 1);
    assert_eq!(r.symbol, "/ESM23");
    assert!(!r.is_option);
    assert_eq!(r.contract_multiplier, "");
    assert_eq!(r.expiry_date, None);
    assert_eq!(r.strike, None);
    assert_eq!(r.option_type, None);
    assert_eq!(r.price, dec("4160.25"));
    assert_eq!(r.underlying_mark, dec("4160.00"));
    assert_eq!(r.impl_vol, dec("19.29"));
    assert_eq!(r.account, "49*****60");
}

#[test]
fn test_equity_alert_strips_thousands_separator() {
    let r = success(SQQQ_SHARES);
    assert_eq!(r.qty_signed, 1000);
    assert_eq!(r.qty_abs, 1000);
    assert_eq!(r.symbol, "SQQQ");
    assert!(!r.is_option);
    assert_eq!(r.price, dec("19.2499"));
    assert_eq!(r.underlying_mark, dec("19.2499"));
    assert_eq!(r.impl_vol, dec("60.67"));
}

#[test]
fn test_price_alert_is_non_trade() {
    assert_eq!(reason(PRICE_ALERT), FailReason::NonTradeAlert);
    assert_eq!(reason(""), FailReason::NonTradeAlert);
    assert_eq!(reason("Order cancelled: SPY"), FailReason::NonTradeAlert);
}

#[test]
fn test_parsing_is_idempotent() {
    for subject in [SPY_PUT, ES_FUTURE, SQQQ_SHARES, PRICE_ALERT, "#1 BOT +1 SPY @x"] {
        assert_eq!(parse_subject(subject), parse_subject(subject));
    }
}

#[test]
fn test_successful_records_are_consistent() {
    let subjects = [
        SPY_PUT,
        ES_FUTURE,
        SQQQ_SHARES,
        "#1 SOLD -5 /ESM24 1/50 MAY 24 (Wk2) /EW2K24 5200 CALL @12.25MARK=5210.5 IMPL VOL=12.3% , ACCOUNT A",
        "#2 BOT +3 QQQ 100 (Weeklys) 3 JUN 24 450 CALL @1.5 MARK=449.1 IMPL VOL=14.1% , ACCOUNT B",
        "#3 SOLD -300 NVDA @901.5 NYSE MARK=901.2 IMPL VOL=44% , ACCOUNT C",
    ];
    for subject in subjects {
        let r = success(subject);
        assert!(r.is_consistent(), "{subject:?} -> {r:?}");
        assert_eq!(r.is_option, !r.contract_multiplier.is_empty());
        assert_eq!(r.qty_abs, r.qty_signed.unsigned_abs());
        assert_eq!(r.side == Side::Bought, r.qty_signed > 0);
    }
}

#[test]
fn test_exchange_tag_is_skipped() {
    let plain = success(SPY_PUT);
    for exchange in ["CBOE", "NYSE", "BATS"] {
        let tagged = SPY_PUT.replace("@.12MARK=", &format!("@.12{exchange}MARK="));
        assert_eq!(success(&tagged), plain, "{exchange}");

        let spaced = SPY_PUT.replace("@.12MARK=", &format!("@.12 {exchange} MARK="));
        assert_eq!(success(&spaced), plain, "{exchange} spaced");
    }
}

#[test]
fn test_unknown_exchange_tag_fails() {
    let tagged = SPY_PUT.replace("@.12MARK=", "@.12ZZZXMARK=");
    assert_eq!(reason(&tagged), FailReason::UnrecognizedTradeFormat);
}

#[test]
fn test_garbled_numeric_tail_is_unrecognized() {
    let subjects = [
        "#66066620674 SOLD -12 SPY 100 17 MAY 24 500 PUT @.1.2MARK=520.79 IMPL VOL=13.29% , ACCOUNT X",
        "#66066620674 SOLD -12 SPY 100 17 MAY 24 500 PUT @.12MARK=abc IMPL VOL=13.29% , ACCOUNT X",
        "#66066620674 SOLD -12 SPY 100 17 MAY 24 500 PUT @.12MARK=520.79 IMPL VOL=% , ACCOUNT X",
        "#66066620674 SOLD -12 SPY 100 17 MAY 24 500 PUT @.12MARK=520.79 IMPL VOL=13.29% , ACCOUNT",
        "#9977956423 BOT +1,00 SQQQ @19.2499MARK=19.2499 IMPL VOL=60.67% , ACCOUNT 49*****60",
        "#9917289343 BOT +1 /ESM23 @MARK=4160.00 IMPL VOL=19.29% , ACCOUNT 49*****60",
    ];
    for subject in subjects {
        assert_eq!(reason(subject), FailReason::UnrecognizedTradeFormat, "{subject:?}");
    }
}

#[test]
fn test_invalid_calendar_date_is_unrecognized() {
    let subject = SPY_PUT.replace("17 MAY 24", "31 FEB 24");
    assert_eq!(reason(&subject), FailReason::UnrecognizedTradeFormat);

    let subject = SPY_PUT.replace("17 MAY 24", "17 MAI 24");
    assert_eq!(reason(&subject), FailReason::UnrecognizedTradeFormat);
}

#[test]
fn test_sign_side_disagreement_is_unrecognized() {
    let subject = SPY_PUT.replace("SOLD -12", "SOLD +12");
    assert_eq!(reason(&subject), FailReason::UnrecognizedTradeFormat);

    let subject = SQQQ_SHARES.replace("BOT +1,000", "BOT -1,000");
    assert_eq!(reason(&subject), FailReason::UnrecognizedTradeFormat);
}

#[test]
fn test_trade_head_without_symbol_is_not_a_trade() {
    assert_eq!(reason("#9917289343 BOT"), FailReason::NotATrade);
    assert_eq!(
        reason("#9917289343 SOLD -1 @4160.25MARK=4160.00 IMPL VOL=19.29% , ACCOUNT 49*****60"),
        FailReason::NotATrade
    );
}

#[test]
fn test_ratio_multiplier_kept_verbatim() {
    let r = success(
        "#5 SOLD -1 /ESM24 1/50 MAY 24 (Wk2) /EW2K24 5200 CALL @12.25MARK=5210.5 IMPL VOL=12.3% , ACCOUNT A",
    );
    assert_eq!(r.contract_multiplier, "1/50");
    assert_eq!(r.symbol, "/ESM24");
    assert_eq!(r.option_root.as_deref(), Some("/EW2K24"));
    // Second Friday of May 2024.
    assert_eq!(r.expiry_date, NaiveDate::from_ymd_opt(2024, 5, 10));
    assert_eq!(r.strike, Some(dec("5200")));
    assert_eq!(r.option_type, Some(OptionType::Call));
}

#[test]
fn test_thursday_weekly_future_option() {
    let r = success(
        "#6 BOT +2 /NQM24 1/20 MAY 24 (Thursday) (Wk3) /QN3K24 18000 PUT @55 CBOEMARK=18100 IMPL VOL=18% , ACCOUNT A",
    );
    assert_eq!(r.expiry_date, NaiveDate::from_ymd_opt(2024, 5, 16));
    assert_eq!(r.contract_multiplier, "1/20");
}

#[test]
fn test_month_only_expiry_without_week_tag_fails() {
    assert_eq!(
        reason("#5 SOLD -1 /ESM24 1/50 MAY 24 /EW2K24 5200 CALL @12.25MARK=5210.5 IMPL VOL=12.3% , ACCOUNT A"),
        FailReason::UnrecognizedTradeFormat
    );
}

#[test]
fn test_weeklys_tag_consumed() {
    let r = success(
        "#2 BOT +3 QQQ 100 (Weeklys) 3 JUN 24 450 CALL @1.5MARK=449.1 IMPL VOL=14.1% , ACCOUNT B",
    );
    assert_eq!(r.expiry_date, NaiveDate::from_ymd_opt(2024, 6, 3));
    assert_eq!(r.strike, Some(dec("450")));
}

#[test]
fn test_noise_token_and_quotes_tolerated() {
    let noisy = format!("\"{}\"", SPY_PUT.replace("#66066620674 ", "#66066620674 tIP "));
    assert_eq!(success(&noisy), success(SPY_PUT));
}

#[test]
fn test_noise_word_kept_outside_trade_head() {
    let tip = success("#1 BOT +10 TIP @110.5MARK=110.5 IMPL VOL=5.1% , ACCOUNT 49*****60");
    assert_eq!(tip.symbol, "TIP");
    assert_eq!(tip.qty_signed, 10);

    let account = success(
        "#1 BOT +1 SPY 100 17 MAY 24 500 PUT @.12 MARK=520.79 IMPL VOL=13.29% , ACCOUNT TIP-1",
    );
    assert_eq!(account.account, "TIP-1");

    let both = success("#2 tIP SOLD -5 TIP @110.5 MARK=110.5 IMPL VOL=5.1% , ACCOUNT tip");
    assert_eq!(both.symbol, "TIP");
    assert_eq!(both.account, "tip");
}

#[test]
fn test_year_pivot_is_configurable() {
    let subject = SPY_PUT.replace("17 MAY 24", "17 MAY 85");
    assert_eq!(success(&subject).expiry_date, NaiveDate::from_ymd_opt(1985, 5, 17));

    let mut config = alert_core::config::ParserConfig::default();
    config.year_pivot = 90;
    let parser = SubjectParser::new(config).unwrap();
    let r = parser.parse(&subject);
    assert_eq!(r.record().unwrap().expiry_date, NaiveDate::from_ymd_opt(2085, 5, 17));
}

#[test]
fn test_parser_shared_across_threads() {
    let owned = SubjectParser::default();
    let parser = &owned;
    let subjects: Vec<String> = (0..64)
        .map(|i| SPY_PUT.replace("#66066620674", &format!("#{}", 1000 + i)))
        .collect();

    let outcomes: Vec<ParseOutcome> = std::thread::scope(|scope| {
        let handles: Vec<_> = subjects
            .chunks(16)
            .map(|chunk| scope.spawn(move || parser.parse_batch(chunk).outcomes))
            .collect();
        handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect()
    });

    assert_eq!(outcomes.len(), 64);
    for (i, outcome) in outcomes.iter().enumerate() {
        assert_eq!(outcome.record().unwrap().trade_id, 1000 + i as u64);
    }
}

#[test]
fn test_outcome_serializes_with_tag() {
    let json = serde_json::to_value(parse_subject(PRICE_ALERT)).unwrap();
    assert_eq!(json["outcome"], "failure");
    assert_eq!(json["reason"], "non_trade_alert");
}
