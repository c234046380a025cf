//! Cross-field validation and record assembly.

use crate::extract::{ExtractedFields, FieldError};
use alert_core::{AlertKind, TradeAlertRecord};
use rust_decimal::Decimal;

/// Check extracted fields against the record invariants and build the record.
///
/// The explicit quantity sign, when present, must agree with the side
/// keyword; the stored `qty_signed` always takes its sign from the side.
pub fn assemble(fields: ExtractedFields) -> Result<TradeAlertRecord, FieldError> {
    let ExtractedFields {
        kind,
        trade_id,
        side,
        quantity,
        symbol,
        option,
        price,
        underlying_mark,
        impl_vol,
        account,
    } = fields;

    if quantity.abs == 0 {
        return Err(FieldError::ZeroQuantity);
    }
    let magnitude = quantity.abs as i64;
    if let Some(sign) = quantity.sign {
        if sign != side.sign() {
            return Err(FieldError::SignMismatch {
                side,
                qty: sign * magnitude,
            });
        }
    }

    let is_option = kind == AlertKind::Option;
    if is_option != option.is_some() {
        return Err(FieldError::OptionFieldsMismatch(kind));
    }
    if kind == AlertKind::Future && !symbol.starts_with('/') {
        return Err(FieldError::FutureSymbol(symbol));
    }

    for (name, value) in [
        ("price", price),
        ("underlying_mark", underlying_mark),
        ("impl_vol", impl_vol),
    ] {
        if value < Decimal::ZERO {
            return Err(FieldError::Negative(name));
        }
    }
    if symbol.is_empty() {
        return Err(FieldError::Empty("symbol"));
    }
    if account.is_empty() {
        return Err(FieldError::Empty("account"));
    }

    let (contract_multiplier, expiry_date, strike, option_type, option_root) = match option {
        Some(opt) => {
            if opt.multiplier.is_empty() {
                return Err(FieldError::Empty("contract_multiplier"));
            }
            if opt.strike < Decimal::ZERO {
                return Err(FieldError::Negative("strike"));
            }
            (
                opt.multiplier,
                Some(opt.expiry),
                Some(opt.strike),
                Some(opt.option_type),
                opt.root,
            )
        }
        None => (String::new(), None, None, None, None),
    };

    Ok(TradeAlertRecord {
        trade_id,
        side,
        qty_signed: side.sign() * magnitude,
        qty_abs: quantity.abs,
        symbol,
        is_option,
        contract_multiplier,
        expiry_date,
        strike,
        option_type,
        price,
        underlying_mark,
        impl_vol,
        account,
        option_root,
    })
}
