//! Currency helpers used around the engine.
//!
//! The engine itself never converts: every computation runs in a single
//! currency and carries the code through as an opaque tag. These helpers are
//! for callers that need to present or re-denominate the results.

use crate::error::{EngineError, Result};
use crate::money::Money;
use rust_decimal::Decimal;

/// Fixed rates, expressed as units of the currency per US dollar.
const RATES: [(&str, Decimal); 5] = [
    ("USD", Decimal::from_parts(100, 0, 0, false, 2)),
    ("EUR", Decimal::from_parts(85, 0, 0, false, 2)),
    ("GBP", Decimal::from_parts(73, 0, 0, false, 2)),
    ("CAD", Decimal::from_parts(125, 0, 0, false, 2)),
    ("AUD", Decimal::from_parts(135, 0, 0, false, 2)),
];

fn rate(code: &str) -> Option<Decimal> {
    RATES
        .iter()
        .find(|(c, _)| c.eq_ignore_ascii_case(code))
        .map(|(_, r)| *r)
}

/// Currency codes [`convert`] knows a rate for.
pub fn supported_currencies() -> Vec<&'static str> {
    RATES.iter().map(|(code, _)| *code).collect()
}

/// Converts `amount` from one currency to another via US dollars, rounded
/// to the cent.
pub fn convert(amount: Money, from: &str, to: &str) -> Result<Money> {
    if from.eq_ignore_ascii_case(to) {
        return Ok(amount);
    }
    let from_rate =
        rate(from).ok_or_else(|| EngineError::invalid(format!("unsupported currency {}", from)))?;
    let to_rate =
        rate(to).ok_or_else(|| EngineError::invalid(format!("unsupported currency {}", to)))?;

    let converted = amount
        .as_decimal()
        .checked_div(from_rate)
        .and_then(|usd| usd.checked_mul(to_rate))
        .ok_or_else(|| EngineError::invalid(format!("amount {} is out of range", amount)))?;
    Ok(Money::new(converted))
}

/// Renders `amount` for display, e.g. `$1,234.50` or `CHF 12.00`.
pub fn format(amount: Money, code: &str) -> String {
    let digits = group_thousands(&amount.abs().to_string());
    let sign = if amount.is_negative() { "-" } else { "" };
    match symbol(code) {
        Some(symbol) => format!("{}{}{}", sign, symbol, digits),
        None => format!("{}{} {}", sign, code.to_ascii_uppercase(), digits),
    }
}

fn symbol(code: &str) -> Option<&'static str> {
    match code.to_ascii_uppercase().as_str() {
        "USD" => Some("$"),
        "EUR" => Some("€"),
        "GBP" => Some("£"),
        "CAD" => Some("CA$"),
        "AUD" => Some("A$"),
        _ => None,
    }
}

fn group_thousands(plain: &str) -> String {
    let (whole, fraction) = plain.split_once('.').unwrap_or((plain, "00"));
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3 + 3);
    for (index, ch) in whole.chars().enumerate() {
        if index > 0 && (whole.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped.push('.');
    grouped.push_str(fraction);
    grouped
}
