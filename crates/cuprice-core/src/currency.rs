//! Currency symbols and price formatting
//!
//! Two distinct renderings exist: the short symbol shown on plan cards
//! (`C$`, `A$`, default `$`) and the en-US currency style used by the custom
//! plan builder (`CA$1,080.00`).

use rust_decimal::{Decimal, RoundingStrategy};

/// Short card symbol for a currency code. Unknown codes render as `$`.
pub fn currency_symbol(currency: &str) -> &'static str {
    match currency {
        "USD" => "$",
        "EUR" => "€",
        "GBP" => "£",
        "CAD" => "C$",
        "AUD" => "A$",
        _ => "$",
    }
}

/// en-US currency style prefix for a currency code.
fn display_prefix(currency: &str) -> String {
    match currency {
        "USD" => "$".to_string(),
        "EUR" => "€".to_string(),
        "GBP" => "£".to_string(),
        "CAD" => "CA$".to_string(),
        "AUD" => "A$".to_string(),
        other => format!("{} ", other.to_uppercase()),
    }
}

/// Round to two fractional digits, half away from zero.
#[inline]
pub fn round_money(amount: Decimal) -> Decimal {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    if rounded.is_zero() {
        rounded = Decimal::ZERO;
    }
    rounded.rescale(2);
    rounded
}

/// Plain two-digit rendering without grouping, e.g. `1080.00`.
pub fn format_fixed(amount: Decimal) -> String {
    round_money(amount).to_string()
}

/// Full currency rendering with thousands grouping, e.g. `$1,080.00`.
pub fn format_price(amount: Decimal, currency: &str) -> String {
    let rounded = round_money(amount);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let digits = rounded.abs().to_string();

    let (integer, fraction) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, ch) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!(
        "{}{}{}.{}",
        if negative { "-" } else { "" },
        display_prefix(currency),
        grouped,
        fraction
    )
}

/// Whole-number percentage of a fractional rate (`0.15` → `15`).
pub fn rate_percent(rate: Decimal) -> i64 {
    use rust_decimal::prelude::ToPrimitive;

    (rate * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .unwrap_or(0)
}
