//! Numeric coercion and money formatting.
//!
//! Two separate paths: [`to_amount`] coerces anything to a number for
//! arithmetic (missing or garbage becomes zero), while [`format_money`]
//! prints a placeholder for absent values instead of `0.00`.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

/// Printed in place of an absent amount.
pub const MONEY_PLACEHOLDER: &str = "-";

/// Coerce an attribute value to a number. Missing, empty or non-numeric is zero.
pub fn to_amount(value: Option<&str>) -> Decimal {
    value.and_then(parse_amount).unwrap_or(Decimal::ZERO)
}

/// Parse a plain (`1234.5`) or scientific (`1.2e3`) numeric literal.
pub fn parse_amount(value: &str) -> Option<Decimal> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .ok()
}

/// Format an attribute value as money, or the placeholder when absent/empty.
pub fn format_money(value: Option<&str>) -> String {
    match value {
        None => MONEY_PLACEHOLDER.to_string(),
        Some(v) if v.is_empty() => MONEY_PLACEHOLDER.to_string(),
        Some(v) => format_amount(to_amount(Some(v))),
    }
}

/// Two decimals, comma thousands separators, dot decimal point.
pub fn format_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let s = format!("{:.2}", rounded.abs());
    let (integer_part, decimal_part) = s.split_once('.').unwrap_or((s.as_str(), "00"));

    let chars: Vec<char> = integer_part.chars().collect();
    let mut formatted = String::with_capacity(chars.len() + chars.len() / 3 + 4);

    if rounded.is_sign_negative() && !rounded.is_zero() {
        formatted.push('-');
    }
    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            formatted.push(',');
        }
        formatted.push(*c);
    }

    format!("{}.{}", formatted, decimal_part)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_amount() {
        assert_eq!(to_amount(Some("116.00")), Decimal::from_str("116").unwrap());
        assert_eq!(to_amount(Some(" 5.5 ")), Decimal::from_str("5.5").unwrap());
        assert_eq!(to_amount(Some("1e3")), Decimal::from(1000));
        assert_eq!(to_amount(Some("")), Decimal::ZERO);
        assert_eq!(to_amount(Some("n/a")), Decimal::ZERO);
        assert_eq!(to_amount(None), Decimal::ZERO);
    }

    #[test]
    fn test_format_money_placeholder() {
        assert_eq!(format_money(None), "-");
        assert_eq!(format_money(Some("")), "-");
        assert_eq!(format_money(Some("0")), "0.00");
        assert_eq!(format_money(Some("abc")), "0.00");
    }

    #[test]
    fn test_format_money_two_decimals() {
        assert_eq!(format_money(Some("116")), "116.00");
        assert_eq!(format_money(Some("116.5")), "116.50");
        assert_eq!(format_money(Some("116.123456")), "116.12");
        assert_eq!(format_money(Some("0.005")), "0.01");
        assert_eq!(format_money(Some("999.995")), "1,000.00");
    }

    #[test]
    fn test_format_amount_thousands() {
        assert_eq!(format_amount(Decimal::from_str("1234567.891").unwrap()), "1,234,567.89");
        assert_eq!(format_amount(Decimal::from_str("100000").unwrap()), "100,000.00");
        assert_eq!(format_amount(Decimal::from_str("-1500.5").unwrap()), "-1,500.50");
        assert_eq!(format_amount(Decimal::from_str("-0.001").unwrap()), "0.00");
    }
}
