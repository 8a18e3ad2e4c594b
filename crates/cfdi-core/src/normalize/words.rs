//! Amount in words ("importe con letra") for Mexican peso amounts.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Appended after the cents fraction.
pub const CURRENCY_SUFFIX: &str = "M.N.";

/// 0..=29 have irregular forms in Spanish.
const UNITS: [&str; 30] = [
    "cero", "uno", "dos", "tres", "cuatro", "cinco", "seis", "siete", "ocho", "nueve", "diez",
    "once", "doce", "trece", "catorce", "quince", "dieciseis", "diecisiete", "dieciocho",
    "diecinueve", "veinte", "veintiuno", "veintidos", "veintitres", "veinticuatro",
    "veinticinco", "veintiseis", "veintisiete", "veintiocho", "veintinueve",
];

const TENS: [&str; 10] = [
    "", "", "veinte", "treinta", "cuarenta", "cincuenta", "sesenta", "setenta", "ochenta",
    "noventa",
];

const HUNDREDS: [&str; 10] = [
    "", "ciento", "doscientos", "trescientos", "cuatrocientos", "quinientos", "seiscientos",
    "setecientos", "ochocientos", "novecientos",
];

/// Spanish words for a non-negative integer.
///
/// Values of one billion and above fall back to plain numerals.
pub fn number_to_words(n: u64) -> String {
    match n {
        0..=29 => UNITS[n as usize].to_string(),
        30..=99 => {
            let (tens, rest) = (n / 10, n % 10);
            if rest == 0 {
                TENS[tens as usize].to_string()
            } else {
                format!("{} y {}", TENS[tens as usize], UNITS[rest as usize])
            }
        }
        100 => "cien".to_string(),
        101..=999 => {
            let (hundreds, rest) = (n / 100, n % 100);
            join_rest(HUNDREDS[hundreds as usize].to_string(), rest)
        }
        1_000..=999_999 => {
            let (thousands, rest) = (n / 1_000, n % 1_000);
            let prefix = if thousands == 1 {
                "mil".to_string()
            } else {
                format!("{} mil", number_to_words(thousands))
            };
            join_rest(prefix, rest)
        }
        1_000_000..=999_999_999 => {
            let (millions, rest) = (n / 1_000_000, n % 1_000_000);
            let prefix = if millions == 1 {
                "un millon".to_string()
            } else {
                format!("{} millones", number_to_words(millions))
            };
            join_rest(prefix, rest)
        }
        _ => n.to_string(),
    }
}

fn join_rest(prefix: String, rest: u64) -> String {
    if rest == 0 {
        prefix
    } else {
        format!("{} {}", prefix, number_to_words(rest))
    }
}

/// Full "importe con letra" line, e.g. `ciento dieciseis pesos 00/100 M.N.`.
///
/// The amount is rounded to cents first so a fraction such as `.999` carries
/// into the integer part instead of printing `100/100`. Negative amounts are
/// prefixed with `menos`.
pub fn amount_to_words(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let magnitude = rounded.abs();
    let integer = magnitude.trunc();
    let cents = ((magnitude - integer) * Decimal::ONE_HUNDRED)
        .to_u64()
        .unwrap_or(0);

    let words = match integer.to_u64() {
        Some(n) => number_to_words(n),
        None => integer.to_string(),
    };
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "menos "
    } else {
        ""
    };

    format!("{}{} pesos {:02}/100 {}", sign, words, cents, CURRENCY_SUFFIX)
}
