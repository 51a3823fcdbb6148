use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::errors::{Result, ValidationError};

/// Parses localized decimal text into integer cents.
///
/// Accepted shapes: `"2400"`, `"2400,50"`, `"2400.50"`, `"1.234,56"` and
/// `"R$ 12,30"`. Currency symbols and spaces are ignored. With a comma the
/// dots are thousands separators; without one, the last dot is the decimal
/// point. Extra fraction digits are rounded half away from zero.
pub fn parse_cents(input: &str) -> Result<i64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingField("amount".to_string()).into());
    }

    let cleaned: String = trimmed
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, ',' | '.' | '-'))
        .collect();
    if !cleaned.chars().any(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidAmount(input.to_string()).into());
    }

    let normalized = normalize_separators(&cleaned);
    let value = Decimal::from_str(&normalized)
        .map_err(|_| ValidationError::InvalidAmount(input.to_string()))?;

    (value * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or_else(|| ValidationError::InvalidAmount(input.to_string()).into())
}

fn normalize_separators(cleaned: &str) -> String {
    if cleaned.contains(',') {
        return cleaned.replace('.', "").replacen(',', ".", 1);
    }
    match cleaned.rsplit_once('.') {
        Some((int_part, fraction)) if int_part.contains('.') => {
            format!("{}.{}", int_part.replace('.', ""), fraction)
        }
        _ => cleaned.to_string(),
    }
}

/// Formats cents as `1.234,56` (dot thousands, comma decimals).
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    let units = (abs / 100).to_string();
    let fraction = abs % 100;

    let mut grouped = String::with_capacity(units.len() + units.len() / 3);
    for (i, ch) in units.chars().enumerate() {
        if i > 0 && (units.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    format!("{}{},{:02}", sign, grouped, fraction)
}

/// Formats cents with the currency symbol, e.g. `R$ 1.234,56`.
pub fn format_currency(cents: i64) -> String {
    format!("R$ {}", format_cents(cents))
}

/// Converts cents into a `Decimal` amount (for reporting only).
pub fn cents_to_decimal(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}
