//! Validation utilities for the inventory platform

use rust_decimal::Decimal;
use serde_json::Value;
use thiserror::Error;

/// Reasons a price value cannot be accepted
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriceError {
    #[error("Invalid price format")]
    Malformed,

    #[error("Price cannot be negative")]
    Negative,
}

/// Parse a price into an exact decimal.
///
/// Accepts a JSON string (`"19.99"`, `"1.5e2"`) or a JSON number. Numbers are
/// parsed from their textual form so no binary floating-point value is
/// involved. Input that cannot be represented without rounding is rejected.
pub fn parse_price(value: &Value) -> Result<Decimal, PriceError> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return Err(PriceError::Malformed),
    };

    if text.is_empty() {
        return Err(PriceError::Malformed);
    }

    let mut price = match Decimal::from_str_exact(&text) {
        Ok(price) => price,
        Err(_) => parse_scientific_exact(&text).ok_or(PriceError::Malformed)?,
    };

    if price.is_sign_negative() {
        if !price.is_zero() {
            return Err(PriceError::Negative);
        }
        // "-0" parses with the sign bit set
        price.set_sign_positive(true);
    }
    Ok(price)
}

/// Exact parse of `<mantissa>e<exponent>`; `None` if the value would round
fn parse_scientific_exact(text: &str) -> Option<Decimal> {
    let (mantissa, exponent) = text.split_once(|c: char| c == 'e' || c == 'E')?;
    let mantissa = Decimal::from_str_exact(mantissa).ok()?;
    let exponent: i64 = exponent.parse().ok()?;

    if exponent >= 0 {
        if mantissa.is_zero() {
            return Some(mantissa);
        }
        // Past this exponent every non-zero mantissa overflows
        if exponent > 28 + i64::from(mantissa.scale()) {
            return None;
        }
        (0..exponent).try_fold(mantissa, |acc, _| acc.checked_mul(Decimal::TEN))
    } else {
        let shift = u32::try_from(exponent.checked_neg()?).ok()?;
        let scale = mantissa.scale().checked_add(shift)?;
        Decimal::try_from_i128_with_scale(mantissa.mantissa(), scale).ok()
    }
}

/// Validate that an integer count is non-negative and fits the stock column
pub fn validate_stock_count(value: i64) -> Result<i32, &'static str> {
    if value < 0 {
        return Err("must be a non-negative integer");
    }
    i32::try_from(value).map_err(|_| "is too large")
}

/// Format the message for a set of missing request fields
pub fn missing_fields_message(fields: &[&str]) -> String {
    format!("Missing fields: {}", fields.join(", "))
}
