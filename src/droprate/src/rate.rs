//! Rate token parsing
//!
//! Rates are written as integers (`0`), decimals (`0.5`) or ratios
//! (`1/1000`). Integer ratios are reduced before the single floating-point
//! division, so a ratio is never rounded twice.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RateError {
    #[error("empty rate token")]
    Empty,

    #[error("rate '{0}' is not a number")]
    NotANumber(String),

    #[error("rate '{0}' is negative")]
    Negative(String),

    #[error("rate '{0}' has a zero denominator")]
    ZeroDenominator(String),
}

/// Parse a rate token into a probability.
///
/// The result is not clamped: `2/1` yields `2.0`. Callers decide what to do
/// with values above 1.
pub fn parse_rate(token: &str) -> Result<f64, RateError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(RateError::Empty);
    }

    match token.split_once('/') {
        Some((num, den)) => parse_ratio(token, num.trim(), den.trim()),
        None => parse_decimal(token, token),
    }
}

fn parse_ratio(token: &str, num: &str, den: &str) -> Result<f64, RateError> {
    if num.starts_with('-') || den.starts_with('-') {
        return Err(RateError::Negative(token.to_string()));
    }

    if let (Ok(num), Ok(den)) = (num.parse::<u128>(), den.parse::<u128>()) {
        if den == 0 {
            return Err(RateError::ZeroDenominator(token.to_string()));
        }
        if num == 0 {
            return Ok(0.0);
        }
        let g = gcd(num, den);
        return Ok((num / g) as f64 / (den / g) as f64);
    }

    // Decimal ratios ("0.5/10") show up in hand-edited files
    let num = parse_decimal(token, num)?;
    let den = parse_decimal(token, den)?;
    if den == 0.0 {
        return Err(RateError::ZeroDenominator(token.to_string()));
    }
    Ok(num / den)
}

fn parse_decimal(token: &str, text: &str) -> Result<f64, RateError> {
    let value: f64 = text
        .parse()
        .map_err(|_| RateError::NotANumber(token.to_string()))?;

    if !value.is_finite() {
        return Err(RateError::NotANumber(token.to_string()));
    }
    if value < 0.0 {
        return Err(RateError::Negative(token.to_string()));
    }
    // Normalizes "-0"
    Ok(value.abs())
}

fn gcd(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}
