//! Parsing of free-text numeric input.
//!
//! Every amount the user types (norms, odometer readings, distances, hours,
//! litres) must be a finite, non-negative decimal. Tokens are separated by
//! whitespace.

use crate::error::{Error, Result};

/// Format description used when a single amount is expected.
pub const ONE_AMOUNT: &str = "a non-negative number";

/// Parse one non-negative amount.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] if `text` is not a finite number ≥ 0.
pub fn parse_amount(text: &str) -> Result<f64> {
    parse_token(text.trim(), ONE_AMOUNT)
}

/// Parse exactly `N` whitespace-separated non-negative amounts.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] carrying `expected` if the arity is wrong
/// or any token is not a finite number ≥ 0.
pub fn parse_amounts<const N: usize>(text: &str, expected: &'static str) -> Result<[f64; N]> {
    let tokens = split_exact::<N>(text, expected)?;
    let mut values = [0.0; N];
    for (value, token) in values.iter_mut().zip(tokens) {
        *value = parse_token(token, expected)?;
    }
    Ok(values)
}

/// Split `text` into exactly `N` whitespace-separated tokens.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] if the token count differs from `N`.
pub fn split_exact<'a, const N: usize>(
    text: &'a str,
    expected: &'static str,
) -> Result<[&'a str; N]> {
    let tokens: Vec<&'a str> = text.split_whitespace().collect();
    <[&'a str; N]>::try_from(tokens).map_err(|_| Error::invalid_input(expected, text.trim()))
}

/// Check that `token` reads as a non-negative amount.
#[must_use]
pub fn is_amount(token: &str) -> bool {
    parse_token(token.trim(), ONE_AMOUNT).is_ok()
}

fn parse_token(token: &str, expected: &'static str) -> Result<f64> {
    match token.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => Ok(value),
        _ => Err(Error::invalid_input(expected, token)),
    }
}
