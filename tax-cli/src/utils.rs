use rust_decimal::Decimal;
use thiserror::Error;

/// Error returned when a string cannot be parsed as a money amount.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseAmountError {
    #[error("amount is empty")]
    Empty,

    #[error("invalid amount '{input}': {reason}")]
    Invalid { input: String, reason: String },
}

/// Removes `$` signs and `,` thousands separators, then trims whitespace.
fn normalize_amount_input(s: &str) -> String {
    let stripped: String = s.chars().filter(|c| !matches!(c, ',' | '$')).collect();
    stripped.trim().to_string()
}

/// Parses a user-entered amount into a [`Decimal`].
///
/// Accepts `"60000"`, `"60,000.50"` and `"$60,000"`. Empty or
/// whitespace-only input is an error rather than zero. Negative amounts
/// parse; rejecting them is up to the calculator.
pub fn parse_amount(s: &str) -> Result<Decimal, ParseAmountError> {
    let normalized = normalize_amount_input(s);
    if normalized.is_empty() {
        return Err(ParseAmountError::Empty);
    }
    normalized.parse().map_err(|e: rust_decimal::Error| {
        tracing::debug!(input = %s, "invalid amount: {}", e);
        ParseAmountError::Invalid {
            input: s.to_string(),
            reason: e.to_string(),
        }
    })
}
