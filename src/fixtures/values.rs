//! Fixture Values
//!
//! Parsers for the scalar formats used in catalog and config files.

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, prelude::FromPrimitive};
use rusty_money::{Findable, Money, iso::Currency};

use crate::fixtures::FixtureError;

/// Look up an ISO currency by its alphabetic code (e.g. `"CAD"`).
///
/// # Errors
///
/// Returns [`FixtureError::UnknownCurrency`] if the code is not an ISO currency.
pub fn parse_currency(code: &str) -> Result<&'static Currency, FixtureError> {
    let code = code.trim().to_ascii_uppercase();

    Currency::find(&code).ok_or(FixtureError::UnknownCurrency(code))
}

/// Parse price string (e.g., "2999.99 CAD") into an exact money value
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY",
/// if the amount is not a decimal number, or if the currency code
/// is not recognized.
pub fn parse_price(s: &str) -> Result<Money<'static, Currency>, FixtureError> {
    let mut parts = s.split_whitespace();

    let (Some(amount), Some(code), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let amount = amount
        .replace(',', "")
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    let currency = parse_currency(code)?;

    Ok(Money::from_decimal(amount, currency))
}

/// Parse percentage string (e.g., "13%" or "0.13") into a `Percentage`
///
/// Accepts two formats:
/// - Percentage format: "13%" for 13%
/// - Decimal format: "0.13" for 13%
///
/// # Errors
///
/// Returns an error if the string cannot be parsed or if the value is negative.
pub fn parse_percentage(s: &str) -> Result<Percentage, FixtureError> {
    let trimmed = s.trim();

    let fraction = if let Some(percent_str) = trimmed.strip_suffix('%') {
        percent_str
            .trim()
            .parse::<Decimal>()
            .map(|value| value / Decimal::ONE_HUNDRED)
    } else {
        trimmed.parse::<Decimal>()
    }
    .map_err(|_err| FixtureError::InvalidPercentage(s.to_string()))?;

    if fraction.is_sign_negative() {
        return Err(FixtureError::InvalidPercentage(s.to_string()));
    }

    Ok(Percentage::from(fraction))
}

/// Convert a YAML number to an exact decimal (9.9 stays 9.9).
///
/// # Errors
///
/// Returns [`FixtureError::InvalidNumber`] for NaN or infinite values.
pub fn decimal(value: f64) -> Result<Decimal, FixtureError> {
    Decimal::from_f64(value).ok_or(FixtureError::InvalidNumber(value))
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{CAD, USD};
    use testresult::TestResult;

    use super::*;

    #[test]
    fn parse_price_keeps_exact_amount() -> TestResult {
        let price = parse_price("12,345.67 CAD")?;

        assert_eq!(*price.amount(), Decimal::new(1_234_567, 2));
        assert_eq!(price.currency(), CAD);

        Ok(())
    }

    #[test]
    fn parse_price_accepts_lowercase_codes() -> TestResult {
        assert_eq!(parse_price("10 usd")?.currency(), USD);

        Ok(())
    }

    #[test]
    fn parse_price_rejects_malformed_values() {
        assert!(matches!(parse_price("10"), Err(FixtureError::InvalidPrice(_))));
        assert!(matches!(
            parse_price("ten CAD"),
            Err(FixtureError::InvalidPrice(_))
        ));
        assert!(matches!(
            parse_price("10 CAD extra"),
            Err(FixtureError::InvalidPrice(_))
        ));
        assert!(matches!(
            parse_price("10 XYZ"),
            Err(FixtureError::UnknownCurrency(_))
        ));
    }

    #[test]
    fn parse_percentage_accepts_both_formats() -> TestResult {
        let thirteen = Decimal::new(13, 2);

        assert_eq!(parse_percentage("13%")? * Decimal::ONE, thirteen);
        assert_eq!(parse_percentage("0.13")? * Decimal::ONE, thirteen);
        assert_eq!(parse_percentage(" 7.5 % ")? * Decimal::ONE, Decimal::new(75, 3));

        Ok(())
    }

    #[test]
    fn parse_percentage_rejects_garbage_and_negatives() {
        assert!(parse_percentage("lots").is_err());
        assert!(parse_percentage("-5%").is_err());
    }

    #[test]
    fn decimal_is_exact_for_short_fractions() -> TestResult {
        assert_eq!(decimal(9.9)?, Decimal::new(99, 1));
        assert!(decimal(f64::NAN).is_err());

        Ok(())
    }
}
