//! Money
//!
//! Quote arithmetic runs on the exact decimal amount behind each [`Money`] value. Nothing is
//! rounded until it is shown to a customer.

use rust_decimal::{Decimal, RoundingStrategy};
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

/// Errors raised while assembling pricing inputs.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// A money value was supplied in a different currency from the quote.
    #[error("currency mismatch: expected {expected}, found {found}")]
    CurrencyMismatch {
        /// ISO code of the quote currency
        expected: String,
        /// ISO code of the offending value
        found: String,
    },
}

/// Exact amount of a money value, in major units.
pub fn amount(money: &Money<'_, Currency>) -> Decimal {
    *money.amount()
}

/// Wrap an exact amount without rounding it.
pub fn exact<'a>(amount: Decimal, currency: &'a Currency) -> Money<'a, Currency> {
    Money::from_decimal(amount, currency)
}

/// Zero in the given currency.
pub fn zero(currency: &Currency) -> Money<'_, Currency> {
    Money::from_minor(0, currency)
}

/// Round to the currency's minor unit, half away from zero.
pub fn rounded<'a>(money: &Money<'a, Currency>) -> Money<'a, Currency> {
    let currency = money.currency();

    Money::from_decimal(
        money
            .amount()
            .round_dp_with_strategy(currency.exponent, RoundingStrategy::MidpointAwayFromZero),
        currency,
    )
}

/// Round to a whole currency unit, half away from zero.
pub fn whole_units<'a>(money: &Money<'a, Currency>) -> Money<'a, Currency> {
    Money::from_decimal(
        money
            .amount()
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero),
        money.currency(),
    )
}

/// Check that `money` is denominated in `expected`.
///
/// # Errors
///
/// Returns [`PricingError::CurrencyMismatch`] when the currencies differ.
pub fn ensure_currency(
    expected: &Currency,
    money: &Money<'_, Currency>,
) -> Result<(), PricingError> {
    if money.currency() == expected {
        Ok(())
    } else {
        Err(PricingError::CurrencyMismatch {
            expected: expected.iso_alpha_code.to_string(),
            found: money.currency().iso_alpha_code.to_string(),
        })
    }
}
