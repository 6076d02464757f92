//! Quote Options

use rusty_money::{Money, iso::Currency};

use crate::money::{self, PricingError, amount, ensure_currency};

/// A named add-on with a flat price.
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteOption<'a> {
    /// Display name
    pub name: String,

    /// Flat price
    pub price: Money<'a, Currency>,
}

impl<'a> QuoteOption<'a> {
    /// Create a new option.
    pub fn new(name: impl Into<String>, price: Money<'a, Currency>) -> Self {
        Self {
            name: name.into(),
            price,
        }
    }
}

/// Sum the prices of the selected options.
///
/// # Errors
///
/// Returns [`PricingError::CurrencyMismatch`] if an option is priced in another currency.
pub fn accessories_total<'a>(
    options: &[QuoteOption<'a>],
    currency: &'a Currency,
) -> Result<Money<'a, Currency>, PricingError> {
    let total = options.iter().try_fold(rust_decimal::Decimal::ZERO, |acc, option| {
        ensure_currency(currency, &option.price)?;

        Ok::<_, PricingError>(acc + amount(&option.price))
    })?;

    Ok(money::exact(total, currency))
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{CAD, USD};
    use testresult::TestResult;

    use super::*;

    #[test]
    fn accessories_total_sums_prices() -> TestResult {
        let options = [
            QuoteOption::new("Stainless prop", Money::from_minor(89_900, CAD)),
            QuoteOption::new("Rigging kit", Money::from_minor(45_050, CAD)),
        ];

        assert_eq!(
            accessories_total(&options, CAD)?,
            Money::from_minor(134_950, CAD)
        );

        Ok(())
    }

    #[test]
    fn accessories_total_empty_is_zero() -> TestResult {
        assert_eq!(accessories_total(&[], CAD)?, Money::from_minor(0, CAD));

        Ok(())
    }

    #[test]
    fn accessories_total_rejects_mixed_currency() {
        let options = [QuoteOption::new("Cover", Money::from_minor(100, USD))];

        assert!(matches!(
            accessories_total(&options, CAD),
            Err(PricingError::CurrencyMismatch { .. })
        ));
    }
}
