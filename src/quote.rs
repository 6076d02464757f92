//! Quotes
//!
//! Folds MSRP, discounts, accessories, trade-in and tax into a single set of totals. The
//! order of operations is fixed so customer-facing numbers are reproducible:
//!
//! 1. `motor subtotal = msrp − dealer discount − admin discount − promo value`
//! 2. `subtotal = motor subtotal + accessories − trade-in`
//! 3. `tax = subtotal × tax rate`
//! 4. `total = subtotal + tax`
//! 5. `savings = dealer discount + admin discount + promo value`

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};

use crate::money::{self, PricingError, amount, ensure_currency};

pub mod session;

pub use session::QuoteSession;

/// Default sales tax rate (13% HST).
pub fn default_tax_rate() -> Percentage {
    Percentage::from(Decimal::new(13, 2))
}

/// Inputs to [`compute_totals`], all in one currency.
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteInput<'a> {
    msrp: Money<'a, Currency>,
    dealer_discount: Money<'a, Currency>,
    promo_value: Money<'a, Currency>,
    admin_discount: Money<'a, Currency>,
    accessories_total: Money<'a, Currency>,
    trade_in_value: Money<'a, Currency>,
    tax_rate: Percentage,
}

impl<'a> QuoteInput<'a> {
    /// Start a quote at `msrp` with no discounts, accessories or trade-in and the default tax
    /// rate.
    pub fn new(msrp: Money<'a, Currency>) -> Self {
        let zero = money::zero(msrp.currency());

        Self {
            msrp,
            dealer_discount: zero,
            promo_value: zero,
            admin_discount: zero,
            accessories_total: zero,
            trade_in_value: zero,
            tax_rate: default_tax_rate(),
        }
    }

    /// Quote currency.
    pub fn currency(&self) -> &'a Currency {
        self.msrp.currency()
    }

    fn checked(&self, value: Money<'a, Currency>) -> Result<Money<'a, Currency>, PricingError> {
        ensure_currency(self.currency(), &value)?;

        Ok(value)
    }

    /// Set the standing dealer discount.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::CurrencyMismatch`] if `value` is in another currency.
    pub fn with_dealer_discount(
        mut self,
        value: Money<'a, Currency>,
    ) -> Result<Self, PricingError> {
        self.dealer_discount = self.checked(value)?;
        Ok(self)
    }

    /// Set the promotional value.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::CurrencyMismatch`] if `value` is in another currency.
    pub fn with_promo_value(
        mut self,
        value: Money<'a, Currency>,
    ) -> Result<Self, PricingError> {
        self.promo_value = self.checked(value)?;
        Ok(self)
    }

    /// Set the staff-applied discount.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::CurrencyMismatch`] if `value` is in another currency.
    pub fn with_admin_discount(
        mut self,
        value: Money<'a, Currency>,
    ) -> Result<Self, PricingError> {
        self.admin_discount = self.checked(value)?;
        Ok(self)
    }

    /// Set the accessories total.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::CurrencyMismatch`] if `value` is in another currency.
    pub fn with_accessories(
        mut self,
        value: Money<'a, Currency>,
    ) -> Result<Self, PricingError> {
        self.accessories_total = self.checked(value)?;
        Ok(self)
    }

    /// Set the trade-in credit.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::CurrencyMismatch`] if `value` is in another currency.
    pub fn with_trade_in(
        mut self,
        value: Money<'a, Currency>,
    ) -> Result<Self, PricingError> {
        self.trade_in_value = self.checked(value)?;
        Ok(self)
    }

    /// Set the tax rate.
    #[must_use]
    pub fn with_tax_rate(mut self, tax_rate: Percentage) -> Self {
        self.tax_rate = tax_rate;
        self
    }

    /// Add to the accessories total.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::CurrencyMismatch`] if `value` is in another currency.
    pub fn add_accessory(self, value: &Money<'a, Currency>) -> Result<Self, PricingError> {
        ensure_currency(self.currency(), value)?;

        Ok(self.plus_accessory(amount(value)))
    }

    /// Add an amount already known to be in the quote currency.
    pub(crate) fn plus_accessory(mut self, value: Decimal) -> Self {
        self.accessories_total =
            money::exact(amount(&self.accessories_total) + value, self.currency());
        self
    }

    /// MSRP
    pub fn msrp(&self) -> Money<'a, Currency> {
        self.msrp
    }

    /// Dealer discount
    pub fn dealer_discount(&self) -> Money<'a, Currency> {
        self.dealer_discount
    }

    /// Promotional value
    pub fn promo_value(&self) -> Money<'a, Currency> {
        self.promo_value
    }

    /// Admin discount
    pub fn admin_discount(&self) -> Money<'a, Currency> {
        self.admin_discount
    }

    /// Accessories total
    pub fn accessories_total(&self) -> Money<'a, Currency> {
        self.accessories_total
    }

    /// Trade-in credit
    pub fn trade_in_value(&self) -> Money<'a, Currency> {
        self.trade_in_value
    }

    /// Tax rate
    pub fn tax_rate(&self) -> Percentage {
        self.tax_rate
    }
}

/// Quote totals. Amounts are exact; round only for display.
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteTotals<'a> {
    /// MSRP
    pub msrp: Money<'a, Currency>,

    /// Dealer discount
    pub discount: Money<'a, Currency>,

    /// Promotional value
    pub promo_value: Money<'a, Currency>,

    /// Admin discount
    pub admin_discount: Money<'a, Currency>,

    /// Accessories total
    pub accessories: Money<'a, Currency>,

    /// Trade-in credit
    pub trade_in: Money<'a, Currency>,

    /// Pre-tax price after every discount, accessory and trade-in. May be negative.
    pub subtotal: Money<'a, Currency>,

    /// Tax on the subtotal
    pub tax: Money<'a, Currency>,

    /// Subtotal plus tax
    pub total: Money<'a, Currency>,

    /// Dealer discount + admin discount + promo value; the trade-in is not a saving
    pub savings: Money<'a, Currency>,
}

/// Compute quote totals.
///
/// Deterministic and never fails. A trade-in larger than the remaining price produces a
/// negative subtotal, which is passed through as-is.
pub fn compute_totals<'a>(input: &QuoteInput<'a>) -> QuoteTotals<'a> {
    let currency = input.currency();

    let msrp = amount(&input.msrp);
    let dealer = amount(&input.dealer_discount);
    let admin = amount(&input.admin_discount);
    let promo = amount(&input.promo_value);

    let motor_subtotal = msrp - dealer - admin - promo;
    let subtotal =
        motor_subtotal + amount(&input.accessories_total) - amount(&input.trade_in_value);
    let tax = input.tax_rate * subtotal;
    let total = subtotal + tax;
    let savings = dealer + admin + promo;

    QuoteTotals {
        msrp: input.msrp,
        discount: input.dealer_discount,
        promo_value: input.promo_value,
        admin_discount: input.admin_discount,
        accessories: input.accessories_total,
        trade_in: input.trade_in_value,
        subtotal: money::exact(subtotal, currency),
        tax: money::exact(tax, currency),
        total: money::exact(total, currency),
        savings: money::exact(savings, currency),
    }
}
