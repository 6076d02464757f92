//! Financing
//!
//! Monthly payments on a standard amortizing loan, with straight-line division for 0% APR.

use rust_decimal::{Decimal, MathematicalOps};
use rusty_money::{Money, iso::Currency};

use crate::money::{self, amount};

/// Default APR in percent points.
pub const DEFAULT_APR: Decimal = Decimal::from_parts(799, 0, 0, false, 2);

/// Default loan term.
pub const DEFAULT_TERM_MONTHS: u32 = 60;

const MONTHS_PER_YEAR: Decimal = Decimal::from_parts(12, 0, 0, false, 0);
const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// A computed monthly payment.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyPayment<'a> {
    /// Payment rounded to a whole currency unit, for display
    pub payment: Money<'a, Currency>,

    /// Unrounded payment
    pub exact_payment: Money<'a, Currency>,

    /// Loan term in months
    pub term_months: u32,

    /// APR in percent points
    pub rate: Decimal,

    /// Months before the first payment is due
    pub deferred_months: u32,
}

impl<'a> MonthlyPayment<'a> {
    /// Sum of every payment over the term, unrounded.
    pub fn total_of_payments(&self) -> Money<'a, Currency> {
        money::exact(
            amount(&self.exact_payment) * Decimal::from(self.term_months),
            self.exact_payment.currency(),
        )
    }

    /// Defer the first payment.
    #[must_use]
    pub fn with_deferral(mut self, months: u32) -> Self {
        self.deferred_months = months;
        self
    }
}

/// Monthly payment on `finance_amount`.
///
/// Uses `promo_rate` when given, otherwise `default_rate`, both APRs in percent points.
/// A 0% rate divides the amount evenly over the term; any other rate uses the standard
/// amortization formula `P × r / (1 − (1 + r)^−n)` with `r` the monthly rate.
///
/// Never fails: a zero term or an overflowing calculation yields a zero payment, and a
/// negative amount yields a negative payment.
pub fn calculate_monthly_payment<'a>(
    finance_amount: &Money<'a, Currency>,
    promo_rate: Option<Decimal>,
    default_rate: Decimal,
    term_months: u32,
) -> MonthlyPayment<'a> {
    let currency = finance_amount.currency();
    let rate = promo_rate.unwrap_or(default_rate);
    let principal = amount(finance_amount);

    let exact = periodic_payment(principal, rate, term_months).unwrap_or(Decimal::ZERO);
    let exact_payment = money::exact(exact, currency);

    MonthlyPayment {
        payment: money::whole_units(&exact_payment),
        exact_payment,
        term_months,
        rate,
        deferred_months: 0,
    }
}

fn periodic_payment(principal: Decimal, rate: Decimal, term_months: u32) -> Option<Decimal> {
    let months = Decimal::from(term_months);
    let monthly_rate = rate / HUNDRED / MONTHS_PER_YEAR;

    if monthly_rate.is_zero() {
        return principal.checked_div(months);
    }

    // P × r × (1 + r)^n / ((1 + r)^n − 1), same as P × r / (1 − (1 + r)^−n)
    let growth = (Decimal::ONE + monthly_rate).checked_powu(u64::from(term_months))?;

    principal
        .checked_mul(monthly_rate)?
        .checked_mul(growth)?
        .checked_div(growth - Decimal::ONE)
}

/// Amount to finance after a down payment. Not clamped at zero.
pub fn finance_amount<'a>(
    total: &Money<'a, Currency>,
    down_payment: Option<&Money<'a, Currency>>,
) -> Money<'a, Currency> {
    let down = down_payment.map_or(Decimal::ZERO, amount);

    money::exact(amount(total) - down, total.currency())
}

/// Financing terms applied to a quote.
#[derive(Debug, Clone, PartialEq)]
pub struct FinancingOptions<'a> {
    /// Promotional APR in percent points, overrides the default
    pub promo_rate: Option<Decimal>,

    /// Standard APR in percent points
    pub default_rate: Decimal,

    /// Loan term in months
    pub term_months: u32,

    /// Down payment
    pub down_payment: Option<Money<'a, Currency>>,

    /// Months before the first payment is due
    pub deferred_months: u32,
}

impl Default for FinancingOptions<'_> {
    fn default() -> Self {
        Self {
            promo_rate: None,
            default_rate: DEFAULT_APR,
            term_months: DEFAULT_TERM_MONTHS,
            down_payment: None,
            deferred_months: 0,
        }
    }
}

impl<'a> FinancingOptions<'a> {
    /// Monthly payment on a tax-inclusive `total`.
    pub fn payment_for(&self, total: &Money<'a, Currency>) -> MonthlyPayment<'a> {
        let financed = finance_amount(total, self.down_payment.as_ref());

        calculate_monthly_payment(&financed, self.promo_rate, self.default_rate, self.term_months)
            .with_deferral(self.deferred_months)
    }
}
