//! Trade-ins

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};

use crate::money::{self, amount};

/// Value reduction applied when a trade-in's age or condition disqualifies full value.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeInPenalty {
    /// Fraction of the estimate that is kept, between 0 and 1
    pub factor: Percentage,

    /// Why the penalty applies
    pub reason: String,
}

/// Customer trade-in details.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeInInfo<'a> {
    /// Whether the customer is trading in a motor
    pub has_trade_in: bool,

    /// Estimated value before any penalty
    pub estimated_value: Money<'a, Currency>,

    /// Optional penalty
    pub penalty: Option<TradeInPenalty>,
}

impl<'a> TradeInInfo<'a> {
    /// No trade-in.
    pub fn none(currency: &'a Currency) -> Self {
        Self {
            has_trade_in: false,
            estimated_value: money::zero(currency),
            penalty: None,
        }
    }

    /// A trade-in at full estimated value.
    pub fn with_value(estimated_value: Money<'a, Currency>) -> Self {
        Self {
            has_trade_in: true,
            estimated_value,
            penalty: None,
        }
    }

    /// Apply a penalty to this trade-in.
    #[must_use]
    pub fn with_penalty(mut self, factor: Percentage, reason: impl Into<String>) -> Self {
        self.penalty = Some(TradeInPenalty {
            factor,
            reason: reason.into(),
        });

        self
    }

    /// Credit applied to the quote.
    ///
    /// Zero without a trade-in. A penalty factor outside `0..=1` is clamped.
    pub fn effective_value(&self) -> Money<'a, Currency> {
        let currency = self.estimated_value.currency();

        if !self.has_trade_in {
            return money::zero(currency);
        }

        let estimate = amount(&self.estimated_value);

        match &self.penalty {
            Some(penalty) => {
                let factor = (penalty.factor * Decimal::ONE).clamp(Decimal::ZERO, Decimal::ONE);

                money::exact(estimate * factor, currency)
            }
            None => self.estimated_value,
        }
    }
}
