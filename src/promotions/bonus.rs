//! Bonus Options
//!
//! "Choose one" extras offered by a promotion. The customer picks one; the engine only reports
//! what is on offer and resolves the pick.

use std::{fmt, str::FromStr};

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

/// A cash rebate amount for a horsepower bracket.
#[derive(Debug, Clone, PartialEq)]
pub struct RebateTier<'a> {
    /// Inclusive lower bound, open if `None`
    pub hp_min: Option<Decimal>,

    /// Inclusive upper bound, open if `None`
    pub hp_max: Option<Decimal>,

    /// Rebate paid for motors in this bracket
    pub amount: Money<'a, Currency>,
}

impl RebateTier<'_> {
    /// Whether `horsepower` falls in this bracket.
    pub fn contains(&self, horsepower: Decimal) -> bool {
        self.hp_min.is_none_or(|min| horsepower >= min)
            && self.hp_max.is_none_or(|max| horsepower <= max)
    }
}

/// A bonus a promotion lets the customer choose.
#[derive(Debug, Clone, PartialEq)]
pub enum BonusOption<'a> {
    /// Payments start after a deferral period
    NoPayments {
        /// Months before the first payment
        deferred_months: u32,
    },

    /// Promotional APR on selected terms
    SpecialFinancing {
        /// APR in percent points (e.g. 2.99)
        rate: Decimal,

        /// Terms the rate is offered on, in months. Empty means any term.
        term_options: SmallVec<[u32; 4]>,
    },

    /// Cash back, scaled by horsepower bracket
    CashRebate {
        /// Rebate brackets, first match wins
        tiers: SmallVec<[RebateTier<'a>; 4]>,
    },
}

/// The customer's pick among a promotion's bonus options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BonusChoice {
    /// Take the payment deferral
    NoPayments,

    /// Take the promotional rate, optionally on a specific term
    SpecialFinancing {
        /// Requested term in months
        #[serde(default)]
        term_months: Option<u32>,
    },

    /// Take the cash rebate
    CashRebate,
}

/// What a resolved bonus does to the quote.
#[derive(Debug, Clone, PartialEq)]
pub enum BonusResolution<'a> {
    /// Defer the first payment
    Deferral {
        /// Months before the first payment
        months: u32,
    },

    /// Use a promotional APR
    Financing {
        /// APR in percent points
        rate: Decimal,

        /// Term in months, `None` keeps the default term
        term_months: Option<u32>,
    },

    /// Add a rebate to the promotional value
    Rebate(Money<'a, Currency>),
}

impl<'a> BonusOption<'a> {
    /// Resolve `choice` against this option for a motor of `horsepower`.
    ///
    /// Returns `None` when the option is of a different kind, the requested term is not
    /// offered, or no rebate bracket covers the horsepower.
    pub fn resolve(
        &self,
        choice: BonusChoice,
        horsepower: Decimal,
    ) -> Option<BonusResolution<'a>> {
        match (self, choice) {
            (BonusOption::NoPayments { deferred_months }, BonusChoice::NoPayments) => {
                Some(BonusResolution::Deferral {
                    months: *deferred_months,
                })
            }
            (
                BonusOption::SpecialFinancing { rate, term_options },
                BonusChoice::SpecialFinancing { term_months },
            ) => {
                let term_months = match term_months {
                    Some(term) if term_options.is_empty() || term_options.contains(&term) => {
                        Some(term)
                    }
                    Some(_) => return None,
                    None => term_options.first().copied(),
                };

                Some(BonusResolution::Financing {
                    rate: *rate,
                    term_months,
                })
            }
            (BonusOption::CashRebate { tiers }, BonusChoice::CashRebate) => tiers
                .iter()
                .find(|tier| tier.contains(horsepower))
                .map(|tier| BonusResolution::Rebate(tier.amount)),
            _ => None,
        }
    }
}

impl fmt::Display for BonusChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BonusChoice::NoPayments => f.write_str("no-payments"),
            BonusChoice::SpecialFinancing { term_months: None } => {
                f.write_str("special-financing")
            }
            BonusChoice::SpecialFinancing {
                term_months: Some(term),
            } => write!(f, "special-financing:{term}"),
            BonusChoice::CashRebate => f.write_str("cash-rebate"),
        }
    }
}

/// Failed to parse a [`BonusChoice`].
#[derive(Debug, Error, PartialEq, Eq)]
#[error(
    "unknown bonus choice: {0} (expected no-payments, special-financing[:TERM] or cash-rebate)"
)]
pub struct BonusChoiceParseError(String);

impl FromStr for BonusChoice {
    type Err = BonusChoiceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();

        match lower.split_once(':') {
            None if lower == "no-payments" => Ok(BonusChoice::NoPayments),
            None if lower == "cash-rebate" => Ok(BonusChoice::CashRebate),
            None if lower == "special-financing" => {
                Ok(BonusChoice::SpecialFinancing { term_months: None })
            }
            Some(("special-financing", term)) => term
                .parse()
                .map(|term| BonusChoice::SpecialFinancing {
                    term_months: Some(term),
                })
                .map_err(|_err| BonusChoiceParseError(s.to_string())),
            _ => Err(BonusChoiceParseError(s.to_string())),
        }
    }
}
