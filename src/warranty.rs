//! Warranty
//!
//! Extended coverage is priced per additional year from a table keyed by horsepower bracket.
//! Year `N` in a bracket is the price of the `N`th year of coverage, so extending from 3 to
//! 5 years costs `year 4 + year 5`.

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;
use tracing::warn;

use crate::money::{self, amount};

/// Factory coverage every motor ships with.
pub const BASE_COVERAGE_YEARS: u32 = 3;

/// Ceiling on total coverage years.
pub const MAX_COVERAGE_YEARS: u32 = 8;

/// What to do with requested years the bracket does not price.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BeyondTablePolicy {
    /// Stop at the last priced year; unpriced years cost nothing
    #[default]
    Clamp,

    /// Unpriced years cost the same as the last priced year
    ExtendLastYear,
}

/// Pricing gaps surfaced to staff. The customer still gets a price.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum WarrantyNotice {
    /// No bracket covers the horsepower; the extension was priced at zero
    #[error("no warranty price bracket covers {horsepower} HP")]
    NoBracket {
        /// Requested horsepower
        horsepower: Decimal,
    },

    /// The target runs past the last priced year of the bracket
    #[error("warranty year {requested} requested but bracket only prices {priced} years")]
    BeyondPricedYears {
        /// Requested target year
        requested: u32,

        /// Last priced year
        priced: u32,
    },
}

/// Per-year warranty prices for a horsepower bracket.
#[derive(Debug, Clone, PartialEq)]
pub struct WarrantyBracket<'a> {
    /// Inclusive lower bound
    pub hp_min: Decimal,

    /// Inclusive upper bound
    pub hp_max: Decimal,

    /// Price of coverage year 1, 2, ... in order
    pub year_prices: SmallVec<[Money<'a, Currency>; 5]>,
}

impl<'a> WarrantyBracket<'a> {
    /// Whether `horsepower` falls in this bracket.
    pub fn contains(&self, horsepower: Decimal) -> bool {
        self.hp_min <= horsepower && horsepower <= self.hp_max
    }

    /// Last coverage year this bracket prices.
    pub fn priced_years(&self) -> u32 {
        u32::try_from(self.year_prices.len()).unwrap_or(u32::MAX)
    }

    /// Price of coverage year `year` (1-based).
    pub fn year_price(&self, year: u32) -> Option<&Money<'a, Currency>> {
        let index = usize::try_from(year.checked_sub(1)?).ok()?;

        self.year_prices.get(index)
    }
}

/// Warranty prices for every horsepower bracket.
#[derive(Debug, Clone, PartialEq)]
pub struct WarrantyPriceTable<'a> {
    currency: &'a Currency,
    brackets: Vec<WarrantyBracket<'a>>,
    policy: BeyondTablePolicy,
}

/// Priced warranty extension.
#[derive(Debug, Clone, PartialEq)]
pub struct WarrantyExtension<'a> {
    /// Cost of the additional years
    pub cost: Money<'a, Currency>,

    /// Number of years actually added to the cost
    pub years_priced: u32,

    /// Data gap, if any
    pub notice: Option<WarrantyNotice>,
}

impl<'a> WarrantyPriceTable<'a> {
    /// Create a table. Brackets should not overlap; the first matching bracket is used.
    pub fn new(currency: &'a Currency, brackets: Vec<WarrantyBracket<'a>>) -> Self {
        Self {
            currency,
            brackets,
            policy: BeyondTablePolicy::default(),
        }
    }

    /// Set the policy for years beyond a bracket's priced years.
    #[must_use]
    pub fn with_policy(mut self, policy: BeyondTablePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Table currency.
    pub fn currency(&self) -> &'a Currency {
        self.currency
    }

    /// Beyond-table policy in force.
    pub fn policy(&self) -> BeyondTablePolicy {
        self.policy
    }

    /// Brackets in lookup order.
    pub fn brackets(&self) -> &[WarrantyBracket<'a>] {
        &self.brackets
    }

    /// Bracket covering `horsepower`.
    pub fn bracket_for(&self, horsepower: Decimal) -> Option<&WarrantyBracket<'a>> {
        self.brackets
            .iter()
            .find(|bracket| bracket.contains(horsepower))
    }

    /// Cost of extending coverage from `current_years` to `target_years`.
    ///
    /// Sums the bracket's prices for years `current_years + 1` through `target_years`.
    /// Returns zero when no extension is needed. A missing bracket prices at zero with a
    /// [`WarrantyNotice::NoBracket`] notice; years past the bracket's last priced year follow
    /// the table's [`BeyondTablePolicy`] and raise [`WarrantyNotice::BeyondPricedYears`].
    pub fn extension_cost(
        &self,
        horsepower: Decimal,
        current_years: u32,
        target_years: u32,
    ) -> WarrantyExtension<'a> {
        let nothing = |notice| WarrantyExtension {
            cost: money::zero(self.currency),
            years_priced: 0,
            notice,
        };

        if target_years <= current_years {
            return nothing(None);
        }

        let Some(bracket) = self.bracket_for(horsepower) else {
            warn!(%horsepower, "no warranty bracket for horsepower");

            return nothing(Some(WarrantyNotice::NoBracket { horsepower }));
        };

        let priced = bracket.priced_years();
        let last_price = bracket.year_prices.last();

        let notice = (target_years > priced).then(|| {
            warn!(
                %horsepower,
                requested = target_years,
                priced,
                policy = ?self.policy,
                "warranty target beyond priced years"
            );

            WarrantyNotice::BeyondPricedYears {
                requested: target_years,
                priced,
            }
        });

        let (cost, years_priced) = ((current_years + 1)..=target_years)
            .filter_map(|year| match (bracket.year_price(year), self.policy) {
                (Some(price), _) => Some(price),
                (None, BeyondTablePolicy::ExtendLastYear) => last_price,
                (None, BeyondTablePolicy::Clamp) => None,
            })
            .fold((Decimal::ZERO, 0_u32), |(sum, count), price| {
                (sum + amount(price), count + 1)
            });

        WarrantyExtension {
            cost: money::exact(cost, self.currency),
            years_priced,
            notice,
        }
    }
}

/// Cost of extending coverage from `current_years` to `target_years` for `horsepower`.
///
/// See [`WarrantyPriceTable::extension_cost`].
pub fn calculate_warranty_extension_cost<'a>(
    table: &WarrantyPriceTable<'a>,
    horsepower: Decimal,
    current_years: u32,
    target_years: u32,
) -> WarrantyExtension<'a> {
    table.extension_cost(horsepower, current_years, target_years)
}

/// Coverage currently in force: base plus promotional years, capped.
pub fn current_coverage_years(base_years: u32, promo_bonus_years: u32, max_years: u32) -> u32 {
    base_years.saturating_add(promo_bonus_years).min(max_years)
}

/// Derived warranty selection for a quote.
#[derive(Debug, Clone, PartialEq)]
pub struct WarrantyConfig<'a> {
    /// Total coverage years, at most the cap
    pub total_years: u32,

    /// Years beyond factory coverage
    pub extended_years: u32,

    /// Price of the purchased years
    pub warranty_price: Money<'a, Currency>,

    /// Data gap, if any
    pub notice: Option<WarrantyNotice>,
}

impl<'a> WarrantyConfig<'a> {
    /// Coverage reaching `target_years`, purchased on top of `current_years`.
    ///
    /// The total never drops below what is already in force nor exceeds `max_years`.
    pub fn for_target(
        table: &WarrantyPriceTable<'a>,
        horsepower: Decimal,
        base_years: u32,
        current_years: u32,
        target_years: u32,
        max_years: u32,
    ) -> Self {
        let total_years = target_years.max(current_years).min(max_years);
        let extension = table.extension_cost(horsepower, current_years, total_years);

        Self {
            total_years,
            extended_years: total_years.saturating_sub(base_years),
            warranty_price: extension.cost,
            notice: extension.notice,
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use rust_decimal::Decimal;
    use rusty_money::{Money, iso::CAD};
    use smallvec::smallvec;

    use super::{WarrantyBracket, WarrantyPriceTable};

    /// Two brackets: up to 60 HP and 60.1 to 300 HP, five priced years each.
    pub(crate) fn table() -> WarrantyPriceTable<'static> {
        WarrantyPriceTable::new(
            CAD,
            vec![
                WarrantyBracket {
                    hp_min: Decimal::ZERO,
                    hp_max: Decimal::from(60),
                    year_prices: smallvec![
                        Money::from_minor(10_000, CAD),
                        Money::from_minor(12_000, CAD),
                        Money::from_minor(14_000, CAD),
                        Money::from_minor(16_000, CAD),
                        Money::from_minor(18_000, CAD),
                    ],
                },
                WarrantyBracket {
                    hp_min: Decimal::new(601, 1),
                    hp_max: Decimal::from(300),
                    year_prices: smallvec![
                        Money::from_minor(20_000, CAD),
                        Money::from_minor(25_000, CAD),
                        Money::from_minor(30_000, CAD),
                        Money::from_minor(35_000, CAD),
                        Money::from_minor(40_000, CAD),
                    ],
                },
            ],
        )
    }
}
