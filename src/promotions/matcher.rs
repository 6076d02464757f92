//! Promotion Matching

use std::cmp::Reverse;

use jiff::{Timestamp, civil::Date};
use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    money,
    motors::Motor,
    promotions::{
        bonus::{BonusChoice, BonusOption, BonusResolution},
        rule::PromotionRule,
    },
};

/// Diagnostics raised while applying promotions.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum PromotionNotice {
    /// The customer picked a bonus the matched promotions do not offer.
    #[error("bonus choice {0} is not available for this motor")]
    BonusUnavailable(BonusChoice),
}

/// Promotions that apply to a motor on a given date.
#[derive(Debug, Clone, PartialEq)]
pub struct PromotionMatch<'r, 'a> {
    /// Applied rules, highest priority first
    pub applied_rules: SmallVec<[&'r PromotionRule<'a>; 4]>,

    /// Combined discount of the applied rules
    pub total_discount: Money<'a, Currency>,

    /// Combined extra warranty years, uncapped
    pub total_warranty_bonus_years: u32,

    /// The rule whose bonus options are offered: the winning exclusive rule, or the first
    /// stackable rule when no exclusive rule matched
    pub headline: Option<&'r PromotionRule<'a>>,
}

impl<'r, 'a> PromotionMatch<'r, 'a> {
    /// A match with nothing applied.
    pub fn empty(currency: &'a Currency) -> Self {
        Self {
            applied_rules: SmallVec::new(),
            total_discount: money::zero(currency),
            total_warranty_bonus_years: 0,
            headline: None,
        }
    }

    /// Bonus options the customer may choose from.
    pub fn bonus_options(&self) -> &'r [BonusOption<'a>] {
        self.headline
            .map_or(&[], |rule| rule.bonus_options.as_slice())
    }

    /// Resolve the customer's bonus pick.
    ///
    /// # Errors
    ///
    /// Returns [`PromotionNotice::BonusUnavailable`] if no offered option satisfies `choice`.
    pub fn resolve_bonus(
        &self,
        choice: BonusChoice,
        horsepower: Decimal,
    ) -> Result<BonusResolution<'a>, PromotionNotice> {
        let resolved = self
            .bonus_options()
            .iter()
            .find_map(|option| option.resolve(choice, horsepower));

        resolved.ok_or_else(|| {
            warn!(?choice, %horsepower, "bonus choice not available");

            PromotionNotice::BonusUnavailable(choice)
        })
    }

    /// IDs of the applied rules, in application order.
    pub fn applied_ids(&self) -> Vec<&'r str> {
        self.applied_rules.iter().map(|rule| rule.id.as_str()).collect()
    }
}

/// Ordering key: higher priority first, then earliest created, then earliest listed.
fn precedence(index: usize, rule: &PromotionRule<'_>) -> (Reverse<i32>, Timestamp, usize) {
    (
        Reverse(rule.priority),
        rule.created_at.unwrap_or(Timestamp::MAX),
        index,
    )
}

/// Work out which promotions apply to `motor` on `as_of`.
///
/// Rules must be active, in their date window and have every condition met. At most one
/// non-stackable rule is applied: the highest priority one, ties going to the rule created
/// first (then the one listed first). Every matching stackable rule is added on top.
///
/// Percentage discounts are each taken off the motor's MSRP and summed; they never compound.
pub fn match_rules<'r, 'a>(
    motor: &Motor<'a>,
    rules: &'r [PromotionRule<'a>],
    as_of: Date,
) -> PromotionMatch<'r, 'a> {
    let (stackable, exclusive): (SmallVec<[_; 8]>, SmallVec<[_; 8]>) = rules
        .iter()
        .enumerate()
        .filter(|(_, rule)| rule.applies_to(motor, as_of))
        .partition(|(_, rule)| rule.stackable);

    let winner = exclusive
        .into_iter()
        .min_by_key(|(index, rule)| precedence(*index, rule));

    let mut selected: SmallVec<[(usize, &'r PromotionRule<'a>); 4]> =
        winner.into_iter().chain(stackable).collect();

    selected.sort_by_key(|(index, rule)| precedence(*index, rule));

    let total_discount = selected
        .iter()
        .map(|(_, rule)| rule.discount_for(&motor.msrp))
        .sum::<Decimal>();

    let total_warranty_bonus_years = selected
        .iter()
        .map(|(_, rule)| rule.warranty_extra_years)
        .sum();

    let headline = winner
        .or_else(|| selected.first().copied())
        .map(|(_, rule)| rule);

    let applied_rules: SmallVec<[&'r PromotionRule<'a>; 4]> =
        selected.into_iter().map(|(_, rule)| rule).collect();

    debug!(
        model = %motor.model,
        candidates = rules.len(),
        applied = ?applied_rules.iter().map(|rule| rule.id.as_str()).collect::<Vec<_>>(),
        %total_discount,
        "matched promotions"
    );

    PromotionMatch {
        applied_rules,
        total_discount: money::exact(total_discount, motor.currency()),
        total_warranty_bonus_years,
        headline,
    }
}
