//! Promotion Rules

use decimal_percentage::Percentage;
use jiff::{Timestamp, civil::Date};
use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;

use crate::{
    money::amount,
    motors::Motor,
    promotions::{bonus::BonusOption, conditions::RuleConditions},
};

/// A conditional discount or bonus definition.
#[derive(Debug, Clone, PartialEq)]
pub struct PromotionRule<'a> {
    /// Stable identifier
    pub id: String,

    /// Display name
    pub name: String,

    /// Percentage off MSRP, as a fraction (0.05 for 5%)
    pub discount_percentage: Percentage,

    /// Fixed amount off
    pub discount_fixed_amount: Option<Money<'a, Currency>>,

    /// Motor conditions
    pub conditions: RuleConditions,

    /// Higher priorities are applied first
    pub priority: i32,

    /// Whether the rule combines with other rules
    pub stackable: bool,

    /// Whether the rule is switched on
    pub is_active: bool,

    /// First day the rule applies, open if `None`
    pub start_date: Option<Date>,

    /// Last day the rule applies, open if `None`
    pub end_date: Option<Date>,

    /// When the rule was authored, used to break priority ties
    pub created_at: Option<Timestamp>,

    /// Extra warranty years granted
    pub warranty_extra_years: u32,

    /// "Choose one" bonus options
    pub bonus_options: SmallVec<[BonusOption<'a>; 3]>,
}

impl<'a> PromotionRule<'a> {
    /// Create an active, non-stackable rule with no discount and no conditions.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            discount_percentage: Percentage::from(Decimal::ZERO),
            discount_fixed_amount: None,
            conditions: RuleConditions::default(),
            priority: 0,
            stackable: false,
            is_active: true,
            start_date: None,
            end_date: None,
            created_at: None,
            warranty_extra_years: 0,
            bonus_options: SmallVec::new(),
        }
    }

    /// Whether the rule is active on `as_of`.
    pub fn is_current(&self, as_of: Date) -> bool {
        self.is_active
            && self.start_date.is_none_or(|start| start <= as_of)
            && self.end_date.is_none_or(|end| as_of <= end)
    }

    /// Whether the rule is current and `motor` meets its conditions.
    pub fn applies_to(&self, motor: &Motor<'_>, as_of: Date) -> bool {
        self.is_current(as_of) && self.conditions.matches(motor)
    }

    /// Discount this rule is worth on `msrp`.
    ///
    /// The percentage is always taken off the original MSRP, never off a discounted price.
    pub fn discount_for(&self, msrp: &Money<'_, Currency>) -> Decimal {
        let percentage = self.discount_percentage * amount(msrp);
        let fixed = self
            .discount_fixed_amount
            .as_ref()
            .map_or(Decimal::ZERO, amount);

        percentage + fixed
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::CAD;

    use crate::motors::test_support::motor;

    use super::*;

    #[test]
    fn inactive_rule_is_never_current() {
        let mut rule = PromotionRule::new("r1", "Spring");
        rule.is_active = false;

        assert!(!rule.is_current(Date::constant(2026, 4, 1)));
    }

    #[test]
    fn date_window_is_inclusive() {
        let mut rule = PromotionRule::new("r1", "Spring");
        rule.start_date = Some(Date::constant(2026, 3, 1));
        rule.end_date = Some(Date::constant(2026, 5, 31));

        assert!(rule.is_current(Date::constant(2026, 3, 1)));
        assert!(rule.is_current(Date::constant(2026, 5, 31)));
        assert!(!rule.is_current(Date::constant(2026, 2, 28)));
        assert!(!rule.is_current(Date::constant(2026, 6, 1)));
    }

    #[test]
    fn open_ended_window_is_unbounded() {
        let mut rule = PromotionRule::new("r1", "Evergreen");
        rule.start_date = Some(Date::constant(2020, 1, 1));

        assert!(rule.is_current(Date::constant(2099, 12, 31)));
    }

    #[test]
    fn discount_combines_percentage_and_fixed_amount() {
        let mut rule = PromotionRule::new("r1", "Spring");
        rule.discount_percentage = Percentage::from(Decimal::new(5, 2));
        rule.discount_fixed_amount = Some(Money::from_minor(10_000, CAD));

        let msrp = Money::from_minor(1_000_000, CAD);

        assert_eq!(rule.discount_for(&msrp), Decimal::from(600));
    }

    #[test]
    fn applies_to_requires_conditions() {
        let mut rule = PromotionRule::new("r1", "Big motors");
        rule.conditions.horsepower_min = Some(Decimal::from(150));

        let as_of = Date::constant(2026, 4, 1);

        assert!(rule.applies_to(&motor("150XL", Decimal::from(150), 2_000_000), as_of));
        assert!(!rule.applies_to(&motor("115ELPT", Decimal::from(115), 1_500_000), as_of));
    }
}
