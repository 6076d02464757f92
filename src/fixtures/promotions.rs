//! Promotion Fixtures

use decimal_percentage::Percentage;
use jiff::{Timestamp, civil::Date};
use rust_decimal::Decimal;
use serde::Deserialize;
use smallvec::SmallVec;

use crate::{
    fixtures::{
        FixtureError,
        values::{decimal, parse_percentage, parse_price},
    },
    motors::MotorType,
    promotions::{BonusOption, PromotionRule, RebateTier, RuleConditions},
};

/// Wrapper for promotions in YAML
#[derive(Debug, Deserialize)]
pub struct PromotionsFixture {
    /// Promotions in file order; the order breaks priority ties
    pub promotions: Vec<PromotionFixture>,
}

/// Promotion fixture from YAML
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PromotionFixture {
    /// Stable identifier
    pub id: String,

    /// Display name
    pub name: String,

    /// Percentage off MSRP (e.g. "5%")
    #[serde(default)]
    pub discount_percentage: Option<String>,

    /// Fixed amount off (e.g. "500.00 CAD")
    #[serde(default)]
    pub discount_fixed_amount: Option<String>,

    /// Motor conditions
    #[serde(default)]
    pub conditions: ConditionsFixture,

    /// Precedence among exclusive rules
    #[serde(default)]
    pub priority: i32,

    /// Combines with other rules
    #[serde(default)]
    pub stackable: bool,

    /// Switched on
    #[serde(default = "active_by_default")]
    pub is_active: bool,

    /// First day (ISO date)
    #[serde(default)]
    pub start_date: Option<Date>,

    /// Last day (ISO date)
    #[serde(default)]
    pub end_date: Option<Date>,

    /// Authoring time (RFC 3339)
    #[serde(default)]
    pub created_at: Option<Timestamp>,

    /// Extra warranty years
    #[serde(default)]
    pub warranty_extra_years: u32,

    /// "Choose one" bonuses
    #[serde(default)]
    pub bonus_options: Vec<BonusOptionFixture>,
}

fn active_by_default() -> bool {
    true
}

/// Conditions fixture
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConditionsFixture {
    /// Inclusive lower horsepower bound
    #[serde(default)]
    pub horsepower_min: Option<f64>,

    /// Inclusive upper horsepower bound
    #[serde(default)]
    pub horsepower_max: Option<f64>,

    /// Model substring
    #[serde(default)]
    pub model: Option<String>,

    /// Required propulsion type
    #[serde(default)]
    pub motor_type: Option<MotorType>,
}

/// Bonus option fixture
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BonusOptionFixture {
    /// Deferred first payment
    NoPayments {
        /// Months deferred
        deferred_months: u32,
    },

    /// Promotional APR
    SpecialFinancing {
        /// APR in percent points
        rate: f64,

        /// Offered terms in months
        #[serde(default)]
        term_options: Vec<u32>,
    },

    /// Cash rebate by horsepower bracket
    CashRebate {
        /// Rebate brackets
        tiers: Vec<RebateTierFixture>,
    },
}

/// Rebate tier fixture
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RebateTierFixture {
    /// Inclusive lower bound
    #[serde(default)]
    pub hp_min: Option<f64>,

    /// Inclusive upper bound
    #[serde(default)]
    pub hp_max: Option<f64>,

    /// Rebate (e.g. "250.00 CAD")
    pub amount: String,
}

fn optional_decimal(value: Option<f64>) -> Result<Option<Decimal>, FixtureError> {
    value.map(decimal).transpose()
}

impl TryFrom<ConditionsFixture> for RuleConditions {
    type Error = FixtureError;

    fn try_from(fixture: ConditionsFixture) -> Result<Self, Self::Error> {
        Ok(RuleConditions {
            horsepower_min: optional_decimal(fixture.horsepower_min)?,
            horsepower_max: optional_decimal(fixture.horsepower_max)?,
            model: fixture.model,
            motor_type: fixture.motor_type,
        })
    }
}

impl TryFrom<BonusOptionFixture> for BonusOption<'_> {
    type Error = FixtureError;

    fn try_from(fixture: BonusOptionFixture) -> Result<Self, Self::Error> {
        Ok(match fixture {
            BonusOptionFixture::NoPayments { deferred_months } => {
                BonusOption::NoPayments { deferred_months }
            }
            BonusOptionFixture::SpecialFinancing { rate, term_options } => {
                BonusOption::SpecialFinancing {
                    rate: decimal(rate)?,
                    term_options: SmallVec::from_vec(term_options),
                }
            }
            BonusOptionFixture::CashRebate { tiers } => BonusOption::CashRebate {
                tiers: tiers
                    .into_iter()
                    .map(|tier| {
                        Ok(RebateTier {
                            hp_min: optional_decimal(tier.hp_min)?,
                            hp_max: optional_decimal(tier.hp_max)?,
                            amount: parse_price(&tier.amount)?,
                        })
                    })
                    .collect::<Result<_, FixtureError>>()?,
            },
        })
    }
}

impl TryFrom<PromotionFixture> for PromotionRule<'_> {
    type Error = FixtureError;

    fn try_from(fixture: PromotionFixture) -> Result<Self, Self::Error> {
        let discount_percentage = fixture
            .discount_percentage
            .as_deref()
            .map(parse_percentage)
            .transpose()?
            .unwrap_or_else(|| Percentage::from(Decimal::ZERO));

        if discount_percentage * Decimal::ONE > Decimal::ONE {
            return Err(FixtureError::InvalidPromotionData(format!(
                "{}: discount percentage {} is above 100%",
                fixture.id,
                discount_percentage * Decimal::ONE_HUNDRED
            )));
        }

        let discount_fixed_amount = fixture
            .discount_fixed_amount
            .as_deref()
            .map(parse_price)
            .transpose()?;

        if let (Some(start), Some(end)) = (fixture.start_date, fixture.end_date)
            && start > end
        {
            return Err(FixtureError::InvalidPromotionData(format!(
                "{}: starts {start} after it ends {end}",
                fixture.id
            )));
        }

        let bonus_options = fixture
            .bonus_options
            .into_iter()
            .map(BonusOption::try_from)
            .collect::<Result<_, _>>()?;

        Ok(PromotionRule {
            id: fixture.id,
            name: fixture.name,
            discount_percentage,
            discount_fixed_amount,
            conditions: fixture.conditions.try_into()?,
            priority: fixture.priority,
            stackable: fixture.stackable,
            is_active: fixture.is_active,
            start_date: fixture.start_date,
            end_date: fixture.end_date,
            created_at: fixture.created_at,
            warranty_extra_years: fixture.warranty_extra_years,
            bonus_options,
        })
    }
}
