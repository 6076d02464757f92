//! Packages
//!
//! Three comparable bundles built from one quote: Essential keeps the coverage already in
//! force, Complete and Premium buy coverage up to their target years and add rigging the motor
//! needs. Each tier re-runs the quote and financing with its extras folded in as accessories.

use std::{fmt, str::FromStr};

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::{
    config::PricingConfig,
    financing::{FinancingOptions, MonthlyPayment},
    money::{PricingError, amount, ensure_currency},
    motors::Motor,
    options::QuoteOption,
    quote::{QuoteInput, QuoteTotals, compute_totals},
    warranty::{WarrantyConfig, WarrantyPriceTable, current_coverage_years},
};

pub mod recommendation;

pub use recommendation::{
    BoatType, PurchasePath, Recommendation, RecommendationRule, default_rules, recommend_package,
};

/// Name of the starting battery add-on.
pub const STARTING_BATTERY: &str = "Marine starting battery";

/// Name of the premium propeller add-on.
pub const PREMIUM_PROPELLER: &str = "Premium stainless propeller";

/// Name of the portable fuel tank add-on.
pub const FUEL_TANK: &str = "Portable fuel tank";

/// Package tier. Orders Essential < Complete < Premium.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackageId {
    /// Essential
    Good,

    /// Complete
    Better,

    /// Premium
    Best,
}

impl PackageId {
    /// Every tier, cheapest first.
    pub const ALL: [PackageId; 3] = [PackageId::Good, PackageId::Better, PackageId::Best];

    /// Customer-facing name.
    pub fn label(self) -> &'static str {
        match self {
            PackageId::Good => "Essential",
            PackageId::Better => "Complete",
            PackageId::Best => "Premium",
        }
    }

    /// Stable identifier.
    pub fn as_str(self) -> &'static str {
        match self {
            PackageId::Good => "good",
            PackageId::Better => "better",
            PackageId::Best => "best",
        }
    }
}

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Unrecognised package name.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown package: {0} (expected essential, complete or premium)")]
pub struct PackageIdParseError(String);

impl FromStr for PackageId {
    type Err = PackageIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();

        PackageId::ALL
            .into_iter()
            .find(|id| id.as_str() == lower || id.label().eq_ignore_ascii_case(&lower))
            .ok_or_else(|| PackageIdParseError(s.to_string()))
    }
}

/// A priced package tier.
#[derive(Debug, Clone, PartialEq)]
pub struct PackageOption<'a> {
    /// Tier
    pub id: PackageId,

    /// Customer-facing name
    pub label: &'static str,

    /// Subtotal before tax, extras included
    pub price_before_tax: Money<'a, Currency>,

    /// Total coverage years
    pub coverage_years: u32,

    /// What the tier includes, in display order
    pub features: Vec<String>,

    /// Whether this is the recommended tier
    pub recommended: bool,

    /// Add-ons the tier includes beyond the customer's own options
    pub items: Vec<QuoteOption<'a>>,

    /// Coverage purchased
    pub warranty: WarrantyConfig<'a>,

    /// Quote totals with the tier's extras
    pub totals: QuoteTotals<'a>,

    /// Monthly payment on the tier's total
    pub financing: MonthlyPayment<'a>,
}

/// Everything a package build needs besides the motor.
#[derive(Debug, Clone)]
pub struct PackageSelections<'r, 'a> {
    base: QuoteInput<'a>,
    warranty_table: &'r WarrantyPriceTable<'a>,
    config: &'r PricingConfig<'a>,
    financing: FinancingOptions<'a>,
}

impl<'r, 'a> PackageSelections<'r, 'a> {
    /// Bundle the base quote with the tables and terms used to price each tier.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::CurrencyMismatch`] if the warranty table, the configured add-on
    /// costs or the down payment are not in the quote currency.
    pub fn new(
        base: QuoteInput<'a>,
        warranty_table: &'r WarrantyPriceTable<'a>,
        config: &'r PricingConfig<'a>,
        financing: FinancingOptions<'a>,
    ) -> Result<Self, PricingError> {
        let currency = base.currency();

        if warranty_table.currency() != currency {
            return Err(PricingError::CurrencyMismatch {
                expected: currency.iso_alpha_code.to_string(),
                found: warranty_table.currency().iso_alpha_code.to_string(),
            });
        }

        for cost in [
            &config.starting_battery,
            &config.premium_propeller,
            &config.fuel_tank,
        ] {
            ensure_currency(currency, cost)?;
        }

        if let Some(down_payment) = &financing.down_payment {
            ensure_currency(currency, down_payment)?;
        }

        Ok(Self {
            base,
            warranty_table,
            config,
            financing,
        })
    }

    /// The quote every tier builds on.
    pub fn base(&self) -> &QuoteInput<'a> {
        &self.base
    }

    fn package(
        &self,
        motor: &Motor<'a>,
        id: PackageId,
        base_years: u32,
        current_years: u32,
        target_years: u32,
        items: Vec<QuoteOption<'a>>,
    ) -> PackageOption<'a> {
        let warranty = WarrantyConfig::for_target(
            self.warranty_table,
            motor.horsepower,
            base_years,
            current_years,
            target_years,
            self.config.max_coverage_years,
        );

        let extras = amount(&warranty.warranty_price)
            + items
                .iter()
                .map(|item| amount(&item.price))
                .sum::<Decimal>();

        let totals = compute_totals(&self.base.clone().plus_accessory(extras));
        let financing = self.financing.payment_for(&totals.total);

        let mut features = Vec::with_capacity(items.len() + 2);

        features.push(format!("{} years total coverage", warranty.total_years));

        if warranty.extended_years > 0 {
            features.push(format!(
                "{} years beyond factory warranty",
                warranty.extended_years
            ));
        }

        features.extend(items.iter().map(|item| item.name.clone()));

        debug!(
            package = %id,
            coverage_years = warranty.total_years,
            %extras,
            subtotal = %totals.subtotal,
            "built package"
        );

        PackageOption {
            id,
            label: id.label(),
            price_before_tax: totals.subtotal,
            coverage_years: warranty.total_years,
            features,
            recommended: false,
            items,
            warranty,
            totals,
            financing,
        }
    }
}

/// Build the Essential, Complete and Premium tiers for `motor`, in that order.
///
/// Coverage in force is `base + promotional years`, capped. Complete buys coverage up to the
/// configured Complete target and adds a starting battery unless the motor is manual start.
/// Premium buys coverage up to the Premium target, adds the battery on the same terms, a
/// premium propeller when none ships with the motor, and a portable fuel tank when the motor
/// can run from one. No tier is marked recommended; see [`mark_recommended`].
pub fn build_packages<'a>(
    motor: &Motor<'a>,
    base_coverage_years: u32,
    promo_bonus_years: u32,
    selections: &PackageSelections<'_, 'a>,
) -> [PackageOption<'a>; 3] {
    let config = selections.config;
    let current = current_coverage_years(
        base_coverage_years,
        promo_bonus_years,
        config.max_coverage_years,
    );

    let battery = (!motor.is_manual_start())
        .then(|| QuoteOption::new(STARTING_BATTERY, config.starting_battery));

    let mut premium_items: Vec<QuoteOption<'a>> = battery.iter().cloned().collect();

    if !motor.includes_propeller {
        premium_items.push(QuoteOption::new(PREMIUM_PROPELLER, config.premium_propeller));
    }

    if motor.supports_external_tank() {
        premium_items.push(QuoteOption::new(FUEL_TANK, config.fuel_tank));
    }

    [
        selections.package(
            motor,
            PackageId::Good,
            base_coverage_years,
            current,
            current,
            Vec::new(),
        ),
        selections.package(
            motor,
            PackageId::Better,
            base_coverage_years,
            current,
            config.complete_target_years,
            battery.into_iter().collect(),
        ),
        selections.package(
            motor,
            PackageId::Best,
            base_coverage_years,
            current,
            config.premium_target_years,
            premium_items,
        ),
    ]
}

/// Flag `id` as the only recommended package.
pub fn mark_recommended(packages: &mut [PackageOption<'_>], id: PackageId) {
    for package in packages {
        package.recommended = package.id == id;
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{CAD, USD};
    use testresult::TestResult;

    use crate::{
        motors::test_support::motor,
        warranty::{BASE_COVERAGE_YEARS, test_support::table},
    };

    use super::*;

    fn cad(minor: i64) -> Money<'static, Currency> {
        Money::from_minor(minor, CAD)
    }

    fn build(
        model: &str,
        hp: i64,
        promo_bonus_years: u32,
    ) -> Result<[PackageOption<'static>; 3], PricingError> {
        let config = PricingConfig::default();
        let table = table();
        let motor = motor(model, Decimal::from(hp), 1_000_000);
        let selections = PackageSelections::new(
            QuoteInput::new(motor.msrp),
            &table,
            &config,
            FinancingOptions::default(),
        )?;

        Ok(build_packages(
            &motor,
            BASE_COVERAGE_YEARS,
            promo_bonus_years,
            &selections,
        ))
    }

    #[test]
    fn tiers_are_ordered_by_price_and_coverage() -> TestResult {
        let [good, better, best] = build("115ELPT", 115, 0)?;

        assert_eq!(
            [good.id, better.id, best.id],
            [PackageId::Good, PackageId::Better, PackageId::Best]
        );
        assert_eq!(
            [good.coverage_years, better.coverage_years, best.coverage_years],
            [3, 7, 8]
        );
        assert!(amount(&good.price_before_tax) <= amount(&better.price_before_tax));
        assert!(amount(&better.price_before_tax) <= amount(&best.price_before_tax));

        Ok(())
    }

    #[test]
    fn essential_adds_nothing() -> TestResult {
        let [good, _, _] = build("115ELPT", 115, 0)?;

        assert_eq!(good.price_before_tax, cad(1_000_000));
        assert_eq!(good.warranty.warranty_price, cad(0));
        assert!(good.items.is_empty());

        Ok(())
    }

    #[test]
    fn complete_prices_extension_and_battery() -> TestResult {
        let config = PricingConfig::default();
        let [_, better, _] = build("115ELPT", 115, 0)?;

        // Bracket 60.1-300 prices years 4 and 5 only: 350 + 400, clamped
        assert_eq!(better.warranty.warranty_price, cad(75_000));
        assert_eq!(
            better.items,
            vec![QuoteOption::new(STARTING_BATTERY, config.starting_battery)]
        );
        assert_eq!(
            amount(&better.price_before_tax),
            Decimal::from(10_750) + amount(&config.starting_battery)
        );

        Ok(())
    }

    #[test]
    fn premium_adds_propeller_but_no_tank_for_remote_high_horsepower() -> TestResult {
        let [_, _, best] = build("115ELPT", 115, 0)?;
        let names: Vec<&str> = best.items.iter().map(|item| item.name.as_str()).collect();

        assert_eq!(names, [STARTING_BATTERY, PREMIUM_PROPELLER]);

        Ok(())
    }

    #[test]
    fn manual_tiller_skips_battery_and_adds_tank() -> TestResult {
        let [_, better, best] = build("9.9MH", 10, 0)?;
        let names: Vec<&str> = best.items.iter().map(|item| item.name.as_str()).collect();

        assert!(better.items.is_empty());
        assert_eq!(names, [PREMIUM_PROPELLER, FUEL_TANK]);

        Ok(())
    }

    #[test]
    fn promotional_years_raise_the_floor() -> TestResult {
        let [good, better, best] = build("115ELPT", 115, 4)?;

        assert_eq!(good.coverage_years, 7);
        assert_eq!(better.coverage_years, 7);
        assert_eq!(better.warranty.warranty_price, cad(0));
        assert_eq!(best.coverage_years, 8);

        Ok(())
    }

    #[test]
    fn financing_follows_each_tier_total() -> TestResult {
        let packages = build("115ELPT", 115, 0)?;

        for package in &packages {
            let expected = FinancingOptions::default().payment_for(&package.totals.total);

            assert_eq!(package.financing, expected);
        }

        Ok(())
    }

    #[test]
    fn mark_recommended_flags_exactly_one() -> TestResult {
        let mut packages = build("115ELPT", 115, 0)?;

        mark_recommended(&mut packages, PackageId::Better);

        let flagged: Vec<PackageId> = packages
            .iter()
            .filter(|package| package.recommended)
            .map(|package| package.id)
            .collect();

        assert_eq!(flagged, [PackageId::Better]);

        Ok(())
    }

    #[test]
    fn rejects_table_in_another_currency() {
        let config = PricingConfig::default();
        let table = WarrantyPriceTable::new(USD, Vec::new());
        let result = PackageSelections::new(
            QuoteInput::new(cad(1_000_000)),
            &table,
            &config,
            FinancingOptions::default(),
        );

        assert!(matches!(result, Err(PricingError::CurrencyMismatch { .. })));
    }

    #[test]
    fn parses_package_names() -> Result<(), PackageIdParseError> {
        assert_eq!("premium".parse::<PackageId>()?, PackageId::Best);
        assert_eq!("Complete".parse::<PackageId>()?, PackageId::Better);
        assert_eq!("good".parse::<PackageId>()?, PackageId::Good);
        assert!("platinum".parse::<PackageId>().is_err());

        Ok(())
    }
}
