//! Pricing Configuration
//!
//! Dealer-level knobs for quoting, with built-in defaults that any YAML file can override
//! field by field.

use std::{fs, path::Path};

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rusty_money::{
    Money,
    iso::{self, Currency},
};
use serde::Deserialize;
use thiserror::Error;

use crate::{
    financing::{DEFAULT_APR, DEFAULT_TERM_MONTHS, FinancingOptions},
    fixtures::{
        FixtureError,
        values::{decimal, parse_currency, parse_percentage, parse_price},
    },
    money::{PricingError, ensure_currency},
    packages::{RecommendationRule, default_rules},
    quote::default_tax_rate,
    warranty::{BASE_COVERAGE_YEARS, BeyondTablePolicy, MAX_COVERAGE_YEARS, WarrantyPriceTable},
};

/// Default Complete package coverage target.
pub const COMPLETE_TARGET_YEARS: u32 = 7;

/// Default Premium package coverage target.
pub const PREMIUM_TARGET_YEARS: u32 = 8;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading the config file
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse config YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// A value could not be parsed
    #[error("Invalid config value: {0}")]
    Value(#[from] FixtureError),

    /// A price is not in the configured currency
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// Values that are individually valid but inconsistent
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Quoting configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct PricingConfig<'a> {
    /// Quote currency
    pub currency: &'a Currency,

    /// Sales tax rate
    pub tax_rate: Percentage,

    /// Standard APR in percent points
    pub default_apr: Decimal,

    /// Standard loan term in months
    pub term_months: u32,

    /// Factory coverage years
    pub base_coverage_years: u32,

    /// Coverage cap
    pub max_coverage_years: u32,

    /// Coverage the Complete package buys up to
    pub complete_target_years: u32,

    /// Coverage the Premium package buys up to
    pub premium_target_years: u32,

    /// Starting battery added to Complete and Premium for electric-start motors
    pub starting_battery: Money<'a, Currency>,

    /// Propeller added to Premium when the motor ships without one
    pub premium_propeller: Money<'a, Currency>,

    /// Portable fuel tank added to Premium for motors that can use one
    pub fuel_tank: Money<'a, Currency>,

    /// Handling of warranty years past a bracket's priced years, overriding the table's own
    pub beyond_table: Option<BeyondTablePolicy>,

    /// Package recommendation table
    pub recommendations: Vec<RecommendationRule>,
}

impl<'a> PricingConfig<'a> {
    /// Built-in defaults priced in `currency`.
    pub fn for_currency(currency: &'a Currency) -> Self {
        Self {
            currency,
            tax_rate: default_tax_rate(),
            default_apr: DEFAULT_APR,
            term_months: DEFAULT_TERM_MONTHS,
            base_coverage_years: BASE_COVERAGE_YEARS,
            max_coverage_years: MAX_COVERAGE_YEARS,
            complete_target_years: COMPLETE_TARGET_YEARS,
            premium_target_years: PREMIUM_TARGET_YEARS,
            starting_battery: Money::from_minor(17_999, currency),
            premium_propeller: Money::from_minor(94_900, currency),
            fuel_tank: Money::from_minor(14_999, currency),
            beyond_table: None,
            recommendations: default_rules(),
        }
    }

    /// Standard financing terms with no promotion, down payment or deferral.
    pub fn financing_options(&self) -> FinancingOptions<'a> {
        FinancingOptions {
            default_rate: self.default_apr,
            term_months: self.term_months,
            ..FinancingOptions::default()
        }
    }

    /// `table` with the configured beyond-table policy, if one is set.
    pub fn warranty_table(&self, table: &WarrantyPriceTable<'a>) -> WarrantyPriceTable<'a> {
        match self.beyond_table {
            Some(policy) => table.clone().with_policy(policy),
            None => table.clone(),
        }
    }

    /// Check that coverage years and targets are consistent and prices share the currency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for inconsistent values or negative package costs and
    /// [`ConfigError::Pricing`] for prices in another currency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.term_months == 0 {
            return Err(ConfigError::Invalid("term_months must be positive".to_string()));
        }

        if self.default_apr.is_sign_negative() {
            return Err(ConfigError::Invalid(format!(
                "default_apr must not be negative, got {}",
                self.default_apr
            )));
        }

        let years = [
            self.base_coverage_years,
            self.complete_target_years,
            self.premium_target_years,
            self.max_coverage_years,
        ];

        if !years.is_sorted() {
            return Err(ConfigError::Invalid(format!(
                "coverage years must satisfy base <= complete <= premium <= max, got {years:?}"
            )));
        }

        for (name, cost) in [
            ("starting_battery", &self.starting_battery),
            ("premium_propeller", &self.premium_propeller),
            ("fuel_tank", &self.fuel_tank),
        ] {
            ensure_currency(self.currency, cost)?;

            if cost.is_negative() {
                return Err(ConfigError::Invalid(format!(
                    "{name} must not be negative, got {cost}"
                )));
            }
        }

        Ok(())
    }
}

impl Default for PricingConfig<'_> {
    fn default() -> Self {
        Self::for_currency(iso::CAD)
    }
}

/// Config file layout. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    currency: Option<String>,
    tax_rate: Option<String>,
    default_apr: Option<f64>,
    term_months: Option<u32>,
    #[serde(default)]
    coverage: CoverageFile,
    #[serde(default)]
    package_costs: PackageCostsFile,
    warranty_beyond_table: Option<BeyondTablePolicy>,
    recommendations: Option<Vec<RecommendationRule>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct CoverageFile {
    base_years: Option<u32>,
    max_years: Option<u32>,
    complete_target_years: Option<u32>,
    premium_target_years: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PackageCostsFile {
    starting_battery: Option<String>,
    premium_propeller: Option<String>,
    fuel_tank: Option<String>,
}

impl PricingConfig<'static> {
    /// Parse a YAML config, starting from the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed, a value cannot be parsed, or the result
    /// fails [`PricingConfig::validate`].
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = serde_norway::from_str(yaml)?;

        let currency = file
            .currency
            .as_deref()
            .map(parse_currency)
            .transpose()?
            .unwrap_or(iso::CAD);

        let mut config = Self::for_currency(currency);

        if let Some(tax_rate) = file.tax_rate.as_deref() {
            config.tax_rate = parse_percentage(tax_rate)?;
        }

        if let Some(apr) = file.default_apr {
            config.default_apr = decimal(apr)?;
        }

        let coverage = file.coverage;
        let costs = file.package_costs;

        config.term_months = file.term_months.unwrap_or(config.term_months);
        config.base_coverage_years = coverage.base_years.unwrap_or(config.base_coverage_years);
        config.max_coverage_years = coverage.max_years.unwrap_or(config.max_coverage_years);
        config.complete_target_years = coverage
            .complete_target_years
            .unwrap_or(config.complete_target_years);
        config.premium_target_years = coverage
            .premium_target_years
            .unwrap_or(config.premium_target_years);

        for (slot, value) in [
            (&mut config.starting_battery, costs.starting_battery),
            (&mut config.premium_propeller, costs.premium_propeller),
            (&mut config.fuel_tank, costs.fuel_tank),
        ] {
            if let Some(price) = value {
                *slot = parse_price(&price)?;
            }
        }

        config.beyond_table = file.warranty_beyond_table.or(config.beyond_table);

        if let Some(recommendations) = file.recommendations {
            config.recommendations = recommendations;
        }

        config.validate()?;

        Ok(config)
    }

    /// Load a YAML config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or [`PricingConfig::from_yaml_str`] fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_yaml_str(&fs::read_to_string(path)?)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use rusty_money::iso::{CAD, USD};
    use testresult::TestResult;

    use crate::packages::{BoatType, PackageId};

    use super::*;

    #[test]
    fn defaults_are_valid() -> TestResult {
        let config = PricingConfig::default();

        config.validate()?;

        assert_eq!(config.currency, CAD);
        assert_eq!(config.tax_rate * Decimal::ONE, Decimal::new(13, 2));
        assert_eq!(config.default_apr, Decimal::new(799, 2));
        assert_eq!(config.term_months, 60);
        assert_eq!(
            [
                config.base_coverage_years,
                config.complete_target_years,
                config.premium_target_years,
                config.max_coverage_years
            ],
            [3, 7, 8, 8]
        );

        Ok(())
    }

    #[test]
    fn empty_yaml_keeps_defaults() -> TestResult {
        assert_eq!(PricingConfig::from_yaml_str("{}")?, PricingConfig::default());

        Ok(())
    }

    #[test]
    fn yaml_overrides_selected_fields() -> TestResult {
        let config = PricingConfig::from_yaml_str(
            r#"
currency: USD
tax_rate: "8.25%"
default_apr: 6.49
coverage:
  complete_target_years: 6
package_costs:
  fuel_tank: "129.00 USD"
warranty_beyond_table: extend_last_year
recommendations:
  - boat_types: [pontoon]
    package: best
    reason: pontoons get everything
"#,
        )?;

        assert_eq!(config.currency, USD);
        assert_eq!(config.tax_rate * Decimal::ONE, Decimal::new(825, 4));
        assert_eq!(config.default_apr, Decimal::new(649, 2));
        assert_eq!(config.complete_target_years, 6);
        assert_eq!(config.premium_target_years, 8);
        assert_eq!(config.fuel_tank, Money::from_minor(12_900, USD));
        assert_eq!(config.starting_battery, Money::from_minor(17_999, USD));
        assert_eq!(config.beyond_table, Some(BeyondTablePolicy::ExtendLastYear));

        let rule = config.recommendations.first().ok_or("no rule")?;

        assert_eq!(rule.boat_types, [BoatType::Pontoon]);
        assert_eq!(rule.package, PackageId::Best);

        Ok(())
    }

    #[test]
    fn rejects_targets_out_of_order() {
        let result = PricingConfig::from_yaml_str(
            "coverage:\n  complete_target_years: 8\n  premium_target_years: 7\n",
        );

        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_costs_in_another_currency() {
        let result =
            PricingConfig::from_yaml_str("package_costs:\n  fuel_tank: \"129.00 USD\"\n");

        assert!(matches!(
            result,
            Err(ConfigError::Pricing(PricingError::CurrencyMismatch { .. }))
        ));
    }

    #[test]
    fn rejects_negative_package_costs() {
        for key in ["starting_battery", "premium_propeller", "fuel_tank"] {
            let result = PricingConfig::from_yaml_str(&format!(
                "package_costs:\n  {key}: \"-2000.00 CAD\"\n"
            ));

            assert!(
                matches!(result, Err(ConfigError::Invalid(_))),
                "negative {key} accepted"
            );
        }
    }

    #[test]
    fn rejects_unknown_fields() {
        let result = PricingConfig::from_yaml_str("tax: 13%\n");

        assert!(matches!(result, Err(ConfigError::Yaml(_))));
    }

    #[test]
    fn loads_from_file() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("pricing.yml");

        fs::write(&path, "term_months: 72\n")?;

        assert_eq!(PricingConfig::load(&path)?.term_months, 72);

        Ok(())
    }

    #[test]
    fn financing_options_use_configured_terms() {
        let config = PricingConfig {
            default_apr: Decimal::new(599, 2),
            term_months: 48,
            ..PricingConfig::default()
        };

        let options = config.financing_options();

        assert_eq!(options.default_rate, Decimal::new(599, 2));
        assert_eq!(options.term_months, 48);
        assert_eq!(options.promo_rate, None);
    }

    #[test]
    fn warranty_policy_override_is_optional() {
        let table = crate::warranty::test_support::table()
            .with_policy(BeyondTablePolicy::ExtendLastYear);

        let keep = PricingConfig::default();
        let clamp = PricingConfig {
            beyond_table: Some(BeyondTablePolicy::Clamp),
            ..PricingConfig::default()
        };

        assert_eq!(keep.warranty_table(&table).policy(), BeyondTablePolicy::ExtendLastYear);
        assert_eq!(clamp.warranty_table(&table).policy(), BeyondTablePolicy::Clamp);
    }
}
