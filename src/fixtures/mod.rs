//! Fixtures
//!
//! YAML catalogs of motors, promotions, warranty prices and accessories. A set is loaded from
//! `<base>/<category>/<name>.yml` and must be priced in a single currency.

use std::{fs, path::PathBuf};

use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};
use slotmap::SlotMap;
use thiserror::Error;
use tracing::debug;

use crate::{
    fixtures::{
        motors::MotorsFixture, options::OptionsFixture, promotions::PromotionsFixture,
        warranty::WarrantyFixture,
    },
    motors::{Motor, MotorKey},
    options::QuoteOption,
    promotions::{BonusOption, PromotionRule},
    warranty::{WarrantyBracket, WarrantyPriceTable},
};

pub mod motors;
pub mod options;
pub mod promotions;
pub mod values;
pub mod warranty;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Invalid percentage format
    #[error("Invalid percentage format: {0}")]
    InvalidPercentage(String),

    /// Number that has no decimal representation
    #[error("Invalid number: {0}")]
    InvalidNumber(f64),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Motor not found
    #[error("Motor not found: {0}")]
    MotorNotFound(String),

    /// Option not found
    #[error("Option not found: {0}")]
    OptionNotFound(String),

    /// A key was defined twice
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    /// Invalid motor data
    #[error("Invalid motor data: {0}")]
    InvalidMotor(String),

    /// Invalid promotion data
    #[error("Invalid promotion data: {0}")]
    InvalidPromotionData(String),

    /// Invalid warranty data
    #[error("Invalid warranty data: {0}")]
    InvalidWarranty(String),

    /// Currency mismatch between fixtures
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// Nothing priced has been loaded yet
    #[error("No prices loaded yet; currency unknown")]
    NoCurrency,

    /// No warranty table loaded
    #[error("No warranty price table loaded")]
    NoWarrantyTable,
}

/// Catalog of everything a quote draws on
#[derive(Debug)]
pub struct Catalog<'a> {
    /// Base path for fixture files
    base_path: PathBuf,

    motors: SlotMap<MotorKey, Motor<'a>>,
    motor_keys: FxHashMap<String, MotorKey>,

    /// Promotions in file order
    promotions: Vec<PromotionRule<'a>>,

    warranty: Option<WarrantyPriceTable<'a>>,

    options: Vec<QuoteOption<'a>>,
    option_keys: FxHashMap<String, usize>,

    /// Currency for the fixture set
    currency: Option<&'a Currency>,
}

impl<'a> Catalog<'a> {
    /// Create a new empty catalog with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty catalog with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            motors: SlotMap::with_key(),
            motor_keys: FxHashMap::default(),
            promotions: Vec::new(),
            warranty: None,
            options: Vec::new(),
            option_keys: FxHashMap::default(),
            currency: None,
        }
    }

    fn read<T: serde::de::DeserializeOwned>(
        &self,
        category: &str,
        name: &str,
    ) -> Result<T, FixtureError> {
        let file_path = self.base_path.join(category).join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;

        debug!(path = %file_path.display(), "loading fixture");

        Ok(serde_norway::from_str(&contents)?)
    }

    /// Record `money`'s currency, or check it against the one already recorded.
    fn track_currency(&mut self, money: &Money<'a, Currency>) -> Result<(), FixtureError> {
        let currency = money.currency();

        match self.currency {
            Some(existing) if existing != currency => Err(FixtureError::CurrencyMismatch(
                existing.iso_alpha_code.to_string(),
                currency.iso_alpha_code.to_string(),
            )),
            Some(_) => Ok(()),
            None => {
                self.currency = Some(currency);
                Ok(())
            }
        }
    }

    /// Load motors from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, a motor is invalid, a key is
    /// repeated, or prices are in more than one currency.
    pub fn load_motors(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: MotorsFixture = self.read("motors", name)?;

        for motor_fixture in fixture.motors {
            let key = motor_fixture.key.clone();

            if self.motor_keys.contains_key(&key) {
                return Err(FixtureError::DuplicateKey(key));
            }

            let motor: Motor<'a> = motor_fixture.try_into()?;

            self.track_currency(&motor.msrp)?;

            let motor_key = self.motors.insert(motor);

            self.motor_keys.insert(key, motor_key);
        }

        Ok(self)
    }

    /// Load promotions from a YAML fixture file, appending to any already loaded
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, a rule is invalid, or amounts
    /// are in another currency.
    pub fn load_promotions(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: PromotionsFixture = self.read("promotions", name)?;

        for promotion_fixture in fixture.promotions {
            let rule: PromotionRule<'a> = promotion_fixture.try_into()?;

            if let Some(fixed) = &rule.discount_fixed_amount {
                self.track_currency(fixed)?;
            }

            for option in &rule.bonus_options {
                if let BonusOption::CashRebate { tiers } = option {
                    for tier in tiers {
                        self.track_currency(&tier.amount)?;
                    }
                }
            }

            self.promotions.push(rule);
        }

        Ok(self)
    }

    /// Load the warranty price table from a YAML fixture file, replacing any loaded before
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, a bracket is invalid, or prices
    /// are in another currency.
    pub fn load_warranty(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: WarrantyFixture = self.read("warranty", name)?;

        let brackets = fixture
            .brackets
            .into_iter()
            .map(WarrantyBracket::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        for price in brackets.iter().flat_map(|bracket| &bracket.year_prices) {
            self.track_currency(price)?;
        }

        let currency = self.currency.ok_or(FixtureError::NoCurrency)?;

        let table = WarrantyPriceTable::new(currency, brackets).with_policy(fixture.policy);

        self.warranty = Some(table);

        Ok(self)
    }

    /// Load accessories from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, a key is repeated, or prices are
    /// in another currency.
    pub fn load_options(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: OptionsFixture = self.read("options", name)?;

        for option_fixture in fixture.options {
            let key = option_fixture.key.clone();

            if self.option_keys.contains_key(&key) {
                return Err(FixtureError::DuplicateKey(key));
            }

            let option: QuoteOption<'a> = option_fixture.try_into()?;

            self.track_currency(&option.price)?;
            self.option_keys.insert(key, self.options.len());
            self.options.push(option);
        }

        Ok(self)
    }

    /// Load motors, promotions, warranty prices and options with the same name
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn load_set(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        self.load_motors(name)?
            .load_promotions(name)?
            .load_warranty(name)?
            .load_options(name)
    }

    /// Load a complete fixture set from the default base path
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        let mut catalog = Self::new();

        catalog.load_set(name)?;

        Ok(catalog)
    }

    /// Get a motor by its string key
    ///
    /// # Errors
    ///
    /// Returns an error if the motor is not found.
    pub fn motor(&self, key: &str) -> Result<&Motor<'a>, FixtureError> {
        let motor_key = self.motor_key(key)?;

        self.motors
            .get(motor_key)
            .ok_or_else(|| FixtureError::MotorNotFound(key.to_string()))
    }

    /// Get a motor key by its string key
    ///
    /// # Errors
    ///
    /// Returns an error if the motor is not found.
    pub fn motor_key(&self, key: &str) -> Result<MotorKey, FixtureError> {
        self.motor_keys
            .get(key)
            .copied()
            .ok_or_else(|| FixtureError::MotorNotFound(key.to_string()))
    }

    /// Motors with their string keys, sorted by key
    pub fn motors(&self) -> Vec<(&str, &Motor<'a>)> {
        let mut motors: Vec<_> = self
            .motor_keys
            .iter()
            .filter_map(|(key, motor_key)| {
                self.motors
                    .get(*motor_key)
                    .map(|motor| (key.as_str(), motor))
            })
            .collect();

        motors.sort_unstable_by_key(|(key, _)| *key);
        motors
    }

    /// Get the motor `SlotMap`
    pub fn motor_map(&self) -> &SlotMap<MotorKey, Motor<'a>> {
        &self.motors
    }

    /// All promotions, in file order
    pub fn promotions(&self) -> &[PromotionRule<'a>] {
        &self.promotions
    }

    /// Get the warranty price table
    ///
    /// # Errors
    ///
    /// Returns an error if no warranty table has been loaded.
    pub fn warranty_table(&self) -> Result<&WarrantyPriceTable<'a>, FixtureError> {
        self.warranty.as_ref().ok_or(FixtureError::NoWarrantyTable)
    }

    /// Get an accessory by its string key
    ///
    /// # Errors
    ///
    /// Returns an error if the option is not found.
    pub fn option(&self, key: &str) -> Result<&QuoteOption<'a>, FixtureError> {
        self.option_keys
            .get(key)
            .and_then(|index| self.options.get(*index))
            .ok_or_else(|| FixtureError::OptionNotFound(key.to_string()))
    }

    /// All accessories, in file order
    pub fn options(&self) -> &[QuoteOption<'a>] {
        &self.options
    }

    /// Get the currency
    ///
    /// # Errors
    ///
    /// Returns an error if nothing priced has been loaded yet.
    pub fn currency(&self) -> Result<&'a Currency, FixtureError> {
        self.currency.ok_or(FixtureError::NoCurrency)
    }
}

impl Default for Catalog<'_> {
    fn default() -> Self {
        Self::new()
    }
}
