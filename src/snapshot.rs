//! Quote Snapshots
//!
//! A saved quote as self-contained JSON. Amounts are stored as exact decimal strings in the
//! quote currency so the totals can be rebuilt later without the catalog.

use decimal_percentage::Percentage;
use jiff::Timestamp;
use rust_decimal::Decimal;
use rusty_money::{Findable, iso::Currency};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    config::PricingConfig,
    financing::{FinancingOptions, MonthlyPayment},
    money::{self, PricingError, amount},
    packages::{PackageId, PackageOption},
    promotions::BonusChoice,
    quote::{QuoteInput, QuoteSession, QuoteTotals, compute_totals},
    trade_in::TradeInInfo,
};

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Snapshot decoding and validation errors
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// JSON encoding or decoding error
    #[error("Failed to encode or decode snapshot: {0}")]
    Json(#[from] serde_json::Error),

    /// Snapshot written by an unknown format version
    #[error("Unsupported snapshot version {found}, expected {expected}")]
    UnsupportedVersion {
        /// Version in the snapshot
        found: u32,
        /// Version this build reads
        expected: u32,
    },

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// A field holds a value no quote could produce
    #[error("Invalid snapshot field {field}: {reason}")]
    InvalidField {
        /// Field name
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },

    /// Rebuilt inputs failed validation
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

/// Motor identity at the time of quoting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotorSnapshot {
    /// Model name
    pub model: String,

    /// Rated horsepower
    pub horsepower: Decimal,

    /// MSRP
    pub msrp: Decimal,

    /// Dealer discount
    pub dealer_discount: Decimal,
}

/// A quoted accessory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionSnapshot {
    /// Display name
    pub name: String,

    /// Price
    pub price: Decimal,

    /// Added by the selected package rather than picked by the customer
    #[serde(default)]
    pub from_package: bool,
}

/// Trade-in details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeInSnapshot {
    /// Estimated value before any penalty
    pub estimated_value: Decimal,

    /// Fraction of the estimate kept
    #[serde(default)]
    pub penalty_factor: Option<Decimal>,

    /// Why the penalty applies
    #[serde(default)]
    pub penalty_reason: Option<String>,
}

/// Purchased coverage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarrantySnapshot {
    /// Total coverage years
    pub total_years: u32,

    /// Years beyond factory coverage
    pub extended_years: u32,

    /// Price of the purchased years
    pub price: Decimal,
}

/// Financing inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancingSnapshot {
    /// Promotional APR in percent points
    #[serde(default)]
    pub promo_rate: Option<Decimal>,

    /// Standard APR in percent points
    pub default_rate: Decimal,

    /// Loan term in months
    pub term_months: u32,

    /// Down payment
    #[serde(default)]
    pub down_payment: Option<Decimal>,

    /// Months before the first payment
    #[serde(default)]
    pub deferred_months: u32,
}

/// A persisted quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteSnapshot {
    /// Format version
    pub version: u32,

    /// ISO currency code
    pub currency: String,

    /// When the quote was saved
    #[serde(default)]
    pub saved_at: Option<Timestamp>,

    /// Motor identity
    pub motor: MotorSnapshot,

    /// Applied promotion IDs
    #[serde(default)]
    pub promotions: Vec<String>,

    /// Chosen bonus
    #[serde(default)]
    pub bonus: Option<BonusChoice>,

    /// Promotional value, rebate included
    pub promo_value: Decimal,

    /// Staff discount
    pub admin_discount: Decimal,

    /// Staff notes
    #[serde(default)]
    pub admin_notes: Option<String>,

    /// Accessories
    #[serde(default)]
    pub options: Vec<OptionSnapshot>,

    /// Trade-in, if any
    #[serde(default)]
    pub trade_in: Option<TradeInSnapshot>,

    /// Tax rate as a fraction
    pub tax_rate: Decimal,

    /// Purchased coverage
    #[serde(default)]
    pub warranty: Option<WarrantySnapshot>,

    /// Selected package
    #[serde(default)]
    pub package: Option<PackageId>,

    /// Financing inputs
    pub financing: FinancingSnapshot,
}

impl QuoteSnapshot {
    /// Capture a session, with `package`'s extras and coverage when one is selected.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::CurrencyMismatch`] if `config` prices in another currency.
    pub fn capture<'a>(
        session: &QuoteSession<'_, 'a>,
        config: &PricingConfig<'a>,
        package: Option<&PackageOption<'a>>,
    ) -> Result<Self, PricingError> {
        let input = session.quote_input(config)?;
        let motor = session.motor();
        let trade_in = session.trade_in();
        let financing = session.financing_options(config);

        let customer_options = session.options().iter().map(|option| (option, false));
        let package_options = package
            .into_iter()
            .flat_map(|package| &package.items)
            .map(|option| (option, true));

        let options = customer_options
            .chain(package_options)
            .map(|(option, from_package)| OptionSnapshot {
                name: option.name.clone(),
                price: amount(&option.price),
                from_package,
            })
            .collect();

        Ok(Self {
            version: SNAPSHOT_VERSION,
            currency: session.currency().iso_alpha_code.to_string(),
            saved_at: None,
            motor: MotorSnapshot {
                model: motor.model.clone(),
                horsepower: motor.horsepower,
                msrp: amount(&motor.msrp),
                dealer_discount: amount(&input.dealer_discount()),
            },
            promotions: session
                .promotions()
                .applied_ids()
                .into_iter()
                .map(str::to_string)
                .collect(),
            bonus: session.bonus().map(|(choice, _)| *choice),
            promo_value: amount(&input.promo_value()),
            admin_discount: amount(&input.admin_discount()),
            admin_notes: session.admin_notes().map(str::to_string),
            options,
            trade_in: trade_in.has_trade_in.then(|| TradeInSnapshot {
                estimated_value: amount(&trade_in.estimated_value),
                penalty_factor: trade_in
                    .penalty
                    .as_ref()
                    .map(|penalty| penalty.factor * Decimal::ONE),
                penalty_reason: trade_in
                    .penalty
                    .as_ref()
                    .map(|penalty| penalty.reason.clone()),
            }),
            tax_rate: input.tax_rate() * Decimal::ONE,
            warranty: package.map(|package| WarrantySnapshot {
                total_years: package.warranty.total_years,
                extended_years: package.warranty.extended_years,
                price: amount(&package.warranty.warranty_price),
            }),
            package: package.map(|package| package.id),
            financing: FinancingSnapshot {
                promo_rate: financing.promo_rate,
                default_rate: financing.default_rate,
                term_months: financing.term_months,
                down_payment: financing.down_payment.as_ref().map(amount),
                deferred_months: financing.deferred_months,
            },
        })
    }

    /// Stamp the save time.
    #[must_use]
    pub fn saved_at(mut self, timestamp: Timestamp) -> Self {
        self.saved_at = Some(timestamp);
        self
    }

    /// Quote currency.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::UnknownCurrency`] if the code is not an ISO currency.
    pub fn currency(&self) -> Result<&'static Currency, SnapshotError> {
        Currency::find(&self.currency)
            .ok_or_else(|| SnapshotError::UnknownCurrency(self.currency.clone()))
    }

    /// Check the version, currency and amounts.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: self.version,
                expected: SNAPSHOT_VERSION,
            });
        }

        self.currency()?;

        let non_negative = [
            ("motor.msrp", self.motor.msrp),
            ("motor.horsepower", self.motor.horsepower),
            ("tax_rate", self.tax_rate),
            ("financing.default_rate", self.financing.default_rate),
        ];

        for (field, value) in non_negative {
            if value.is_sign_negative() {
                return Err(SnapshotError::InvalidField {
                    field,
                    reason: format!("{value} is negative"),
                });
            }
        }

        if let Some(factor) = self.trade_in.as_ref().and_then(|trade| trade.penalty_factor)
            && !(Decimal::ZERO..=Decimal::ONE).contains(&factor)
        {
            return Err(SnapshotError::InvalidField {
                field: "trade_in.penalty_factor",
                reason: format!("{factor} is outside 0..=1"),
            });
        }

        Ok(())
    }

    /// Encode as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Json`] if encoding fails.
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decode and validate a JSON snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Json`] for malformed JSON, otherwise see
    /// [`QuoteSnapshot::validate`].
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let snapshot: Self = serde_json::from_str(json)?;

        snapshot.validate()?;

        Ok(snapshot)
    }

    /// Rebuild the quote inputs.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::UnknownCurrency`] if the currency code is not recognised.
    pub fn quote_input(&self) -> Result<QuoteInput<'static>, SnapshotError> {
        let currency = self.currency()?;
        let exact = |value: Decimal| money::exact(value, currency);

        let accessories = self
            .options
            .iter()
            .map(|option| option.price)
            .chain(self.warranty.as_ref().map(|warranty| warranty.price))
            .sum::<Decimal>();

        let trade_in = self.trade_in.as_ref().map_or_else(
            || TradeInInfo::none(currency),
            |trade| {
                let info = TradeInInfo::with_value(exact(trade.estimated_value));

                match trade.penalty_factor {
                    Some(factor) => info.with_penalty(
                        Percentage::from(factor),
                        trade.penalty_reason.clone().unwrap_or_default(),
                    ),
                    None => info,
                }
            },
        );

        Ok(QuoteInput::new(exact(self.motor.msrp))
            .with_dealer_discount(exact(self.motor.dealer_discount))?
            .with_promo_value(exact(self.promo_value))?
            .with_admin_discount(exact(self.admin_discount))?
            .with_accessories(exact(accessories))?
            .with_trade_in(trade_in.effective_value())?
            .with_tax_rate(Percentage::from(self.tax_rate)))
    }

    /// Rebuild the quote totals.
    ///
    /// # Errors
    ///
    /// See [`QuoteSnapshot::quote_input`].
    pub fn recompute(&self) -> Result<QuoteTotals<'static>, SnapshotError> {
        Ok(compute_totals(&self.quote_input()?))
    }

    /// Rebuild the monthly payment.
    ///
    /// # Errors
    ///
    /// See [`QuoteSnapshot::quote_input`].
    pub fn recompute_payment(&self) -> Result<MonthlyPayment<'static>, SnapshotError> {
        let currency = self.currency()?;
        let totals = self.recompute()?;

        let options = FinancingOptions {
            promo_rate: self.financing.promo_rate,
            default_rate: self.financing.default_rate,
            term_months: self.financing.term_months,
            down_payment: self
                .financing
                .down_payment
                .map(|down| money::exact(down, currency)),
            deferred_months: self.financing.deferred_months,
        };

        Ok(options.payment_for(&totals.total))
    }
}

#[cfg(test)]
mod tests {
    use jiff::civil::Date;
    use rusty_money::{Money, iso::CAD};
    use testresult::TestResult;

    use crate::{
        motors::test_support::motor,
        options::QuoteOption,
        packages::{BoatType, PurchasePath},
        warranty::test_support::table,
    };

    use super::*;

    fn cad(minor: i64) -> Money<'static, Currency> {
        Money::from_minor(minor, CAD)
    }

    #[test]
    fn restored_snapshot_recomputes_package_totals() -> TestResult {
        let config = PricingConfig::default();
        let table = table();
        let mut m = motor("115ELPT", Decimal::from(115), 1_500_000);
        m.dealer_price = Some(cad(1_450_000));

        let mut session = QuoteSession::new(&m, &[], Date::constant(2026, 5, 1));

        session.add_option(QuoteOption::new("Gauge", cad(124_900)))?;
        session.set_trade_in(
            TradeInInfo::with_value(cad(400_000))
                .with_penalty(Percentage::from(Decimal::new(75, 2)), "over ten years old"),
        )?;
        session.set_admin_discount(cad(20_000), Some("repeat customer".to_string()))?;
        session.set_down_payment(cad(100_000))?;

        let recommendation =
            session.recommend(&config, Some(BoatType::Bass), PurchasePath::Installed);
        let packages = session.packages(&config, &table, &recommendation)?;
        let premium = packages
            .iter()
            .find(|package| package.recommended)
            .ok_or("nothing recommended")?;

        let snapshot = QuoteSnapshot::capture(&session, &config, Some(premium))?
            .saved_at("2026-05-01T15:30:00Z".parse()?);
        let restored = QuoteSnapshot::from_json(&snapshot.to_json()?)?;

        assert_eq!(restored, snapshot);
        assert_eq!(restored.package, Some(PackageId::Best));
        assert_eq!(restored.recompute()?, premium.totals);
        assert_eq!(restored.recompute_payment()?, premium.financing);

        Ok(())
    }

    #[test]
    fn amounts_are_stored_as_strings() -> TestResult {
        let config = PricingConfig::default();
        let m = motor("115ELPT", Decimal::from(115), 1_500_050);
        let session = QuoteSession::new(&m, &[], Date::constant(2026, 5, 1));
        let json = QuoteSnapshot::capture(&session, &config, None)?.to_json()?;

        assert!(json.contains(r#""msrp": "15000.50""#), "{json}");

        Ok(())
    }

    #[test]
    fn rejects_unknown_version_and_currency() -> TestResult {
        let config = PricingConfig::default();
        let m = motor("115ELPT", Decimal::from(115), 1_500_000);
        let session = QuoteSession::new(&m, &[], Date::constant(2026, 5, 1));
        let snapshot = QuoteSnapshot::capture(&session, &config, None)?;

        let future = QuoteSnapshot {
            version: SNAPSHOT_VERSION + 1,
            ..snapshot.clone()
        };

        assert!(matches!(
            QuoteSnapshot::from_json(&future.to_json()?),
            Err(SnapshotError::UnsupportedVersion { .. })
        ));

        let unknown = QuoteSnapshot {
            currency: "ZZZ".to_string(),
            ..snapshot
        };

        assert!(matches!(
            QuoteSnapshot::from_json(&unknown.to_json()?),
            Err(SnapshotError::UnknownCurrency(_))
        ));

        Ok(())
    }

    #[test]
    fn rejects_out_of_range_penalty() -> TestResult {
        let config = PricingConfig::default();
        let m = motor("115ELPT", Decimal::from(115), 1_500_000);
        let mut session = QuoteSession::new(&m, &[], Date::constant(2026, 5, 1));

        session.set_trade_in(TradeInInfo::with_value(cad(100_000)))?;

        let mut snapshot = QuoteSnapshot::capture(&session, &config, None)?;

        if let Some(trade_in) = snapshot.trade_in.as_mut() {
            trade_in.penalty_factor = Some(Decimal::from(2));
        }

        assert!(matches!(
            snapshot.validate(),
            Err(SnapshotError::InvalidField {
                field: "trade_in.penalty_factor",
                ..
            })
        ));

        Ok(())
    }
}
