//! Quote Sessions
//!
//! A customer's quote in progress: one motor, the promotions that apply to it on the quote
//! date, and the selections made so far.

use jiff::civil::Date;
use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use tracing::debug;

use crate::{
    config::PricingConfig,
    financing::{FinancingOptions, MonthlyPayment},
    money::{self, PricingError, amount, ensure_currency},
    motors::Motor,
    options::{QuoteOption, accessories_total},
    packages::{
        BoatType, PackageOption, PackageSelections, PurchasePath, Recommendation,
        build_packages, mark_recommended, recommend_package,
    },
    promotions::{
        BonusChoice, BonusResolution, PromotionMatch, PromotionNotice, PromotionRule, match_rules,
    },
    quote::{QuoteInput, QuoteTotals, compute_totals},
    trade_in::TradeInInfo,
    warranty::WarrantyPriceTable,
};

/// A quote being configured for one motor.
#[derive(Debug, Clone)]
pub struct QuoteSession<'r, 'a> {
    motor: &'r Motor<'a>,
    promotions: PromotionMatch<'r, 'a>,
    bonus: Option<(BonusChoice, BonusResolution<'a>)>,
    options: Vec<QuoteOption<'a>>,
    trade_in: TradeInInfo<'a>,
    admin_discount: Money<'a, Currency>,
    admin_notes: Option<String>,
    down_payment: Option<Money<'a, Currency>>,
    notices: Vec<PromotionNotice>,
}

impl<'r, 'a> QuoteSession<'r, 'a> {
    /// Start a quote for `motor`, applying whichever of `rules` match on `as_of`.
    pub fn new(motor: &'r Motor<'a>, rules: &'r [PromotionRule<'a>], as_of: Date) -> Self {
        let currency = motor.currency();

        Self {
            motor,
            promotions: match_rules(motor, rules, as_of),
            bonus: None,
            options: Vec::new(),
            trade_in: TradeInInfo::none(currency),
            admin_discount: money::zero(currency),
            admin_notes: None,
            down_payment: None,
            notices: Vec::new(),
        }
    }

    /// Quote currency.
    pub fn currency(&self) -> &'a Currency {
        self.motor.currency()
    }

    /// The motor being quoted
    pub fn motor(&self) -> &'r Motor<'a> {
        self.motor
    }

    /// Promotions applied to the motor
    pub fn promotions(&self) -> &PromotionMatch<'r, 'a> {
        &self.promotions
    }

    /// Chosen bonus and what it resolved to
    pub fn bonus(&self) -> Option<&(BonusChoice, BonusResolution<'a>)> {
        self.bonus.as_ref()
    }

    /// Selected accessories
    pub fn options(&self) -> &[QuoteOption<'a>] {
        &self.options
    }

    /// Trade-in
    pub fn trade_in(&self) -> &TradeInInfo<'a> {
        &self.trade_in
    }

    /// Staff discount
    pub fn admin_discount(&self) -> Money<'a, Currency> {
        self.admin_discount
    }

    /// Staff notes
    pub fn admin_notes(&self) -> Option<&str> {
        self.admin_notes.as_deref()
    }

    /// Down payment
    pub fn down_payment(&self) -> Option<&Money<'a, Currency>> {
        self.down_payment.as_ref()
    }

    /// Diagnostics raised while configuring the quote
    pub fn notices(&self) -> &[PromotionNotice] {
        &self.notices
    }

    /// Pick one of the promotion's bonus options.
    ///
    /// A choice the promotions do not offer is recorded as a notice and leaves any earlier
    /// choice in place; the quote carries on without it.
    pub fn choose_bonus(&mut self, choice: BonusChoice) -> Option<&BonusResolution<'a>> {
        match self.promotions.resolve_bonus(choice, self.motor.horsepower) {
            Ok(resolution) => {
                debug!(?choice, ?resolution, "bonus chosen");

                self.bonus = Some((choice, resolution));
            }
            Err(notice) => self.notices.push(notice),
        }

        self.bonus.as_ref().map(|(_, resolution)| resolution)
    }

    /// Add an accessory.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::CurrencyMismatch`] if the option is priced in another currency.
    pub fn add_option(&mut self, option: QuoteOption<'a>) -> Result<(), PricingError> {
        ensure_currency(self.currency(), &option.price)?;

        self.options.push(option);

        Ok(())
    }

    /// Record a trade-in.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::CurrencyMismatch`] if the estimate is in another currency.
    pub fn set_trade_in(&mut self, trade_in: TradeInInfo<'a>) -> Result<(), PricingError> {
        ensure_currency(self.currency(), &trade_in.estimated_value)?;

        self.trade_in = trade_in;

        Ok(())
    }

    /// Apply a staff discount with optional notes.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::CurrencyMismatch`] if the discount is in another currency.
    pub fn set_admin_discount(
        &mut self,
        discount: Money<'a, Currency>,
        notes: Option<String>,
    ) -> Result<(), PricingError> {
        ensure_currency(self.currency(), &discount)?;

        self.admin_discount = discount;
        self.admin_notes = notes;

        Ok(())
    }

    /// Set a down payment.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::CurrencyMismatch`] if the payment is in another currency.
    pub fn set_down_payment(
        &mut self,
        down_payment: Money<'a, Currency>,
    ) -> Result<(), PricingError> {
        ensure_currency(self.currency(), &down_payment)?;

        self.down_payment = Some(down_payment);

        Ok(())
    }

    /// Promotional value: matched discounts plus any chosen cash rebate.
    pub fn promo_value(&self) -> Money<'a, Currency> {
        let rebate = match &self.bonus {
            Some((_, BonusResolution::Rebate(rebate))) => amount(rebate),
            _ => Decimal::ZERO,
        };

        money::exact(amount(&self.promotions.total_discount) + rebate, self.currency())
    }

    /// Inputs for [`compute_totals`].
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::CurrencyMismatch`] if `config` prices in another currency.
    pub fn quote_input(
        &self,
        config: &PricingConfig<'a>,
    ) -> Result<QuoteInput<'a>, PricingError> {
        let currency = self.currency();

        if config.currency != currency {
            return Err(PricingError::CurrencyMismatch {
                expected: currency.iso_alpha_code.to_string(),
                found: config.currency.iso_alpha_code.to_string(),
            });
        }

        Ok(QuoteInput::new(self.motor.msrp)
            .with_dealer_discount(self.motor.dealer_discount())?
            .with_promo_value(self.promo_value())?
            .with_admin_discount(self.admin_discount)?
            .with_accessories(accessories_total(&self.options, currency)?)?
            .with_trade_in(self.trade_in.effective_value())?
            .with_tax_rate(config.tax_rate))
    }

    /// Quote totals.
    ///
    /// # Errors
    ///
    /// See [`QuoteSession::quote_input`].
    pub fn totals(&self, config: &PricingConfig<'a>) -> Result<QuoteTotals<'a>, PricingError> {
        Ok(compute_totals(&self.quote_input(config)?))
    }

    /// Financing terms: configured defaults, overridden by a chosen financing or deferral
    /// bonus.
    pub fn financing_options(&self, config: &PricingConfig<'a>) -> FinancingOptions<'a> {
        let mut options = FinancingOptions {
            down_payment: self.down_payment,
            ..config.financing_options()
        };

        match &self.bonus {
            Some((_, BonusResolution::Financing { rate, term_months })) => {
                options.promo_rate = Some(*rate);
                options.term_months = term_months.unwrap_or(options.term_months);
            }
            Some((_, BonusResolution::Deferral { months })) => options.deferred_months = *months,
            Some((_, BonusResolution::Rebate(_))) | None => {}
        }

        options
    }

    /// Monthly payment on the quote total.
    ///
    /// # Errors
    ///
    /// See [`QuoteSession::quote_input`].
    pub fn monthly_payment(
        &self,
        config: &PricingConfig<'a>,
    ) -> Result<MonthlyPayment<'a>, PricingError> {
        let totals = self.totals(config)?;

        Ok(self.financing_options(config).payment_for(&totals.total))
    }

    /// Recommend a package for the motor on `boat_type`.
    pub fn recommend(
        &self,
        config: &PricingConfig<'a>,
        boat_type: Option<BoatType>,
        purchase_path: PurchasePath,
    ) -> Recommendation {
        recommend_package(
            &config.recommendations,
            boat_type,
            Some(self.motor.horsepower),
            purchase_path,
        )
    }

    /// Build the three package tiers with `recommended` flagged.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::CurrencyMismatch`] if the config, warranty table or down
    /// payment are in another currency.
    #[tracing::instrument(skip_all, fields(model = %self.motor.model))]
    pub fn packages(
        &self,
        config: &PricingConfig<'a>,
        warranty_table: &WarrantyPriceTable<'a>,
        recommended: &Recommendation,
    ) -> Result<[PackageOption<'a>; 3], PricingError> {
        let warranty_table = config.warranty_table(warranty_table);
        let selections = PackageSelections::new(
            self.quote_input(config)?,
            &warranty_table,
            config,
            self.financing_options(config),
        )?;

        let mut packages = build_packages(
            self.motor,
            config.base_coverage_years,
            self.promotions.total_warranty_bonus_years,
            &selections,
        );

        mark_recommended(&mut packages, recommended.package_id);

        Ok(packages)
    }
}
