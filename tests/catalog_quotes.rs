//! End-to-end quotes against the `mercury_2026` fixture set.
//!
//! Expected values for the 115ELPT on 2026-04-15:
//!
//! - Get 7 (priority 20) beats Spring Repower (priority 10); neither discounts the price, Get 7
//!   adds 4 warranty years so 7 years are already in force
//! - MSRP $15,999.00 less the $500.00 dealer discount gives a $15,499.00 subtotal
//! - 13% tax is $2,014.87 for a $17,513.87 total
//! - The 30.1-115 HP bracket prices year 8 at $325.00
//! - Complete adds a $179.99 battery; Premium adds the battery, a $949.00 propeller and year 8

use jiff::civil::Date;
use rust_decimal::Decimal;
use rusty_money::{Money, iso::CAD};
use testresult::TestResult;

use outboard_quote::{
    config::PricingConfig,
    fixtures::Catalog,
    packages::{BoatType, PackageId, PurchasePath},
    promotions::{BonusChoice, BonusResolution, PromotionNotice},
    quote::QuoteSession,
    snapshot::QuoteSnapshot,
    trade_in::TradeInInfo,
    warranty::{BeyondTablePolicy, WarrantyNotice},
};

const APRIL: Date = Date::constant(2026, 4, 15);
const MARCH: Date = Date::constant(2026, 3, 15);

fn cad(minor: i64) -> Money<'static, rusty_money::iso::Currency> {
    Money::from_minor(minor, CAD)
}

#[test]
fn exclusive_promotion_with_highest_priority_wins() -> TestResult {
    let catalog = Catalog::from_set("mercury_2026")?;
    let session = QuoteSession::new(catalog.motor("fs-115-elpt")?, catalog.promotions(), APRIL);

    assert_eq!(session.promotions().applied_ids(), vec!["get-7-2026"]);
    assert_eq!(session.promotions().total_warranty_bonus_years, 4);
    assert_eq!(session.promo_value(), cad(0));

    Ok(())
}

#[test]
fn stackable_credits_add_to_the_exclusive_winner() -> TestResult {
    let catalog = Catalog::from_set("mercury_2026")?;
    let motor = catalog.motor("fs-9-9-elpt-ct")?;

    let april = QuoteSession::new(motor, catalog.promotions(), APRIL);

    let mut applied = april.promotions().applied_ids();
    applied.sort_unstable();

    assert_eq!(
        applied,
        vec!["command-thrust-credit", "get-7-2026", "portable-bonus"]
    );
    assert_eq!(april.promo_value(), cad(35_000));

    // Portable bonus starts in April
    let march = QuoteSession::new(motor, catalog.promotions(), MARCH);

    assert_eq!(march.promo_value(), cad(25_000));

    Ok(())
}

#[test]
fn fixture_motor_totals() -> TestResult {
    let catalog = Catalog::from_set("mercury_2026")?;
    let config = PricingConfig::for_currency(catalog.currency()?);
    let session = QuoteSession::new(catalog.motor("fs-115-elpt")?, catalog.promotions(), APRIL);

    let totals = session.totals(&config)?;

    assert_eq!(totals.discount, cad(50_000));
    assert_eq!(totals.subtotal, cad(1_549_900));
    assert_eq!(totals.tax, cad(201_487));
    assert_eq!(totals.total, cad(1_751_387));

    Ok(())
}

#[test]
fn cash_rebate_uses_the_horsepower_tier() -> TestResult {
    let catalog = Catalog::from_set("mercury_2026")?;
    let config = PricingConfig::for_currency(catalog.currency()?);
    let mut session =
        QuoteSession::new(catalog.motor("fs-115-elpt")?, catalog.promotions(), APRIL);

    let resolution = session.choose_bonus(BonusChoice::CashRebate).cloned();

    assert_eq!(resolution, Some(BonusResolution::Rebate(cad(40_000))));
    assert_eq!(session.totals(&config)?.subtotal, cad(1_509_900));

    Ok(())
}

#[test]
fn special_financing_replaces_the_default_rate() -> TestResult {
    let catalog = Catalog::from_set("mercury_2026")?;
    let config = PricingConfig::for_currency(catalog.currency()?);
    let mut session =
        QuoteSession::new(catalog.motor("fs-60-elpt")?, catalog.promotions(), APRIL);

    session.choose_bonus(BonusChoice::SpecialFinancing {
        term_months: Some(48),
    });

    let payment = session.monthly_payment(&config)?;

    assert_eq!(payment.rate, Decimal::new(299, 2));
    assert_eq!(payment.term_months, 48);

    Ok(())
}

#[test]
fn unavailable_bonus_is_a_notice_not_an_error() -> TestResult {
    let catalog = Catalog::from_set("mercury_2026")?;
    let config = PricingConfig::for_currency(catalog.currency()?);

    // Electric motors miss Get 7; the portable bonus offers no bonus options
    let mut session =
        QuoteSession::new(catalog.motor("avator-7-5e")?, catalog.promotions(), APRIL);

    assert!(session.choose_bonus(BonusChoice::NoPayments).is_none());
    assert_eq!(
        session.notices(),
        [PromotionNotice::BonusUnavailable(BonusChoice::NoPayments)]
    );
    assert_eq!(session.totals(&config)?.promo_value, cad(10_000));

    Ok(())
}

#[test]
fn packages_rise_in_price_and_coverage_for_every_motor() -> TestResult {
    let catalog = Catalog::from_set("mercury_2026")?;
    let config = PricingConfig::for_currency(catalog.currency()?);
    let warranty = catalog.warranty_table()?;

    for (key, motor) in catalog.motors() {
        for boat_type in BoatType::ALL {
            let session = QuoteSession::new(motor, catalog.promotions(), APRIL);
            let recommendation = session.recommend(&config, Some(boat_type), PurchasePath::Loose);
            let [essential, complete, premium] =
                session.packages(&config, warranty, &recommendation)?;

            assert!(
                essential.price_before_tax.amount() <= complete.price_before_tax.amount()
                    && complete.price_before_tax.amount() <= premium.price_before_tax.amount(),
                "{key} on {boat_type}: package prices out of order"
            );
            assert!(
                essential.coverage_years <= complete.coverage_years
                    && complete.coverage_years <= premium.coverage_years,
                "{key} on {boat_type}: coverage out of order"
            );
            assert!(
                premium.coverage_years <= config.max_coverage_years,
                "{key}: coverage above the cap"
            );
            assert_eq!(
                [essential.recommended, complete.recommended, premium.recommended]
                    .iter()
                    .filter(|recommended| **recommended)
                    .count(),
                1,
                "{key} on {boat_type}: exactly one tier is recommended"
            );
        }
    }

    Ok(())
}

#[test]
fn package_contents_for_a_remote_motor() -> TestResult {
    let catalog = Catalog::from_set("mercury_2026")?;
    let config = PricingConfig::for_currency(catalog.currency()?);
    let session = QuoteSession::new(catalog.motor("fs-115-elpt")?, catalog.promotions(), APRIL);

    let recommendation = session.recommend(&config, Some(BoatType::Pontoon), PurchasePath::Loose);

    assert_eq!(recommendation.package_id, PackageId::Better);

    let [essential, complete, premium] =
        session.packages(&config, catalog.warranty_table()?, &recommendation)?;

    assert_eq!(essential.coverage_years, 7);
    assert_eq!(essential.price_before_tax, cad(1_549_900));

    assert!(complete.recommended, "pontoon over 90 HP should get Complete");
    assert_eq!(complete.coverage_years, 7);
    assert_eq!(complete.price_before_tax, cad(1_567_899));

    assert_eq!(premium.coverage_years, 8);
    assert_eq!(premium.warranty.warranty_price, cad(32_500));
    assert_eq!(premium.price_before_tax, cad(1_695_299));
    assert_eq!(premium.items.len(), 2, "battery and propeller, no portable tank");

    Ok(())
}

#[test]
fn unpriced_warranty_years_follow_the_configured_policy() -> TestResult {
    let catalog = Catalog::from_set("mercury_2026")?;
    let motor = catalog.motor("verado-250-xl")?;
    let session = QuoteSession::new(motor, catalog.promotions(), APRIL);

    let clamp = PricingConfig::for_currency(catalog.currency()?);
    let recommendation =
        session.recommend(&clamp, Some(BoatType::CenterConsole), PurchasePath::Loose);
    let [_, _, premium] = session.packages(&clamp, catalog.warranty_table()?, &recommendation)?;

    assert_eq!(premium.warranty.warranty_price, cad(0));
    assert_eq!(
        premium.warranty.notice,
        Some(WarrantyNotice::BeyondPricedYears {
            requested: 8,
            priced: 7
        })
    );

    let extend = PricingConfig {
        beyond_table: Some(BeyondTablePolicy::ExtendLastYear),
        ..PricingConfig::for_currency(catalog.currency()?)
    };
    let [_, _, premium] = session.packages(&extend, catalog.warranty_table()?, &recommendation)?;

    assert_eq!(premium.warranty.warranty_price, cad(51_500));
    assert!(premium.warranty.notice.is_some(), "gap should still be flagged");

    Ok(())
}

#[test]
fn saved_quote_restores_to_the_same_totals() -> TestResult {
    let catalog = Catalog::from_set("mercury_2026")?;
    let config = PricingConfig::for_currency(catalog.currency()?);
    let mut session =
        QuoteSession::new(catalog.motor("fs-115-elpt")?, catalog.promotions(), APRIL);

    session.add_option(catalog.option("smartcraft-gauge")?.clone())?;
    session.set_trade_in(TradeInInfo::with_value(cad(300_000)))?;
    session.set_down_payment(cad(200_000))?;
    session.choose_bonus(BonusChoice::SpecialFinancing {
        term_months: Some(60),
    });

    let recommendation = session.recommend(&config, Some(BoatType::Bass), PurchasePath::Loose);
    let packages = session.packages(&config, catalog.warranty_table()?, &recommendation)?;
    let premium = packages
        .iter()
        .find(|package| package.recommended)
        .ok_or("no recommended package")?;

    assert_eq!(premium.id, PackageId::Best);

    let json = QuoteSnapshot::capture(&session, &config, Some(premium))?.to_json()?;
    let restored = QuoteSnapshot::from_json(&json)?;

    assert_eq!(restored.recompute()?, premium.totals);
    assert_eq!(restored.recompute_payment()?, premium.financing);

    Ok(())
}

#[test]
fn example_config_loads() -> TestResult {
    let config = PricingConfig::load("config/pricing.example.yml")?;

    assert_eq!(config, PricingConfig::default());

    Ok(())
}
