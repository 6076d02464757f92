//! Outboard Quote prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    config::{ConfigError, PricingConfig},
    financing::{FinancingOptions, MonthlyPayment, calculate_monthly_payment},
    fixtures::{Catalog, FixtureError},
    money::PricingError,
    motors::{Motor, MotorFamily, MotorKey, MotorType},
    options::QuoteOption,
    packages::{
        BoatType, PackageId, PackageOption, PackageSelections, PurchasePath, Recommendation,
        build_packages, recommend_package,
    },
    promotions::{
        BonusChoice, BonusOption, BonusResolution, PromotionMatch, PromotionNotice,
        PromotionRule, RuleConditions, match_rules,
    },
    quote::{QuoteInput, QuoteSession, QuoteTotals, compute_totals},
    quote_sheet::{QuoteSheet, QuoteSheetError},
    snapshot::{QuoteSnapshot, SnapshotError},
    trade_in::{TradeInInfo, TradeInPenalty},
    warranty::{
        BeyondTablePolicy, WarrantyConfig, WarrantyNotice, WarrantyPriceTable,
        calculate_warranty_extension_cost,
    },
};
