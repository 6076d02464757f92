//! Promotions
//!
//! Promotion rules conditioned on horsepower range, model and motor type. Matching picks the
//! single highest-priority exclusive rule and stacks every matching stackable rule on top.

pub mod bonus;
pub mod conditions;
pub mod matcher;
pub mod rule;

pub use bonus::{BonusChoice, BonusOption, BonusResolution, RebateTier};
pub use conditions::RuleConditions;
pub use matcher::{PromotionMatch, PromotionNotice, match_rules};
pub use rule::PromotionRule;
