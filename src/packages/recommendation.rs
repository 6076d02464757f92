//! Package Recommendation
//!
//! A small rule table keyed by boat type, horsepower and purchase path. When several rules
//! match, the highest tier wins; among rules for the same tier the first listed supplies the
//! reason.

use std::{cmp::Reverse, fmt, str::FromStr};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::packages::PackageId;

/// Reason given when the boat type or horsepower is unknown.
pub const INSUFFICIENT_INFORMATION: &str = "insufficient information";

/// Reason given when no rule matches.
pub const DEFAULT_REASON: &str = "factory coverage suits light, occasional use";

/// Hull the motor is going on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoatType {
    /// Pontoon or tritoon
    Pontoon,

    /// Bass boat
    Bass,

    /// Tournament fishing rig
    Tournament,

    /// Aluminum fishing boat
    Aluminum,

    /// Bowrider
    Bowrider,

    /// Center console
    CenterConsole,

    /// Inflatable or RIB
    Inflatable,

    /// Jon boat or workboat
    Utility,

    /// Sailboat auxiliary
    Sailboat,
}

impl BoatType {
    /// Every boat type, in display order.
    pub const ALL: [BoatType; 9] = [
        BoatType::Pontoon,
        BoatType::Bass,
        BoatType::Tournament,
        BoatType::Aluminum,
        BoatType::Bowrider,
        BoatType::CenterConsole,
        BoatType::Inflatable,
        BoatType::Utility,
        BoatType::Sailboat,
    ];

    /// Lowercase, hyphenated name.
    pub fn as_str(self) -> &'static str {
        match self {
            BoatType::Pontoon => "pontoon",
            BoatType::Bass => "bass",
            BoatType::Tournament => "tournament",
            BoatType::Aluminum => "aluminum",
            BoatType::Bowrider => "bowrider",
            BoatType::CenterConsole => "center-console",
            BoatType::Inflatable => "inflatable",
            BoatType::Utility => "utility",
            BoatType::Sailboat => "sailboat",
        }
    }
}

impl fmt::Display for BoatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognised boat type.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown boat type: {0}")]
pub struct BoatTypeParseError(String);

impl FromStr for BoatType {
    type Err = BoatTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['_', ' '], "-");

        BoatType::ALL
            .into_iter()
            .find(|boat_type| boat_type.as_str() == normalized)
            .ok_or_else(|| BoatTypeParseError(s.to_string()))
    }
}

/// How the motor leaves the dealership.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PurchasePath {
    /// Sold boxed for the customer to rig
    #[default]
    Loose,

    /// Rigged and installed by the dealer
    Installed,
}

/// One row of the recommendation table. Empty or absent fields match anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecommendationRule {
    /// Boat types the rule covers
    #[serde(default)]
    pub boat_types: Vec<BoatType>,

    /// Horsepower must be strictly above this
    #[serde(default)]
    pub hp_above: Option<Decimal>,

    /// Horsepower must be at most this
    #[serde(default)]
    pub hp_at_most: Option<Decimal>,

    /// Required purchase path
    #[serde(default)]
    pub purchase_path: Option<PurchasePath>,

    /// Package to recommend
    pub package: PackageId,

    /// Customer-facing justification
    pub reason: String,
}

impl RecommendationRule {
    fn matches(&self, boat_type: BoatType, horsepower: Decimal, path: PurchasePath) -> bool {
        (self.boat_types.is_empty() || self.boat_types.contains(&boat_type))
            && self.hp_above.is_none_or(|floor| horsepower > floor)
            && self.hp_at_most.is_none_or(|ceiling| horsepower <= ceiling)
            && self.purchase_path.is_none_or(|required| required == path)
    }
}

/// The built-in recommendation table.
pub fn default_rules() -> Vec<RecommendationRule> {
    let rule = |boat_types: &[BoatType], hp_above: Option<i64>, package, reason: &str| {
        RecommendationRule {
            boat_types: boat_types.to_vec(),
            hp_above: hp_above.map(Decimal::from),
            hp_at_most: None,
            purchase_path: None,
            package,
            reason: reason.to_string(),
        }
    };

    vec![
        rule(
            &[BoatType::Bass, BoatType::Tournament],
            None,
            PackageId::Best,
            "tournament and bass boats run hard; maximum coverage and a performance propeller",
        ),
        rule(
            &[BoatType::CenterConsole],
            Some(150),
            PackageId::Best,
            "offshore center consoles benefit from maximum coverage",
        ),
        rule(
            &[BoatType::Pontoon],
            Some(90),
            PackageId::Better,
            "high-horsepower pontoons see heavy family use; extended coverage recommended",
        ),
        RecommendationRule {
            purchase_path: Some(PurchasePath::Installed),
            ..rule(
                &[],
                Some(40),
                PackageId::Better,
                "dealer-installed repowers leave ready to run with extended coverage",
            )
        },
    ]
}

/// A recommended package with its justification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recommendation {
    /// Recommended tier
    pub package_id: PackageId,

    /// Why
    pub reason: String,
}

/// Recommend a package tier.
///
/// Missing boat type or horsepower yields Essential with [`INSUFFICIENT_INFORMATION`]. Otherwise
/// the highest tier among matching rules wins, the first listed rule breaking ties, and no match
/// yields Essential with [`DEFAULT_REASON`].
pub fn recommend_package(
    rules: &[RecommendationRule],
    boat_type: Option<BoatType>,
    horsepower: Option<Decimal>,
    purchase_path: PurchasePath,
) -> Recommendation {
    let (Some(boat_type), Some(horsepower)) = (boat_type, horsepower) else {
        return Recommendation {
            package_id: PackageId::Good,
            reason: INSUFFICIENT_INFORMATION.to_string(),
        };
    };

    let winner = rules
        .iter()
        .filter(|rule| rule.matches(boat_type, horsepower, purchase_path))
        .min_by_key(|rule| Reverse(rule.package));

    debug!(
        %boat_type,
        %horsepower,
        ?purchase_path,
        package = ?winner.map(|rule| rule.package),
        "recommended package"
    );

    winner.map_or_else(
        || Recommendation {
            package_id: PackageId::Good,
            reason: DEFAULT_REASON.to_string(),
        },
        |rule| Recommendation {
            package_id: rule.package,
            reason: rule.reason.clone(),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recommend(boat_type: BoatType, hp: i64, path: PurchasePath) -> PackageId {
        recommend_package(&default_rules(), Some(boat_type), Some(Decimal::from(hp)), path)
            .package_id
    }

    #[test]
    fn pontoon_over_ninety_gets_complete() {
        assert_eq!(recommend(BoatType::Pontoon, 115, PurchasePath::Loose), PackageId::Better);
        assert_eq!(recommend(BoatType::Pontoon, 90, PurchasePath::Loose), PackageId::Good);
    }

    #[test]
    fn bass_boats_get_premium_at_any_horsepower() {
        assert_eq!(recommend(BoatType::Bass, 25, PurchasePath::Loose), PackageId::Best);
        assert_eq!(recommend(BoatType::Tournament, 250, PurchasePath::Loose), PackageId::Best);
    }

    #[test]
    fn highest_tier_wins_when_rules_overlap() {
        // Installed bass boat matches both the Complete and the Premium rule
        assert_eq!(recommend(BoatType::Bass, 150, PurchasePath::Installed), PackageId::Best);
    }

    #[test]
    fn installed_repower_gets_complete() {
        assert_eq!(
            recommend(BoatType::Aluminum, 60, PurchasePath::Installed),
            PackageId::Better
        );
        assert_eq!(recommend(BoatType::Aluminum, 60, PurchasePath::Loose), PackageId::Good);
    }

    #[test]
    fn missing_information_defaults_to_essential() {
        let rules = default_rules();

        for recommendation in [
            recommend_package(&rules, None, Some(Decimal::from(115)), PurchasePath::Loose),
            recommend_package(&rules, Some(BoatType::Bass), None, PurchasePath::Loose),
        ] {
            assert_eq!(recommendation.package_id, PackageId::Good);
            assert_eq!(recommendation.reason, INSUFFICIENT_INFORMATION);
        }
    }

    #[test]
    fn no_match_uses_default_reason() {
        let recommendation = recommend_package(
            &default_rules(),
            Some(BoatType::Sailboat),
            Some(Decimal::from(8)),
            PurchasePath::Loose,
        );

        assert_eq!(recommendation.package_id, PackageId::Good);
        assert_eq!(recommendation.reason, DEFAULT_REASON);
    }

    #[test]
    fn parses_boat_types_loosely() -> Result<(), BoatTypeParseError> {
        assert_eq!("Center Console".parse::<BoatType>()?, BoatType::CenterConsole);
        assert_eq!("center_console".parse::<BoatType>()?, BoatType::CenterConsole);
        assert_eq!("PONTOON".parse::<BoatType>()?, BoatType::Pontoon);
        assert!("submarine".parse::<BoatType>().is_err());

        Ok(())
    }
}
