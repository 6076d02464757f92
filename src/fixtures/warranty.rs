//! Warranty Fixtures

use serde::Deserialize;

use crate::{
    fixtures::{
        FixtureError,
        values::{decimal, parse_price},
    },
    warranty::{BeyondTablePolicy, WarrantyBracket},
};

/// Warranty price table in YAML
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WarrantyFixture {
    /// Handling of years past the last priced year
    #[serde(default)]
    pub policy: BeyondTablePolicy,

    /// Brackets in lookup order
    pub brackets: Vec<BracketFixture>,
}

/// Warranty bracket fixture
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BracketFixture {
    /// Inclusive lower horsepower bound
    pub hp_min: f64,

    /// Inclusive upper horsepower bound
    pub hp_max: f64,

    /// Price of each coverage year from year 1 (e.g. "95.00 CAD")
    pub year_prices: Vec<String>,
}

impl TryFrom<BracketFixture> for WarrantyBracket<'_> {
    type Error = FixtureError;

    fn try_from(fixture: BracketFixture) -> Result<Self, Self::Error> {
        let hp_min = decimal(fixture.hp_min)?;
        let hp_max = decimal(fixture.hp_max)?;

        if hp_min > hp_max {
            return Err(FixtureError::InvalidWarranty(format!(
                "bracket {hp_min}-{hp_max} HP is inverted"
            )));
        }

        let year_prices = fixture
            .year_prices
            .iter()
            .map(|price| parse_price(price))
            .collect::<Result<_, _>>()?;

        Ok(WarrantyBracket {
            hp_min,
            hp_max,
            year_prices,
        })
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn parses_brackets_and_policy() -> TestResult {
        let yaml = r#"
policy: extend_last_year
brackets:
  - hp_min: 2.5
    hp_max: 9.9
    year_prices: ["95.00 CAD", "110.00 CAD"]
"#;
        let fixture: WarrantyFixture = serde_norway::from_str(yaml)?;

        assert_eq!(fixture.policy, BeyondTablePolicy::ExtendLastYear);

        let bracket = WarrantyBracket::try_from(
            fixture.brackets.into_iter().next().ok_or("no bracket parsed")?,
        )?;

        assert_eq!(bracket.hp_max, Decimal::new(99, 1));
        assert_eq!(bracket.priced_years(), 2);

        Ok(())
    }

    #[test]
    fn rejects_inverted_bracket() {
        let result = WarrantyBracket::try_from(BracketFixture {
            hp_min: 60.0,
            hp_max: 40.0,
            year_prices: Vec::new(),
        });

        assert!(matches!(result, Err(FixtureError::InvalidWarranty(_))));
    }
}
