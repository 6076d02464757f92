//! Option Fixtures

use serde::Deserialize;

use crate::{
    fixtures::{FixtureError, values::parse_price},
    options::QuoteOption,
};

/// Wrapper for options in YAML
#[derive(Debug, Deserialize)]
pub struct OptionsFixture {
    /// Options in file order
    pub options: Vec<OptionFixture>,
}

/// Accessory fixture
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OptionFixture {
    /// Catalog key
    pub key: String,

    /// Display name
    pub name: String,

    /// Price (e.g. "349.99 CAD")
    pub price: String,
}

impl TryFrom<OptionFixture> for QuoteOption<'_> {
    type Error = FixtureError;

    fn try_from(fixture: OptionFixture) -> Result<Self, Self::Error> {
        Ok(QuoteOption::new(fixture.name, parse_price(&fixture.price)?))
    }
}
