//! Motor Fixtures

use serde::Deserialize;

use crate::{
    fixtures::{
        FixtureError,
        values::{decimal, parse_price},
    },
    motors::{Motor, MotorFamily, MotorType},
};

/// Wrapper for motors in YAML
#[derive(Debug, Deserialize)]
pub struct MotorsFixture {
    /// Motors in file order
    pub motors: Vec<MotorFixture>,
}

/// Motor Fixture
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MotorFixture {
    /// Catalog key (e.g. `"fs-115-elpt"`)
    pub key: String,

    /// Model name with rigging suffix
    pub model: String,

    /// Rated horsepower
    pub horsepower: f64,

    /// Propulsion type
    #[serde(default)]
    pub motor_type: MotorType,

    /// Product family
    pub family: MotorFamily,

    /// MSRP (e.g., "15999.00 CAD")
    pub msrp: String,

    /// Dealer price, if different from MSRP
    #[serde(default)]
    pub dealer_price: Option<String>,

    /// Stock flag
    #[serde(default)]
    pub in_stock: bool,

    /// Whether a propeller ships in the box
    #[serde(default)]
    pub includes_propeller: bool,
}

impl TryFrom<MotorFixture> for Motor<'_> {
    type Error = FixtureError;

    fn try_from(fixture: MotorFixture) -> Result<Self, Self::Error> {
        let horsepower = decimal(fixture.horsepower)?;

        if horsepower.is_sign_negative() || horsepower.is_zero() {
            return Err(FixtureError::InvalidMotor(format!(
                "{}: horsepower must be positive",
                fixture.model
            )));
        }

        let msrp = parse_price(&fixture.msrp)?;
        let dealer_price = fixture.dealer_price.as_deref().map(parse_price).transpose()?;

        if let Some(dealer_price) = &dealer_price {
            if dealer_price.currency() != msrp.currency() {
                return Err(FixtureError::CurrencyMismatch(
                    msrp.currency().iso_alpha_code.to_string(),
                    dealer_price.currency().iso_alpha_code.to_string(),
                ));
            }

            if dealer_price.amount() > msrp.amount() {
                return Err(FixtureError::InvalidMotor(format!(
                    "{}: dealer price {dealer_price} is above MSRP {msrp}",
                    fixture.model
                )));
            }
        }

        Ok(Motor {
            model: fixture.model,
            horsepower,
            motor_type: fixture.motor_type,
            family: fixture.family,
            msrp,
            dealer_price,
            in_stock: fixture.in_stock,
            includes_propeller: fixture.includes_propeller,
        })
    }
}
