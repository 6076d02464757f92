//! Motors

use std::fmt;

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

use crate::money::{self, amount};

pub mod model_code;

pub use model_code::{Control, ModelCode, ShaftLength, StartType};

new_key_type! {
    /// Motor Key
    pub struct MotorKey;
}

/// Horsepower at or below which a motor runs from a portable fuel tank.
const PORTABLE_TANK_MAX_HP: Decimal = Decimal::from_parts(30, 0, 0, false, 0);

/// Propulsion type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotorType {
    /// Gasoline outboard
    #[default]
    Outboard,

    /// Electric outboard
    Electric,

    /// Jet-drive outboard
    Jet,

    /// Diesel outboard
    Diesel,
}

/// Product family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotorFamily {
    /// `FourStroke`
    FourStroke,

    /// Pro XS
    ProXs,

    /// Verado
    Verado,

    /// `SeaPro` commercial line
    SeaPro,
}

impl fmt::Display for MotorFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MotorFamily::FourStroke => "FourStroke",
            MotorFamily::ProXs => "Pro XS",
            MotorFamily::Verado => "Verado",
            MotorFamily::SeaPro => "SeaPro",
        })
    }
}

/// A sellable outboard configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Motor<'a> {
    /// Model name including the rigging suffix (e.g. `"115ELPT"`)
    pub model: String,

    /// Rated horsepower, may be fractional (9.9)
    pub horsepower: Decimal,

    /// Propulsion type
    pub motor_type: MotorType,

    /// Product family
    pub family: MotorFamily,

    /// Manufacturer's suggested retail price
    pub msrp: Money<'a, Currency>,

    /// Dealer selling price, at most the MSRP
    pub dealer_price: Option<Money<'a, Currency>>,

    /// Whether the motor is in stock
    pub in_stock: bool,

    /// Whether a propeller ships with the motor
    pub includes_propeller: bool,
}

impl<'a> Motor<'a> {
    /// Decode the rigging suffix of the model name.
    pub fn model_code(&self) -> ModelCode {
        ModelCode::parse(&self.model)
    }

    /// Currency the motor is priced in.
    pub fn currency(&self) -> &'a Currency {
        self.msrp.currency()
    }

    /// Standing dealer discount off MSRP.
    ///
    /// Zero when there is no dealer price or the dealer price is not below MSRP.
    pub fn dealer_discount(&self) -> Money<'a, Currency> {
        let msrp = amount(&self.msrp);

        match &self.dealer_price {
            Some(price) if amount(price) < msrp => {
                money::exact(msrp - amount(price), self.currency())
            }
            _ => money::zero(self.currency()),
        }
    }

    /// Whether the motor is pull-start only.
    pub fn is_manual_start(&self) -> bool {
        self.model_code().start == Some(StartType::Manual)
    }

    /// Whether the motor can run from a portable external fuel tank.
    pub fn supports_external_tank(&self) -> bool {
        self.motor_type != MotorType::Electric
            && (self.model_code().control == Control::Tiller
                || self.horsepower <= PORTABLE_TANK_MAX_HP)
    }

    /// Short display name, e.g. `"115ELPT FourStroke (115 HP)"`.
    pub fn display_name(&self) -> String {
        format!(
            "{} {} ({} HP)",
            self.model,
            self.family,
            self.horsepower.normalize()
        )
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use rust_decimal::Decimal;
    use rusty_money::{Money, iso::CAD};

    use super::{Motor, MotorFamily, MotorType};

    /// A motor priced in CAD with no dealer price.
    pub(crate) fn motor(model: &str, horsepower: Decimal, msrp_minor: i64) -> Motor<'static> {
        Motor {
            model: model.to_string(),
            horsepower,
            motor_type: MotorType::Outboard,
            family: MotorFamily::FourStroke,
            msrp: Money::from_minor(msrp_minor, CAD),
            dealer_price: None,
            in_stock: true,
            includes_propeller: false,
        }
    }
}
