//! Promotion Conditions

use rust_decimal::Decimal;

use crate::motors::{Motor, MotorType};

/// Conditions a motor must satisfy for a rule to apply.
///
/// Every condition that is present must hold. An empty set of conditions matches every motor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleConditions {
    /// Inclusive lower horsepower bound
    pub horsepower_min: Option<Decimal>,

    /// Inclusive upper horsepower bound
    pub horsepower_max: Option<Decimal>,

    /// Model pattern, see [`model_matches`]
    pub model: Option<String>,

    /// Required motor type
    pub motor_type: Option<MotorType>,
}

impl RuleConditions {
    /// Whether `motor` satisfies every present condition.
    pub fn matches(&self, motor: &Motor<'_>) -> bool {
        let above_min = self
            .horsepower_min
            .is_none_or(|min| motor.horsepower >= min);

        let below_max = self
            .horsepower_max
            .is_none_or(|max| motor.horsepower <= max);

        let model = self
            .model
            .as_deref()
            .is_none_or(|pattern| model_matches(pattern, &motor.model));

        let motor_type = self.motor_type.is_none_or(|t| t == motor.motor_type);

        above_min && below_max && model && motor_type
    }
}

/// Case-insensitive substring match, ignoring runs of whitespace.
///
/// `"fourstroke 115"` matches `"FourStroke  115ELPT"`. A blank pattern matches everything.
pub fn model_matches(pattern: &str, model: &str) -> bool {
    let pattern = normalize(pattern);

    pattern.is_empty() || normalize(model).contains(&pattern)
}

fn normalize(s: &str) -> String {
    s.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use crate::motors::test_support::motor;

    use super::*;

    #[test]
    fn empty_conditions_match_everything() {
        let m = motor("115ELPT", Decimal::from(115), 1_500_000);

        assert!(RuleConditions::default().matches(&m));
    }

    #[test]
    fn horsepower_bounds_are_inclusive() {
        let conditions = RuleConditions {
            horsepower_min: Some(Decimal::from(40)),
            horsepower_max: Some(Decimal::from(115)),
            ..RuleConditions::default()
        };

        assert!(conditions.matches(&motor("40ELPT", Decimal::from(40), 900_000)));
        assert!(conditions.matches(&motor("115ELPT", Decimal::from(115), 1_500_000)));
        assert!(!conditions.matches(&motor("150L", Decimal::from(150), 2_000_000)));
        assert!(!conditions.matches(&motor("25ELH", Decimal::from(25), 600_000)));
    }

    #[test]
    fn open_bound_is_unbounded() {
        let conditions = RuleConditions {
            horsepower_min: Some(Decimal::from(200)),
            ..RuleConditions::default()
        };

        assert!(conditions.matches(&motor("600XXL", Decimal::from(600), 9_000_000)));
    }

    #[test]
    fn fractional_horsepower_compares_exactly() {
        let conditions = RuleConditions {
            horsepower_max: Some(Decimal::new(99, 1)),
            ..RuleConditions::default()
        };

        assert!(conditions.matches(&motor("9.9MH", Decimal::new(99, 1), 400_000)));
        assert!(!conditions.matches(&motor("15MH", Decimal::from(15), 450_000)));
    }

    #[test]
    fn model_match_is_case_insensitive_substring() {
        assert!(model_matches("elpt", "115ELPT"));
        assert!(model_matches("Pro  XS", "150XL pro xs"));
        assert!(!model_matches("Verado", "150XL Pro XS"));
        assert!(model_matches("  ", "anything"));
    }

    #[test]
    fn all_present_conditions_must_hold() {
        let conditions = RuleConditions {
            horsepower_min: Some(Decimal::from(100)),
            model: Some("ELPT".to_string()),
            motor_type: Some(MotorType::Outboard),
            ..RuleConditions::default()
        };

        assert!(conditions.matches(&motor("115ELPT", Decimal::from(115), 1_500_000)));
        assert!(!conditions.matches(&motor("115XL", Decimal::from(115), 1_500_000)));

        let mut jet = motor("115ELPT", Decimal::from(115), 1_500_000);
        jet.motor_type = MotorType::Jet;

        assert!(!conditions.matches(&jet));
    }
}
