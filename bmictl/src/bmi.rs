//! BMI engine: unit normalization, the BMI formula and classification.
//!
//! Everything in this module is pure. Range checks on user input belong to the API layer
//! ([`crate::api::validation`]); the engine only refuses inputs that would make the formula
//! meaningless (a non-positive height), returning [`BmiError`] instead of NaN or infinity.
//!
//! ```
//! use bmictl::bmi::{calculate, BmiCategory, Height, Weight};
//!
//! let result = calculate(Weight::Kilograms(70.0), Height::Centimeters(175.0)).unwrap();
//! assert_eq!(result.bmi, 22.9);
//! assert_eq!(result.category, BmiCategory::NormalWeight);
//! ```

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;
use utoipa::ToSchema;

/// Kilograms per pound
pub const KG_PER_POUND: f64 = 0.453592;
/// Meters per inch
pub const METERS_PER_INCH: f64 = 0.0254;

/// Unit the weight was entered in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    #[default]
    #[serde(alias = "kilograms")]
    Kg,
    #[serde(alias = "pounds", alias = "lbs")]
    Lb,
}

/// A weight measurement tagged with its unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Weight {
    Kilograms(f64),
    Pounds(f64),
}

impl Weight {
    pub fn new(value: f64, unit: WeightUnit) -> Self {
        match unit {
            WeightUnit::Kg => Weight::Kilograms(value),
            WeightUnit::Lb => Weight::Pounds(value),
        }
    }

    pub fn kilograms(self) -> f64 {
        match self {
            Weight::Kilograms(kg) => kg,
            Weight::Pounds(lb) => lb * KG_PER_POUND,
        }
    }
}

/// A height measurement, either metric or imperial.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Height {
    Centimeters(f64),
    FeetInches { feet: f64, inches: f64 },
}

impl Height {
    pub fn meters(self) -> f64 {
        match self {
            Height::Centimeters(cm) => cm / 100.0,
            Height::FeetInches { feet, inches } => (feet * 12.0 + inches) * METERS_PER_INCH,
        }
    }

    pub fn centimeters(self) -> f64 {
        match self {
            Height::Centimeters(cm) => cm,
            other => other.meters() * 100.0,
        }
    }
}

/// The closed set of BMI categories.
///
/// Serialized as the human-readable label (`"Normal Weight"` etc.), which is also the value
/// stored in the `bmi_records.category` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum BmiCategory {
    Underweight,
    #[serde(rename = "Normal Weight")]
    NormalWeight,
    Overweight,
    Obese,
}

impl BmiCategory {
    pub const ALL: [BmiCategory; 4] = [
        BmiCategory::Underweight,
        BmiCategory::NormalWeight,
        BmiCategory::Overweight,
        BmiCategory::Obese,
    ];

    /// Classify a BMI value. Bands are half-open with the lower bound inclusive.
    pub fn classify(bmi: f64) -> Self {
        if bmi < 18.5 {
            BmiCategory::Underweight
        } else if bmi < 25.0 {
            BmiCategory::NormalWeight
        } else if bmi < 30.0 {
            BmiCategory::Overweight
        } else {
            BmiCategory::Obese
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BmiCategory::Underweight => "Underweight",
            BmiCategory::NormalWeight => "Normal Weight",
            BmiCategory::Overweight => "Overweight",
            BmiCategory::Obese => "Obese",
        }
    }
}

impl fmt::Display for BmiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown BMI category '{0}'")]
pub struct UnknownCategory(pub String);

impl FromStr for BmiCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BmiCategory::ALL
            .into_iter()
            .find(|category| category.label() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

impl TryFrom<String> for BmiCategory {
    type Error = UnknownCategory;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Domain errors raised by the engine
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BmiError {
    #[error("height must be greater than zero, got {meters} m")]
    NonPositiveHeight { meters: f64 },

    #[error("BMI is not a finite number")]
    NotFinite,
}

/// Outcome of a BMI calculation, with the measurements normalized to the stored units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BmiResult {
    /// BMI rounded to one decimal place
    pub bmi: f64,
    /// Category of the rounded BMI
    pub category: BmiCategory,
    pub weight_kg: f64,
    pub height_cm: f64,
}

/// Round half-up to one decimal place.
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Compute the BMI for a weight and height.
///
/// The category is derived from the rounded value so that a stored `bmi` always classifies
/// to its stored `category`.
pub fn calculate(weight: Weight, height: Height) -> Result<BmiResult, BmiError> {
    let meters = height.meters();
    if meters.is_nan() || meters <= 0.0 {
        return Err(BmiError::NonPositiveHeight { meters });
    }

    let kilograms = weight.kilograms();
    let raw = kilograms / (meters * meters);
    if !raw.is_finite() {
        return Err(BmiError::NotFinite);
    }

    let bmi = round_to_tenth(raw);
    Ok(BmiResult {
        bmi,
        category: BmiCategory::classify(bmi),
        weight_kg: kilograms,
        height_cm: height.centimeters(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_calculation() {
        let result = calculate(Weight::Kilograms(70.0), Height::Centimeters(175.0)).unwrap();
        assert_eq!(result.bmi, 22.9);
        assert_eq!(result.category, BmiCategory::NormalWeight);
        assert_eq!(result.weight_kg, 70.0);
        assert_eq!(result.height_cm, 175.0);
    }

    #[test]
    fn test_matches_formula_across_inputs() {
        for kg in [3.5, 45.0, 62.3, 80.0, 120.7, 250.0, 999.0] {
            for cm in [30.0, 99.5, 150.0, 172.0, 201.3, 300.0] {
                let result = calculate(Weight::Kilograms(kg), Height::Centimeters(cm)).unwrap();
                let meters: f64 = cm / 100.0;
                let expected = (kg / (meters * meters) * 10.0).round() / 10.0;
                assert_eq!(result.bmi, expected, "kg={kg} cm={cm}");
                assert_eq!(result.category, BmiCategory::classify(result.bmi));
            }
        }
    }

    #[test]
    fn test_classification_boundaries() {
        assert_eq!(BmiCategory::classify(18.49), BmiCategory::Underweight);
        assert_eq!(BmiCategory::classify(18.5), BmiCategory::NormalWeight);
        assert_eq!(BmiCategory::classify(24.99), BmiCategory::NormalWeight);
        assert_eq!(BmiCategory::classify(25.0), BmiCategory::Overweight);
        assert_eq!(BmiCategory::classify(29.99), BmiCategory::Overweight);
        assert_eq!(BmiCategory::classify(30.0), BmiCategory::Obese);
    }

    #[test]
    fn test_imperial_matches_metric() {
        let imperial = calculate(Weight::Pounds(180.0), Height::FeetInches { feet: 5.0, inches: 10.0 }).unwrap();
        let metric = calculate(
            Weight::Kilograms(180.0 * KG_PER_POUND),
            Height::Centimeters(70.0 * METERS_PER_INCH * 100.0),
        )
        .unwrap();

        assert!((imperial.bmi - metric.bmi).abs() <= 0.1);
        assert_eq!(imperial.bmi, 25.8);
        assert_eq!(imperial.category, BmiCategory::Overweight);
        assert!((imperial.height_cm - 177.8).abs() < 1e-9);
    }

    #[test]
    fn test_category_follows_rounded_value() {
        // 24.96 rounds to 25.0, which is Overweight
        let result = calculate(Weight::Kilograms(24.96), Height::Centimeters(100.0)).unwrap();
        assert_eq!(result.bmi, 25.0);
        assert_eq!(result.category, BmiCategory::Overweight);
    }

    #[test]
    fn test_zero_height_is_a_domain_error() {
        let err = calculate(Weight::Kilograms(70.0), Height::Centimeters(0.0)).unwrap_err();
        assert_eq!(err, BmiError::NonPositiveHeight { meters: 0.0 });

        let err = calculate(Weight::Kilograms(70.0), Height::FeetInches { feet: 0.0, inches: 0.0 }).unwrap_err();
        assert!(matches!(err, BmiError::NonPositiveHeight { .. }));
    }

    #[test]
    fn test_category_labels_round_trip_through_from_str() {
        for category in BmiCategory::ALL {
            assert_eq!(category.label().parse::<BmiCategory>().unwrap(), category);
        }
        assert!("normal weight".parse::<BmiCategory>().is_err());
        assert_eq!(
            serde_json::to_string(&BmiCategory::NormalWeight).unwrap(),
            "\"Normal Weight\""
        );
    }

    #[test]
    fn test_weight_unit_deserializes_aliases() {
        let unit: WeightUnit = serde_json::from_str("\"pounds\"").unwrap();
        assert_eq!(unit, WeightUnit::Lb);
        let unit: WeightUnit = serde_json::from_str("\"kg\"").unwrap();
        assert_eq!(unit, WeightUnit::Kg);
    }
}
