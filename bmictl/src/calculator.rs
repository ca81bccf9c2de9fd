//! The calculator form.
//!
//! [`CalculatorForm`] holds what a user has typed into the BMI calculator together with the unit
//! selected for height and for weight. Switching a unit clears the fields that were entered in
//! the old unit, so a form never mixes centimeters with feet. Submitting checks the form rules,
//! runs the [`crate::bmi`] engine and keeps the result until the form is reset.
//!
//! The form rules are looser than the API's (weight is bounded in the entered unit, not in
//! kilograms). A submitted form is turned into a [`BmiRecordCreate`] for the record API, which
//! applies its own validation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::models::bmi_records::BmiRecordCreate;
use crate::api::validation::{FieldError, ValidationErrors};
use crate::bmi::{self, BmiError, BmiResult, Height, Weight, WeightUnit};
use crate::config::CalculateArgs;
use crate::types::UserId;

/// Unit system of one group of form fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

impl UnitSystem {
    pub fn weight_unit(self) -> WeightUnit {
        match self {
            UnitSystem::Metric => WeightUnit::Kg,
            UnitSystem::Imperial => WeightUnit::Lb,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum CalculatorError {
    #[error("{0}")]
    Invalid(ValidationErrors),

    #[error(transparent)]
    Bmi(#[from] BmiError),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CalculatorForm {
    pub age: Option<i32>,
    /// In kilograms or pounds depending on `weight_unit`
    pub weight: Option<f64>,
    pub height_cm: Option<f64>,
    pub height_feet: Option<f64>,
    pub height_inches: Option<f64>,
    height_unit: UnitSystem,
    weight_unit: UnitSystem,
    result: Option<BmiResult>,
}

impl CalculatorForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn height_unit(&self) -> UnitSystem {
        self.height_unit
    }

    pub fn weight_unit(&self) -> UnitSystem {
        self.weight_unit
    }

    /// Result of the last successful submit
    pub fn result(&self) -> Option<&BmiResult> {
        self.result.as_ref()
    }

    /// Select the height unit. All height fields are cleared, even if the unit is unchanged.
    pub fn set_height_unit(&mut self, unit: UnitSystem) {
        self.height_unit = unit;
        self.height_cm = None;
        self.height_feet = None;
        self.height_inches = None;
    }

    /// Select the weight unit and clear the weight.
    pub fn set_weight_unit(&mut self, unit: UnitSystem) {
        self.weight_unit = unit;
        self.weight = None;
    }

    /// Clear every field and the result, and go back to metric units.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Check the form rules, reporting every failing field.
    pub fn validate(&self) -> Result<(Weight, Height), ValidationErrors> {
        let mut errors = Vec::new();

        match self.age {
            None => errors.push(FieldError::new("age", "Age is required")),
            Some(age) if age < 1 => errors.push(FieldError::new("age", "Age must be at least 1")),
            Some(age) if age > 120 => errors.push(FieldError::new("age", "Age must be less than 120")),
            Some(_) => {}
        }

        let weight = match self.weight {
            None => {
                errors.push(FieldError::new("weight", "Weight is required"));
                None
            }
            Some(w) if w.is_nan() || w < 1.0 => {
                errors.push(FieldError::new("weight", "Weight must be greater than 0"));
                None
            }
            Some(w) if w > 1000.0 => {
                errors.push(FieldError::new("weight", "Weight must be less than 1000"));
                None
            }
            Some(w) => Some(Weight::new(w, self.weight_unit.weight_unit())),
        };

        let height = self.validate_height(&mut errors);

        match (weight, height) {
            (Some(weight), Some(height)) if errors.is_empty() => Ok((weight, height)),
            _ => Err(ValidationErrors(errors)),
        }
    }

    fn validate_height(&self, errors: &mut Vec<FieldError>) -> Option<Height> {
        match self.height_unit {
            UnitSystem::Metric => match self.height_cm {
                None => {
                    errors.push(FieldError::new("heightCm", "Please enter a valid height"));
                    None
                }
                Some(cm) if cm.is_nan() || cm < 30.0 => {
                    errors.push(FieldError::new("heightCm", "Height must be at least 30cm"));
                    None
                }
                Some(cm) if cm > 300.0 => {
                    errors.push(FieldError::new("heightCm", "Height must be less than 300cm"));
                    None
                }
                Some(cm) => Some(Height::Centimeters(cm)),
            },
            UnitSystem::Imperial => {
                let before = errors.len();
                if let Some(feet) = self.height_feet {
                    if feet.is_nan() || feet < 1.0 {
                        errors.push(FieldError::new("heightFeet", "Height must be at least 1 foot"));
                    } else if feet > 9.0 {
                        errors.push(FieldError::new("heightFeet", "Height must be less than 9 feet"));
                    }
                }
                if let Some(inches) = self.height_inches {
                    if inches.is_nan() || inches < 0.0 {
                        errors.push(FieldError::new("heightInches", "Inches must be 0 or more"));
                    } else if inches > 11.0 {
                        errors.push(FieldError::new("heightInches", "Inches must be less than 12"));
                    }
                }

                match (self.height_feet, self.height_inches) {
                    (Some(feet), Some(inches)) if errors.len() == before => Some(Height::FeetInches { feet, inches }),
                    (Some(_), Some(_)) => None,
                    _ => {
                        errors.push(FieldError::new("heightCm", "Please enter a valid height"));
                        None
                    }
                }
            }
        }
    }

    /// Validate, calculate and keep the result.
    pub fn submit(&mut self) -> Result<BmiResult, CalculatorError> {
        let (weight, height) = self.validate().map_err(CalculatorError::Invalid)?;
        let result = bmi::calculate(weight, height)?;
        self.result = Some(result);
        Ok(result)
    }

    /// Body for `POST /api/bmi-records` carrying the form as entered plus the last result.
    pub fn to_create_request(&self, name: impl Into<String>, user_id: Option<UserId>) -> BmiRecordCreate {
        let (height_cm, height_feet, height_inches) = match self.height_unit {
            UnitSystem::Metric => (self.height_cm, None, None),
            UnitSystem::Imperial => (None, self.height_feet, self.height_inches),
        };

        BmiRecordCreate {
            user_id: user_id.map(i64::from),
            name: Some(name.into()),
            age: self.age.map(i64::from),
            weight: self.weight,
            weight_unit: Some(self.weight_unit.weight_unit()),
            height_cm,
            height_feet,
            height_inches,
            bmi: self.result.map(|r| r.bmi),
            category: self.result.map(|r| r.category.label().to_string()),
        }
    }
}

impl From<&CalculateArgs> for CalculatorForm {
    fn from(args: &CalculateArgs) -> Self {
        let mut form = CalculatorForm::new();
        if args.weight_unit() == WeightUnit::Lb {
            form.set_weight_unit(UnitSystem::Imperial);
        }
        if args.height_cm.is_none() && (args.height_feet.is_some() || args.height_inches.is_some()) {
            form.set_height_unit(UnitSystem::Imperial);
        }
        form.age = Some(args.age);
        form.weight = Some(args.weight);
        form.height_cm = args.height_cm;
        form.height_feet = args.height_feet;
        form.height_inches = args.height_inches;
        form
    }
}
