//! Validation of record-creation requests.
//!
//! [`validate_create`] checks every field and collects all failures instead of stopping at the
//! first one. A request that passes yields a [`ValidatedRecord`] whose measurements are typed and
//! within range, ready for the BMI engine.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::models::bmi_records::BmiRecordCreate;
use crate::bmi::{self, BmiCategory, BmiError, Height, Weight};
use crate::db::models::bmi_records::BmiRecordCreateDBRequest;
use crate::types::UserId;

pub const NAME_MAX_CHARS: usize = 100;
pub const AGE_RANGE: std::ops::RangeInclusive<i64> = 1..=120;
/// Exclusive upper bound on normalized weight
pub const MAX_WEIGHT_KG: f64 = 1000.0;
pub const HEIGHT_CM_RANGE: std::ops::RangeInclusive<f64> = 30.0..=300.0;
pub const HEIGHT_FEET_RANGE: std::ops::RangeInclusive<f64> = 1.0..=9.0;
/// Exclusive upper bound on the inches part of an imperial height
pub const MAX_HEIGHT_INCHES: f64 = 12.0;

/// One failed field, named by its JSON key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Non-empty list of field failures.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self(vec![FieldError::new(field, message)])
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|e| e.field.as_str())
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", error.field, error.message)?;
        }
        Ok(())
    }
}

/// A request that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRecord {
    pub user_id: Option<UserId>,
    /// Trimmed
    pub name: String,
    pub age: i32,
    pub weight: Weight,
    pub height: Height,
    pub client_bmi: Option<f64>,
    pub client_category: Option<BmiCategory>,
}

impl ValidatedRecord {
    /// Compute BMI server-side and build the insert request in canonical units.
    pub fn into_db_request(self) -> Result<BmiRecordCreateDBRequest, BmiError> {
        let result = bmi::calculate(self.weight, self.height)?;

        if self.client_bmi.is_some_and(|client| client != result.bmi)
            || self.client_category.is_some_and(|client| client != result.category)
        {
            tracing::debug!(
                client_bmi = ?self.client_bmi,
                client_category = ?self.client_category,
                bmi = result.bmi,
                category = %result.category,
                "client-supplied BMI disagrees with server computation, using server values"
            );
        }

        Ok(BmiRecordCreateDBRequest {
            user_id: self.user_id,
            name: self.name,
            age: self.age,
            weight: result.weight_kg,
            height: result.height_cm,
            bmi: result.bmi,
            category: result.category,
        })
    }
}

/// Validate a create request, reporting every failing field.
pub fn validate_create(request: &BmiRecordCreate) -> Result<ValidatedRecord, ValidationErrors> {
    let mut errors = Vec::new();

    let user_id = match request.user_id {
        None => None,
        Some(id) => match UserId::try_from(id) {
            Ok(id) if id > 0 => Some(id),
            _ => {
                errors.push(FieldError::new("userId", "User ID must be a positive integer"));
                None
            }
        },
    };

    let name = match request.name.as_deref().map(str::trim) {
        None | Some("") => {
            errors.push(FieldError::new("name", "Name is required"));
            None
        }
        Some(name) if name.chars().count() > NAME_MAX_CHARS => {
            errors.push(FieldError::new(
                "name",
                format!("Name must be at most {NAME_MAX_CHARS} characters"),
            ));
            None
        }
        Some(name) => Some(name.to_string()),
    };

    let age = match request.age {
        None => {
            errors.push(FieldError::new("age", "Age is required"));
            None
        }
        Some(age) if age < *AGE_RANGE.start() => {
            errors.push(FieldError::new("age", format!("Age must be at least {}", AGE_RANGE.start())));
            None
        }
        Some(age) if age > *AGE_RANGE.end() => {
            errors.push(FieldError::new("age", format!("Age must be at most {}", AGE_RANGE.end())));
            None
        }
        // In range, so it fits
        Some(age) => Some(age as i32),
    };

    let weight = match request.weight {
        None => {
            errors.push(FieldError::new("weight", "Weight is required"));
            None
        }
        Some(value) if !value.is_finite() || value <= 0.0 => {
            errors.push(FieldError::new("weight", "Weight must be greater than 0"));
            None
        }
        Some(value) => {
            let weight = Weight::new(value, request.weight_unit.unwrap_or_default());
            if weight.kilograms() >= MAX_WEIGHT_KG {
                errors.push(FieldError::new(
                    "weight",
                    format!("Weight must be less than {MAX_WEIGHT_KG} kg"),
                ));
                None
            } else {
                Some(weight)
            }
        }
    };

    let height = validate_height(request, &mut errors);

    let client_category = match request.category.as_deref() {
        None => None,
        Some(label) => match label.parse::<BmiCategory>() {
            Ok(category) => Some(category),
            Err(_) => {
                let labels: Vec<_> = BmiCategory::ALL.iter().map(|c| c.label()).collect();
                errors.push(FieldError::new(
                    "category",
                    format!("Category must be one of: {}", labels.join(", ")),
                ));
                None
            }
        },
    };

    match (name, age, weight, height) {
        (Some(name), Some(age), Some(weight), Some(height)) if errors.is_empty() => Ok(ValidatedRecord {
            user_id,
            name,
            age,
            weight,
            height,
            client_bmi: request.bmi,
            client_category,
        }),
        _ => Err(ValidationErrors(errors)),
    }
}

fn height_range_message() -> String {
    format!(
        "Height must be between {} and {} cm",
        HEIGHT_CM_RANGE.start(),
        HEIGHT_CM_RANGE.end()
    )
}

fn validate_height(request: &BmiRecordCreate, errors: &mut Vec<FieldError>) -> Option<Height> {
    if let Some(cm) = request.height_cm {
        if !HEIGHT_CM_RANGE.contains(&cm) {
            errors.push(FieldError::new("heightCm", height_range_message()));
            return None;
        }
        return Some(Height::Centimeters(cm));
    }

    let (feet, inches) = match (request.height_feet, request.height_inches) {
        (None, None) => {
            errors.push(FieldError::new(
                "heightCm",
                "Height is required: provide heightCm, or heightFeet and heightInches",
            ));
            return None;
        }
        (Some(_), None) => {
            errors.push(FieldError::new("heightInches", "Inches are required with feet"));
            return None;
        }
        (None, Some(_)) => {
            errors.push(FieldError::new("heightFeet", "Feet are required with inches"));
            return None;
        }
        (Some(feet), Some(inches)) => (feet, inches),
    };

    let mut valid = true;
    if !HEIGHT_FEET_RANGE.contains(&feet) {
        errors.push(FieldError::new(
            "heightFeet",
            format!(
                "Feet must be between {} and {}",
                HEIGHT_FEET_RANGE.start(),
                HEIGHT_FEET_RANGE.end()
            ),
        ));
        valid = false;
    }
    if !(0.0..MAX_HEIGHT_INCHES).contains(&inches) {
        errors.push(FieldError::new(
            "heightInches",
            format!("Inches must be at least 0 and less than {MAX_HEIGHT_INCHES}"),
        ));
        valid = false;
    }
    if !valid {
        return None;
    }

    let height = Height::FeetInches { feet, inches };
    if !HEIGHT_CM_RANGE.contains(&height.centimeters()) {
        errors.push(FieldError::new("heightFeet", height_range_message()));
        return None;
    }
    Some(height)
}
