//! API request/response models for BMI records.

use crate::bmi::{BmiCategory, WeightUnit};
use crate::db::models::bmi_records::BmiRecordDBResponse;
use crate::types::{BmiRecordId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body of `POST /api/bmi-records`.
///
/// Every field is optional at the JSON level so that missing fields are reported alongside all
/// other validation failures instead of as a parse error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BmiRecordCreate {
    /// Owning user, absent for anonymous submissions
    pub user_id: Option<i64>,
    pub name: Option<String>,
    pub age: Option<i64>,
    /// Weight in `weightUnit`
    pub weight: Option<f64>,
    /// Defaults to kilograms when absent or null
    pub weight_unit: Option<WeightUnit>,
    /// Height in centimeters. Takes precedence over feet/inches.
    #[serde(alias = "height")]
    pub height_cm: Option<f64>,
    pub height_feet: Option<f64>,
    pub height_inches: Option<f64>,
    /// Client-computed BMI; recomputed by the server
    pub bmi: Option<f64>,
    /// Client-computed category; recomputed by the server
    pub category: Option<String>,
}

/// A stored BMI record as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BmiRecordResponse {
    pub id: BmiRecordId,
    pub user_id: Option<UserId>,
    pub name: String,
    pub age: i32,
    /// Kilograms
    pub weight: f64,
    /// Centimeters
    pub height: f64,
    pub bmi: f64,
    pub category: BmiCategory,
    pub created_at: DateTime<Utc>,
}

impl From<BmiRecordDBResponse> for BmiRecordResponse {
    fn from(db: BmiRecordDBResponse) -> Self {
        Self {
            id: db.id,
            user_id: db.user_id,
            name: db.name,
            age: db.age,
            weight: db.weight,
            height: db.height,
            bmi: db.bmi,
            category: db.category,
            created_at: db.created_at,
        }
    }
}
