//! Database models for BMI records.

use crate::bmi::BmiCategory;
use crate::types::{BmiRecordId, UserId};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database request for inserting a BMI record.
///
/// Measurements are already normalized: `weight` in kilograms, `height` in centimeters.
#[derive(Debug, Clone, PartialEq)]
pub struct BmiRecordCreateDBRequest {
    pub user_id: Option<UserId>,
    pub name: String,
    pub age: i32,
    pub weight: f64,
    pub height: f64,
    pub bmi: f64,
    pub category: BmiCategory,
}

/// Database response for a BMI record
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct BmiRecordDBResponse {
    pub id: BmiRecordId,
    pub user_id: Option<UserId>,
    pub name: String,
    pub age: i32,
    pub weight: f64,
    pub height: f64,
    pub bmi: f64,
    #[sqlx(try_from = "String")]
    pub category: BmiCategory,
    pub created_at: DateTime<Utc>,
}

/// Filter for listing BMI records
#[derive(Debug, Clone, Default)]
pub struct BmiRecordFilter {
    /// Restrict to records owned by this user
    pub user_id: Option<UserId>,
}

impl BmiRecordFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn for_user(user_id: UserId) -> Self {
        Self { user_id: Some(user_id) }
    }
}
