//! API request and response models.
//!
//! These are the JSON shapes on the wire (camelCase). They convert from the database models in
//! [`crate::db::models`] rather than exposing them directly.

pub mod bmi_records;
