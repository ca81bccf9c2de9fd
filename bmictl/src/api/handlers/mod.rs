//! HTTP request handlers for all API endpoints.
//!
//! Each handler validates and deserializes the request, delegates to the
//! [`RecordStore`](crate::db::store::RecordStore) held in [`AppState`](crate::AppState), and
//! serializes the response. Handlers return [`crate::errors::Error`], which converts to the
//! matching status code and a JSON `{"error": ...}` body.
//!
//! - [`bmi_records`]: create BMI records and list them, globally or per user

pub mod bmi_records;
