//! Database record models matching table schemas.
//!
//! Models here are distinct from the API models in [`crate::api::models`] so that storage and
//! wire representations can evolve independently. Row structs derive `sqlx::FromRow`; the
//! category column is decoded through `BmiCategory: TryFrom<String>` so an unknown label in the
//! table surfaces as a decode error rather than a silently wrong value.

pub mod bmi_records;
pub mod users;
