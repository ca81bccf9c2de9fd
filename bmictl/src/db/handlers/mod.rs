//! Repository implementations for database access.
//!
//! Each repository wraps a `&mut PgConnection` (a pooled connection or a transaction). Record
//! access goes through the [`Repository`] trait:
//!
//! ```ignore
//! use bmictl::db::handlers::{BmiRecords, Repository};
//! use bmictl::db::models::bmi_records::BmiRecordFilter;
//!
//! async fn example(pool: &sqlx::PgPool) -> Result<(), Box<dyn std::error::Error>> {
//!     let mut conn = pool.acquire().await?;
//!     let records = BmiRecords::new(&mut conn).list(&BmiRecordFilter::all()).await?;
//!     println!("{} records", records.len());
//!     Ok(())
//! }
//! ```
//!
//! - [`BmiRecords`]: BMI record inserts and newest-first listings
//! - [`Users`]: user accounts with Argon2 password hashing

pub mod bmi_records;
pub mod repository;
pub mod users;

pub use bmi_records::BmiRecords;
pub use repository::Repository;
pub use users::Users;
