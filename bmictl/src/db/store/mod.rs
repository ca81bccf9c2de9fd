//! Record store: the persistence seam the HTTP handlers depend on.
//!
//! The store is constructed once at startup and shared through [`crate::AppState`] as an
//! `Arc<dyn RecordStore>`. Two implementations exist:
//!
//! - [`postgres::PostgresRecordStore`]: delegates to the [`BmiRecords`](crate::db::handlers::BmiRecords)
//!   repository over a `PgPool`
//! - [`in_memory::InMemoryRecordStore`]: process-local, used for `database.type: memory` and tests

use crate::{
    db::{
        errors::Result,
        models::bmi_records::{BmiRecordCreateDBRequest, BmiRecordDBResponse},
    },
    types::UserId,
};

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryRecordStore;
pub use postgres::PostgresRecordStore;

/// Persistence operations for BMI records.
///
/// Listings are ordered newest first (`created_at DESC`, ties broken by `id DESC`).
#[async_trait::async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert one record atomically. The store assigns `id` and `created_at`.
    ///
    /// # Errors
    /// - `ForeignKeyViolation` if `user_id` references a missing user
    /// - `Other` if the store is unreachable
    async fn create_record(&self, candidate: &BmiRecordCreateDBRequest) -> Result<BmiRecordDBResponse>;

    /// All records, newest first.
    async fn list_all_records(&self) -> Result<Vec<BmiRecordDBResponse>>;

    /// Records owned by `user_id`, newest first. Empty if the user has none.
    async fn list_records_for_user(&self, user_id: UserId) -> Result<Vec<BmiRecordDBResponse>>;

    /// Release underlying resources at shutdown.
    async fn close(&self) {}
}
