//! Database layer for data persistence and access.
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  (api::handlers)
//! └──────┬──────┘
//!        ↓
//! ┌─────────────┐
//! │ RecordStore │  (db::store - Postgres or in-memory)
//! └──────┬──────┘
//!        ↓
//! ┌─────────────┐
//! │ Repositories│  (db::handlers - queries over a PgConnection)
//! └──────┬──────┘
//!        ↓
//! ┌─────────────┐
//! │  PostgreSQL │
//! └─────────────┘
//! ```
//!
//! - [`store`]: the [`RecordStore`](store::RecordStore) seam used by the HTTP layer
//! - [`handlers`]: repository implementations
//! - [`models`]: database record structures matching table schemas
//! - [`errors`]: database-specific error types
//! - [`embedded`]: embedded PostgreSQL support (optional feature)
//!
//! Migrations live in `migrations/` and are embedded with [`crate::migrator`]:
//!
//! ```ignore
//! bmictl::migrator().run(&pool).await?;
//! ```

pub mod embedded;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod store;
