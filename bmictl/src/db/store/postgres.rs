//! PostgreSQL-backed record store.

use sqlx::PgPool;

use super::RecordStore;
use crate::{
    db::{
        errors::Result,
        handlers::{BmiRecords, Repository},
        models::bmi_records::{BmiRecordCreateDBRequest, BmiRecordDBResponse, BmiRecordFilter},
    },
    types::UserId,
};

#[derive(Clone)]
pub struct PostgresRecordStore {
    pool: PgPool,
}

impl PostgresRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn list(&self, filter: BmiRecordFilter) -> Result<Vec<BmiRecordDBResponse>> {
        let mut conn = self.pool.acquire().await?;
        BmiRecords::new(&mut conn).list(&filter).await
    }
}

#[async_trait::async_trait]
impl RecordStore for PostgresRecordStore {
    async fn create_record(&self, candidate: &BmiRecordCreateDBRequest) -> Result<BmiRecordDBResponse> {
        let mut conn = self.pool.acquire().await?;
        BmiRecords::new(&mut conn).create(candidate).await
    }

    async fn list_all_records(&self) -> Result<Vec<BmiRecordDBResponse>> {
        self.list(BmiRecordFilter::all()).await
    }

    async fn list_records_for_user(&self, user_id: UserId) -> Result<Vec<BmiRecordDBResponse>> {
        self.list(BmiRecordFilter::for_user(user_id)).await
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
