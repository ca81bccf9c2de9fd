//! In-memory record store.
//!
//! Records live in a `Vec` behind a `tokio::sync::RwLock` and are lost on restart. Owner ids are
//! not checked against any user table.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;

use super::RecordStore;
use crate::{
    db::{
        errors::Result,
        models::bmi_records::{BmiRecordCreateDBRequest, BmiRecordDBResponse},
    },
    types::{BmiRecordId, UserId},
};

#[derive(Default)]
struct Inner {
    next_id: BmiRecordId,
    records: Vec<BmiRecordDBResponse>,
}

#[derive(Clone, Default)]
pub struct InMemoryRecordStore {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn list_where(&self, keep: impl Fn(&BmiRecordDBResponse) -> bool) -> Vec<BmiRecordDBResponse> {
        let inner = self.inner.read().await;
        let mut records: Vec<_> = inner.records.iter().filter(|r| keep(r)).cloned().collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        records
    }
}

#[async_trait::async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn create_record(&self, candidate: &BmiRecordCreateDBRequest) -> Result<BmiRecordDBResponse> {
        let mut inner = self.inner.write().await;
        inner.next_id += 1;

        let record = BmiRecordDBResponse {
            id: inner.next_id,
            user_id: candidate.user_id,
            name: candidate.name.clone(),
            age: candidate.age,
            weight: candidate.weight,
            height: candidate.height,
            bmi: candidate.bmi,
            category: candidate.category,
            created_at: Utc::now(),
        };
        inner.records.push(record.clone());

        Ok(record)
    }

    async fn list_all_records(&self) -> Result<Vec<BmiRecordDBResponse>> {
        Ok(self.list_where(|_| true).await)
    }

    async fn list_records_for_user(&self, user_id: UserId) -> Result<Vec<BmiRecordDBResponse>> {
        Ok(self.list_where(|r| r.user_id == Some(user_id)).await)
    }
}
