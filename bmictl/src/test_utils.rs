//! Shared fixtures for handler and application tests.

use std::sync::Arc;

use axum_test::TestServer;

use crate::{
    bmi::{self, Height, Weight},
    config::{Config, DatabaseConfig},
    db::{
        errors::{DbError, Result},
        models::bmi_records::{BmiRecordCreateDBRequest, BmiRecordDBResponse},
    },
    types::UserId,
};

pub use crate::db::store::{InMemoryRecordStore, RecordStore};

pub fn create_test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        database: DatabaseConfig::Memory,
        enable_metrics: false,
        enable_otel_export: false,
        ..Default::default()
    }
}

/// Test server over a fresh in-memory store. The store handle is returned for seeding and
/// inspection.
pub fn create_test_app() -> (TestServer, InMemoryRecordStore) {
    let store = InMemoryRecordStore::new();
    let server = create_test_app_with_store(Arc::new(store.clone()));
    (server, store)
}

pub fn create_test_app_with_store(store: Arc<dyn RecordStore>) -> TestServer {
    crate::Application::new_with_store(create_test_config(), store)
        .expect("Failed to create application")
        .into_test_server()
}

/// Insert a 70 kg / 175 cm record directly through the store
pub async fn create_test_record(store: &dyn RecordStore, user_id: Option<UserId>, name: &str) -> BmiRecordDBResponse {
    let result = bmi::calculate(Weight::Kilograms(70.0), Height::Centimeters(175.0)).expect("valid measurements");
    store
        .create_record(&BmiRecordCreateDBRequest {
            user_id,
            name: name.to_string(),
            age: 30,
            weight: result.weight_kg,
            height: result.height_cm,
            bmi: result.bmi,
            category: result.category,
        })
        .await
        .expect("Failed to create test record")
}

/// A store whose every operation fails, as an unreachable database would.
pub struct FailingRecordStore;

fn unreachable_store() -> DbError {
    DbError::Other(anyhow::anyhow!("connection refused"))
}

#[async_trait::async_trait]
impl RecordStore for FailingRecordStore {
    async fn create_record(&self, _candidate: &BmiRecordCreateDBRequest) -> Result<BmiRecordDBResponse> {
        Err(unreachable_store())
    }

    async fn list_all_records(&self) -> Result<Vec<BmiRecordDBResponse>> {
        Err(unreachable_store())
    }

    async fn list_records_for_user(&self, _user_id: UserId) -> Result<Vec<BmiRecordDBResponse>> {
        Err(unreachable_store())
    }
}
