//! # bmictl: BMI calculator service
//!
//! `bmictl` computes Body Mass Index from a weight and a height, in metric or imperial units,
//! and keeps a history of completed calculations. It exposes that history over a small HTTP API
//! and ships the calculator itself as a `calculate` subcommand.
//!
//! ## Architecture
//!
//! The HTTP layer is built on [Axum](https://github.com/tokio-rs/axum). Records are stored in
//! PostgreSQL, either an external server or an embedded instance started with the application
//! (`embedded-db` feature). A process-local store is available for development and tests.
//!
//! ### Core Components
//!
//! The **BMI engine** ([`bmi`]) normalizes measurements, computes the score rounded to one
//! decimal and classifies it. It is pure and has no dependencies on the rest of the crate.
//!
//! The **calculator** ([`calculator`]) is the form a user fills in: unit toggles, the form's own
//! range rules, and the payload sent to the API once a result exists.
//!
//! The **API layer** ([`api`]) serves three endpoints under `/api`. Create requests are
//! validated field by field, and the BMI and category are recomputed before storing, so a stored
//! category always matches its stored BMI.
//!
//! The **database layer** ([`db`]) holds the repositories over the `users` and `bmi_records`
//! tables and the [`RecordStore`](db::store::RecordStore) abstraction the handlers use.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use bmictl::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = bmictl::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     bmictl::telemetry::init_telemetry(config.enable_otel_export)?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!     })
//!     .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Database Setup
//!
//! Migrations run automatically on startup. To run them by hand:
//!
//! ```no_run
//! # use sqlx::PgPool;
//! # async fn example(pool: PgPool) -> Result<(), sqlx::migrate::MigrateError> {
//! bmictl::migrator().run(&pool).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration
//!
//! See [`config`] for the YAML layout and the `BMICTL_` environment overrides.

pub mod api;
pub mod bmi;
pub mod calculator;
pub mod config;
pub mod db;
pub mod errors;
pub mod openapi;
pub mod password;
pub mod telemetry;
#[cfg(test)]
mod test_utils;
pub mod types;

use std::{str::FromStr, sync::Arc, time::Duration};

use axum::{
    Json, Router,
    http::{self, HeaderValue},
    routing::get,
};
use axum_prometheus::PrometheusMetricLayer;
use bon::Builder;
use sqlx::{
    ConnectOptions,
    postgres::{PgConnectOptions, PgPoolOptions},
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info, instrument};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

pub use config::Config;
use config::{CorsOrigin, DatabaseConfig};
use db::store::{InMemoryRecordStore, PostgresRecordStore, RecordStore};
use openapi::ApiDoc;
pub use types::{BmiRecordId, UserId};

/// Application state shared across all request handlers.
///
/// ```ignore
/// let state = AppState::builder()
///     .store(Arc::new(InMemoryRecordStore::new()))
///     .config(config)
///     .build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub config: Config,
}

/// Get the bmictl database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Open the configured record store, starting an embedded database first if one is configured.
async fn setup_database(config: &Config) -> anyhow::Result<(Option<db::embedded::EmbeddedDatabase>, Arc<dyn RecordStore>)> {
    let (embedded_db, database_url, pool_settings) = match &config.database {
        DatabaseConfig::Memory => {
            info!("Using in-memory record store, records will be lost on shutdown");
            return Ok((None, Arc::new(InMemoryRecordStore::new())));
        }
        DatabaseConfig::Embedded {
            data_dir,
            persistent,
            pool,
        } => {
            info!("Starting with embedded database (persistent: {})", persistent);
            if !persistent {
                info!("persistent=false: database will be ephemeral and data will be lost on shutdown");
            }
            let embedded_db = db::embedded::EmbeddedDatabase::start(data_dir.clone(), *persistent).await?;
            let url = embedded_db.connection_string().to_string();
            (Some(embedded_db), url, pool.clone())
        }
        DatabaseConfig::External { url, pool } => {
            info!("Using external database");
            (None, url.clone(), pool.clone())
        }
    };

    let connect_options = PgConnectOptions::from_str(&database_url)?.log_slow_statements(
        log::LevelFilter::Warn,
        Duration::from_millis(config.slow_statement_threshold_ms),
    );

    let pool = PgPoolOptions::new()
        .max_connections(pool_settings.max_connections)
        .min_connections(pool_settings.min_connections)
        .acquire_timeout(pool_settings.acquire_timeout())
        .idle_timeout(pool_settings.idle_timeout())
        .max_lifetime(pool_settings.max_lifetime())
        .connect_with(connect_options)
        .await?;

    migrator().run(&pool).await?;

    Ok((embedded_db, Arc::new(PostgresRecordStore::new(pool))))
}

/// Create CORS layer from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let cors_config = &config.security.cors;

    let cors = CorsLayer::new()
        .allow_methods([http::Method::GET, http::Method::POST])
        .allow_headers([http::header::CONTENT_TYPE])
        .expose_headers(vec![http::header::LOCATION]);

    // A wildcard origin cannot be combined with credentials or listed with other origins
    let mut cors = if cors_config.allowed_origins.contains(&CorsOrigin::Wildcard) {
        cors.allow_origin(AllowOrigin::any())
    } else {
        let mut origins = Vec::new();
        for origin in &cors_config.allowed_origins {
            if let CorsOrigin::Url(url) = origin {
                origins.push(url.as_str().trim_end_matches('/').parse::<HeaderValue>()?);
            }
        }
        cors.allow_origin(origins).allow_credentials(cors_config.allow_credentials)
    };

    if let Some(max_age) = cors_config.max_age {
        cors = cors.max_age(Duration::from_secs(max_age));
    }

    Ok(cors)
}

/// Build the application router: the record API under `/api`, health and docs routes,
/// optional Prometheus metrics, CORS and request tracing.
#[instrument(skip_all)]
pub fn build_router(state: &AppState) -> anyhow::Result<Router> {
    let api_routes = Router::new()
        .route(
            "/bmi-records",
            get(api::handlers::bmi_records::list_bmi_records).post(api::handlers::bmi_records::create_bmi_record),
        )
        .route(
            "/users/{user_id}/bmi-records",
            get(api::handlers::bmi_records::list_user_bmi_records),
        );

    let router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .nest("/api", api_routes)
        .with_state(state.clone())
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()));

    let cors_layer = create_cors_layer(&state.config)?;
    let mut router = router.layer(cors_layer);

    if state.config.enable_metrics {
        let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();
        router = router
            .route("/internal/metrics", get(|| async move { metric_handle.render() }))
            .layer(prometheus_layer);
    }

    let router = router.layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    Ok(router)
}

/// The assembled service.
///
/// 1. **Create**: [`Application::new`] opens the record store (starting the embedded database
///    and running migrations when configured) and builds the router
/// 2. **Serve**: [`Application::serve`] binds to the configured address and handles requests
/// 3. **Shutdown**: once the shutdown future resolves, in-flight requests drain, then the store,
///    telemetry and embedded database are shut down in that order
pub struct Application {
    router: Router,
    config: Config,
    store: Arc<dyn RecordStore>,
    embedded_db: Option<db::embedded::EmbeddedDatabase>,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        debug!("Starting bmictl with configuration: {:#?}", config);

        let (embedded_db, store) = setup_database(&config).await?;

        let mut app = Self::new_with_store(config, store)?;
        app.embedded_db = embedded_db;
        Ok(app)
    }

    /// Build the application around an already opened store
    pub fn new_with_store(config: Config, store: Arc<dyn RecordStore>) -> anyhow::Result<Self> {
        let app_state = AppState::builder().store(store.clone()).config(config.clone()).build();
        let router = build_router(&app_state)?;

        Ok(Self {
            router,
            config,
            store,
            embedded_db: None,
        })
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router.into_make_service()).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!("bmictl listening on http://{}", listener.local_addr()?);

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Closing record store...");
        self.store.close().await;

        info!("Shutting down telemetry...");
        telemetry::shutdown_telemetry();

        if let Some(embedded_db) = self.embedded_db {
            info!("Shutting down embedded database...");
            embedded_db.stop().await?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use serde_json::{Value, json};
    use sqlx::{ConnectOptions, PgPool};

    use super::Application;
    use crate::config::{CorsOrigin, DatabaseConfig, PoolSettings};
    use crate::test_utils::*;

    #[test_log::test(tokio::test)]
    async fn test_healthz() {
        let (server, _store) = create_test_app();

        let response = server.get("/healthz").await;
        response.assert_status_ok();
        assert_eq!(response.text(), "OK");
    }

    #[test_log::test(tokio::test)]
    async fn test_openapi_json_lists_record_paths() {
        let (server, _store) = create_test_app();

        let response = server.get("/api-docs/openapi.json").await;
        response.assert_status_ok();

        let doc: Value = response.json();
        assert!(doc["openapi"].is_string());
        assert!(doc["paths"]["/api/bmi-records"]["get"].is_object());
        assert!(doc["paths"]["/api/bmi-records"]["post"].is_object());
        assert!(doc["paths"]["/api/users/{user_id}/bmi-records"]["get"].is_object());
    }

    #[test_log::test(tokio::test)]
    async fn test_docs_page_is_served() {
        let (server, _store) = create_test_app();

        let response = server.get("/docs").await;
        response.assert_status_ok();
        assert!(response.text().contains("<html"));
    }

    #[test_log::test(tokio::test)]
    async fn test_metrics_route_absent_when_disabled() {
        let (server, _store) = create_test_app();

        let response = server.get("/internal/metrics").await;
        response.assert_status_not_found();
    }

    // The only test that installs the global Prometheus recorder
    #[test_log::test(tokio::test)]
    async fn test_metrics_route_when_enabled() {
        let mut config = create_test_config();
        config.enable_metrics = true;
        let server = Application::new_with_store(config, Arc::new(InMemoryRecordStore::new()))
            .expect("Failed to create application")
            .into_test_server();

        server
            .post("/api/bmi-records")
            .json(&json!({
                "name": "Counted",
                "age": 30,
                "weight": 70,
                "heightCm": 175
            }))
            .await
            .assert_status(axum::http::StatusCode::CREATED);

        let response = server.get("/internal/metrics").await;
        response.assert_status_ok();
        let body = response.text();
        assert!(body.contains("# TYPE"));
        assert!(body.contains("bmictl_bmi_records_created_total"));
    }

    #[test_log::test(tokio::test)]
    async fn test_cors_allows_configured_origin() {
        let mut config = create_test_config();
        config.security.cors.allowed_origins = vec![CorsOrigin::Url("http://localhost:5173".parse().unwrap())];
        let server = Application::new_with_store(config, Arc::new(InMemoryRecordStore::new()))
            .expect("Failed to create application")
            .into_test_server();

        let response = server
            .get("/api/bmi-records")
            .add_header("origin", "http://localhost:5173")
            .await;
        response.assert_status_ok();
        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "http://localhost:5173"
        );
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_application_with_postgres(pool: PgPool) {
        let mut config = create_test_config();
        config.database = DatabaseConfig::External {
            url: pool.connect_options().to_url_lossy().to_string(),
            pool: PoolSettings::default(),
        };

        let server = Application::new(config)
            .await
            .expect("Application::new should succeed")
            .into_test_server();

        let created = server
            .post("/api/bmi-records")
            .json(&json!({ "name": "Ada", "age": 36, "weight": 70, "heightCm": 175 }))
            .await;
        created.assert_status(axum::http::StatusCode::CREATED);

        let records: Vec<Value> = server.get("/api/bmi-records").await.json();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["bmi"], 22.9);
        assert_eq!(records[0]["category"], "Normal Weight");
    }
}
