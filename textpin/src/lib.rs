//! # textpin: text on IPFS, indexed by content identifier
//!
//! `textpin` is a small HTTP service that uploads text to a content-addressed storage network
//! (IPFS, through the thirdweb storage service) and records which content identifier (CID) the
//! text was stored under. Clients later fetch the text back by CID.
//!
//! ## Request Flow
//!
//! `POST /store-text` takes `{"text": "..."}`, uploads the text as a single payload, keeps the
//! first identifier the upload returns and saves a record pairing that identifier with the text.
//! The response is `{"cid": "..."}`.
//!
//! `GET /retrieve-text/{cid}` checks that a record exists for the identifier, downloads the
//! content from storage, decodes it as UTF-8 and returns `{"text": "..."}`.
//!
//! Neither route retries, caches or deduplicates. If the upload succeeds but the record cannot be
//! saved, the uploaded content is left in place.
//!
//! ## Core Components
//!
//! - [`api`]: axum handlers and wire models
//! - [`storage`]: the [`storage::ContentStorage`] trait with thirdweb and in-memory backends
//! - [`db`]: the [`db::handlers::RecordStore`] trait with PostgreSQL and in-memory backends
//! - [`errors`]: the error taxonomy and its mapping to HTTP responses
//! - [`config`]: YAML + environment configuration
//!
//! Both external clients are created once at startup and injected through [`AppState`].
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use textpin::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = textpin::config::Args::parse();
//!     let config = Config::load(&args)?;
//!     textpin::telemetry::init_telemetry(config.log_format)?;
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

pub mod api;
pub mod config;
pub mod db;
pub mod errors;
mod openapi;
pub mod storage;
pub mod telemetry;

#[cfg(test)]
pub mod test_utils;

pub use config::Config;

use anyhow::Context;
use axum::{
    Json, Router,
    routing::{get, post},
};
use bon::Builder;
use sqlx::PgPool;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::{Level, debug, info};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::config::{DatabaseConfig, StorageConfig};
use crate::db::handlers::{InMemoryRecordStore, PostgresRecordStore, RecordStore};
use crate::openapi::ApiDoc;
use crate::storage::{ContentStorage, InMemoryStorage, ThirdwebStorage};

/// Shared dependencies handed to every request handler.
///
/// ```ignore
/// let state = AppState::builder()
///     .storage(Arc::new(InMemoryStorage::new()))
///     .records(Arc::new(InMemoryRecordStore::new()))
///     .build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub storage: Arc<dyn ContentStorage>,
    pub records: Arc<dyn RecordStore>,
}

/// Get the textpin database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Build the HTTP router over the given state.
pub fn build_router(state: &AppState) -> Router {
    let router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .route("/store-text", post(api::handlers::texts::store_text))
        // Identifiers may contain '/', so capture the rest of the path
        .route("/retrieve-text/{*cid}", get(api::handlers::texts::retrieve_text))
        .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .with_state(state.clone())
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()));

    router.layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    )
}

/// Create the record store described by the config. The pool is returned separately so it can
/// be closed on shutdown.
async fn setup_record_store(config: &Config) -> anyhow::Result<(Arc<dyn RecordStore>, Option<PgPool>)> {
    match &config.database {
        DatabaseConfig::Postgres { url, pool } => {
            info!("Using PostgreSQL record store");
            let store = PostgresRecordStore::connect(url, pool)
                .await
                .context("Failed to connect to the record store")?;
            let pool = store.pool().clone();
            let store: Arc<dyn RecordStore> = Arc::new(store);
            Ok((store, Some(pool)))
        }
        DatabaseConfig::Memory => {
            info!("Using in-memory record store: records will be lost on shutdown");
            let store: Arc<dyn RecordStore> = Arc::new(InMemoryRecordStore::new());
            Ok((store, None))
        }
    }
}

fn setup_storage(config: &Config) -> anyhow::Result<Arc<dyn ContentStorage>> {
    match &config.storage {
        StorageConfig::Thirdweb {
            secret_key,
            upload_url,
            gateway_url,
        } => {
            let secret_key = secret_key.clone().context("thirdweb storage requires a secret key (THIRDWEB_API_KEY)")?;
            info!(upload_url = %upload_url, gateway_url = %gateway_url, "Using thirdweb IPFS storage");
            Ok(Arc::new(ThirdwebStorage::new(secret_key, upload_url.clone(), gateway_url.clone())))
        }
        StorageConfig::Memory => {
            info!("Using in-memory content storage: content will be lost on shutdown");
            Ok(Arc::new(InMemoryStorage::new()))
        }
    }
}

/// The assembled service.
///
/// 1. **Create**: [`Application::new`] connects the record store (running migrations) and builds
///    the storage client, or [`Application::from_parts`] takes them ready-made
/// 2. **Serve**: [`Application::serve`] binds to the configured address and handles requests
/// 3. **Shutdown**: when the shutdown future resolves, in-flight requests drain and the database
///    pool is closed
pub struct Application {
    router: Router,
    config: Config,
    pool: Option<PgPool>,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        debug!(bind_address = %config.bind_address(), log_format = ?config.log_format, "Starting textpin");

        let (records, pool) = setup_record_store(&config).await?;
        let storage = setup_storage(&config)?;

        let mut app = Self::from_parts(config, storage, records);
        app.pool = pool;
        Ok(app)
    }

    /// Create an application around already constructed dependencies
    pub fn from_parts(config: Config, storage: Arc<dyn ContentStorage>, records: Arc<dyn RecordStore>) -> Self {
        let app_state = AppState::builder().storage(storage).records(records).build();
        let router = build_router(&app_state);

        Self {
            router,
            config,
            pool: None,
        }
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!("textpin listening on http://{}", listener.local_addr()?);

        axum::serve(listener, self.router).with_graceful_shutdown(shutdown).await?;

        if let Some(pool) = self.pool {
            info!("Closing database connections...");
            pool.close().await;
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_utils::create_test_config;
    use serde_json::{Value, json};

    #[tokio::test]
    async fn test_in_memory_application_round_trip() {
        let server = Application::new(create_test_config()).await.unwrap().into_test_server();

        let response = server.post("/store-text").json(&json!({ "text": "hello world" })).await;
        response.assert_status_ok();
        let cid = response.json::<Value>()["cid"].as_str().unwrap().to_string();

        let response = server.get(&format!("/retrieve-text/{cid}")).await;
        response.assert_json(&json!({ "text": "hello world" }));
    }

    #[tokio::test]
    async fn test_healthz() {
        let server = Application::new(create_test_config()).await.unwrap().into_test_server();

        let response = server.get("/healthz").await;
        response.assert_status_ok();
        response.assert_text("OK");
    }

    #[tokio::test]
    async fn test_openapi_document_served() {
        let server = Application::new(create_test_config()).await.unwrap().into_test_server();

        let response = server.get("/api-docs/openapi.json").await;
        response.assert_status_ok();
        let doc: Value = response.json();
        assert!(doc["paths"]["/store-text"]["post"].is_object());
        assert!(doc["paths"]["/retrieve-text/{cid}"]["get"].is_object());

        server.get("/docs").await.assert_status_ok();
    }

    #[tokio::test]
    async fn test_thirdweb_storage_requires_secret_key() {
        let config = Config {
            database: DatabaseConfig::Memory,
            storage: StorageConfig::default(),
            ..Default::default()
        };

        assert!(Application::new(config).await.is_err());
    }

    #[tokio::test]
    async fn test_serve_stops_on_shutdown() {
        let app = Application::new(create_test_config()).await.unwrap();
        app.serve(async {}).await.unwrap();
    }
}
