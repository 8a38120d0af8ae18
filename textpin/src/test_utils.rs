//! Test utilities: app construction and storage/record store doubles.

use crate::config::{Config, DatabaseConfig, StorageConfig};
use crate::db::{
    errors::{DbError, Result as DbResult},
    handlers::{InMemoryRecordStore, RecordStore},
    models::text_records::{TextRecord, TextRecordCreate},
};
use crate::storage::{ContentId, ContentStorage, DownloadedContent, InMemoryStorage, StorageError, StoragePayload};
use crate::{AppState, build_router};
use async_trait::async_trait;
use axum_test::TestServer;
use bytes::Bytes;
use std::sync::Arc;

pub fn create_test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        database: DatabaseConfig::Memory,
        storage: StorageConfig::Memory,
        ..Default::default()
    }
}

pub fn create_test_app(storage: Arc<dyn ContentStorage>, records: Arc<dyn RecordStore>) -> TestServer {
    let state = AppState::builder().storage(storage).records(records).build();
    TestServer::new(build_router(&state)).expect("Failed to create test server")
}

/// App backed by in-memory storage and records, returned alongside both for inspection
pub fn create_in_memory_app() -> (TestServer, Arc<InMemoryStorage>, Arc<InMemoryRecordStore>) {
    let storage = Arc::new(InMemoryStorage::new());
    let records = Arc::new(InMemoryRecordStore::new());
    let server = create_test_app(storage.clone(), records.clone());
    (server, storage, records)
}

/// Upload succeeds but yields no identifiers
pub struct EmptyUploadStorage;

#[async_trait]
impl ContentStorage for EmptyUploadStorage {
    async fn upload(&self, _payloads: Vec<StoragePayload>) -> Result<Vec<ContentId>, StorageError> {
        Ok(Vec::new())
    }

    async fn download(&self, cid: &ContentId) -> Result<DownloadedContent, StorageError> {
        Err(StorageError::NotFound(cid.to_string()))
    }
}

/// Every call fails as if the storage service were down
pub struct UnavailableStorage;

#[async_trait]
impl ContentStorage for UnavailableStorage {
    async fn upload(&self, _payloads: Vec<StoragePayload>) -> Result<Vec<ContentId>, StorageError> {
        Err(StorageError::Status {
            status: 503,
            body: "service unavailable".to_string(),
        })
    }

    async fn download(&self, _cid: &ContentId) -> Result<DownloadedContent, StorageError> {
        Err(StorageError::Status {
            status: 503,
            body: "service unavailable".to_string(),
        })
    }
}

/// Serves the same content for any identifier
pub struct StaticContentStorage {
    content: Bytes,
}

impl StaticContentStorage {
    pub fn new(content: impl Into<Bytes>) -> Self {
        Self { content: content.into() }
    }
}

#[async_trait]
impl ContentStorage for StaticContentStorage {
    async fn upload(&self, payloads: Vec<StoragePayload>) -> Result<Vec<ContentId>, StorageError> {
        Ok((0..payloads.len()).map(|index| ContentId::new(format!("QmStatic/{index}"))).collect())
    }

    async fn download(&self, _cid: &ContentId) -> Result<DownloadedContent, StorageError> {
        Ok(DownloadedContent::new(self.content.clone()))
    }
}

/// Every call fails as if the database were unreachable
pub struct UnavailableRecordStore;

#[async_trait]
impl RecordStore for UnavailableRecordStore {
    async fn insert(&self, _request: &TextRecordCreate) -> DbResult<TextRecord> {
        Err(DbError::Other(anyhow::anyhow!("connection refused")))
    }

    async fn find_by_cid(&self, _cid: &str) -> DbResult<Option<TextRecord>> {
        Err(DbError::Other(anyhow::anyhow!("connection refused")))
    }
}
