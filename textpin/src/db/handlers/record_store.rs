use crate::config::PoolSettings;
use crate::db::{
    errors::Result,
    handlers::text_records::TextRecords,
    models::text_records::{TextRecord, TextRecordCreate},
};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::sync::atomic::{AtomicI64, Ordering};

/// Trait for record store backends
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Persist a new record pairing a CID with its text
    async fn insert(&self, request: &TextRecordCreate) -> Result<TextRecord>;

    /// Look up the record stored under `cid`, if any
    async fn find_by_cid(&self, cid: &str) -> Result<Option<TextRecord>>;
}

// ============================================================================
// PostgreSQL Implementation
// ============================================================================

/// PostgreSQL record store, sharing one pool across all requests
#[derive(Clone)]
pub struct PostgresRecordStore {
    pool: PgPool,
}

impl PostgresRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect with the given pool settings and bring the schema up to date
    pub async fn connect(url: &str, settings: &PoolSettings) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .min_connections(settings.min_connections)
            .acquire_timeout(settings.acquire_timeout())
            .idle_timeout(settings.idle_timeout())
            .max_lifetime(settings.max_lifetime())
            .connect(url)
            .await?;

        crate::migrator().run(&pool).await?;
        tracing::debug!("Record store migrations applied");

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl RecordStore for PostgresRecordStore {
    async fn insert(&self, request: &TextRecordCreate) -> Result<TextRecord> {
        let mut conn = self.pool.acquire().await?;
        TextRecords::new(&mut conn).create(request).await
    }

    async fn find_by_cid(&self, cid: &str) -> Result<Option<TextRecord>> {
        let mut conn = self.pool.acquire().await?;
        TextRecords::new(&mut conn).get_by_cid(cid).await
    }
}

// ============================================================================
// In-Memory Implementation
// ============================================================================

/// Process-local record store. Useful for development and testing; records are lost on restart.
#[derive(Default)]
pub struct InMemoryRecordStore {
    records: DashMap<String, Vec<TextRecord>>,
    next_id: AtomicI64,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of records held
    pub fn len(&self) -> usize {
        self.records.iter().map(|entry| entry.value().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn insert(&self, request: &TextRecordCreate) -> Result<TextRecord> {
        let record = TextRecord {
            id: self.next_id.fetch_add(1, Ordering::Relaxed) + 1,
            cid: request.cid.clone(),
            text: request.text.clone(),
            created_at: Utc::now(),
        };

        self.records.entry(request.cid.clone()).or_default().push(record.clone());
        Ok(record)
    }

    async fn find_by_cid(&self, cid: &str) -> Result<Option<TextRecord>> {
        Ok(self.records.get(cid).and_then(|records| records.last().cloned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_request(cid: &str, text: &str) -> TextRecordCreate {
        TextRecordCreate {
            cid: cid.to_string(),
            text: text.to_string(),
        }
    }

    #[tokio::test]
    async fn test_in_memory_insert_and_find() {
        let store = InMemoryRecordStore::new();
        assert!(store.is_empty());

        let created = store.insert(&create_request("bafyhello/0", "hello world")).await.unwrap();
        assert_eq!(created.id, 1);

        let found = store.find_by_cid("bafyhello/0").await.unwrap().unwrap();
        assert_eq!(found, created);
        assert!(store.find_by_cid("does-not-exist").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_in_memory_duplicates_keep_both_records() {
        let store = InMemoryRecordStore::new();

        store.insert(&create_request("bafysame/0", "first")).await.unwrap();
        let second = store.insert(&create_request("bafysame/0", "second")).await.unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.find_by_cid("bafysame/0").await.unwrap().unwrap(), second);
    }

    #[sqlx::test]
    async fn test_postgres_store_round_trip(pool: PgPool) {
        let store = PostgresRecordStore::new(pool);

        let created = store.insert(&create_request("bafyhello/0", "hello world")).await.unwrap();
        let found = store.find_by_cid("bafyhello/0").await.unwrap().unwrap();

        assert_eq!(found, created);
        assert!(store.find_by_cid("does-not-exist").await.unwrap().is_none());
    }
}
