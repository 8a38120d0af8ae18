//! Database repository for text records.

use sqlx::PgConnection;
use tracing::instrument;

use crate::db::{
    errors::Result,
    models::text_records::{TextRecord, TextRecordCreate},
};

const COLUMNS: &str = "id, cid, text, created_at";

pub struct TextRecords<'c> {
    db: &'c mut PgConnection,
}

impl<'c> TextRecords<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request), fields(cid = %request.cid, text_len = request.text.len()), err)]
    pub async fn create(&mut self, request: &TextRecordCreate) -> Result<TextRecord> {
        let record = sqlx::query_as::<_, TextRecord>(&format!(
            "INSERT INTO text_records (cid, text) VALUES ($1, $2) RETURNING {COLUMNS}"
        ))
        .bind(&request.cid)
        .bind(&request.text)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(record)
    }

    /// Most recent record stored under `cid`. Several records may share a CID when the same
    /// text is stored more than once.
    #[instrument(skip(self), err)]
    pub async fn get_by_cid(&mut self, cid: &str) -> Result<Option<TextRecord>> {
        let record = sqlx::query_as::<_, TextRecord>(&format!(
            "SELECT {COLUMNS} FROM text_records WHERE cid = $1 ORDER BY created_at DESC, id DESC LIMIT 1"
        ))
        .bind(cid)
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(record)
    }

    #[cfg(test)]
    #[instrument(skip(self), err)]
    pub async fn count_by_cid(&mut self, cid: &str) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM text_records WHERE cid = $1")
            .bind(cid)
            .fetch_one(&mut *self.db)
            .await?;

        Ok(count)
    }
}
