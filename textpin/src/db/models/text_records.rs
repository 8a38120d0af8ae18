//! Database models for text records.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database entity model: one uploaded text and the CID it was stored under
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct TextRecord {
    pub id: i64,
    pub cid: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Request for creating a text record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRecordCreate {
    pub cid: String,
    pub text: String,
}
