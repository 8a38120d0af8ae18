//! Record store backends and the repository they use.
//!
//! - [`RecordStore`]: the seam handlers depend on
//! - [`PostgresRecordStore`]: production backend over a shared `PgPool`
//! - [`InMemoryRecordStore`]: process-local backend for development and tests
//! - [`TextRecords`]: query layer over a single Postgres connection

pub mod record_store;
pub mod text_records;

pub use record_store::{InMemoryRecordStore, PostgresRecordStore, RecordStore};
pub use text_records::TextRecords;
