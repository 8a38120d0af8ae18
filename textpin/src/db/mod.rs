//! Record store: persistence of CID -> text records.
//!
//! ```text
//! ┌──────────────┐
//! │   Handlers   │  (API request handlers)
//! └──────┬───────┘
//!        │  Arc<dyn RecordStore>
//!        ↓
//! ┌──────────────┐
//! │ RecordStore  │  (db::handlers::record_store - Postgres or in-memory)
//! └──────┬───────┘
//!        │
//!        ↓
//! ┌──────────────┐
//! │ Repositories │  (db::handlers::text_records - queries)
//! └──────┬───────┘
//!        │
//!        ↓
//! ┌──────────────┐
//! │  PostgreSQL  │
//! └──────────────┘
//! ```
//!
//! Records are immutable: there is no update or delete path. Migrations live in `migrations/`
//! and are applied by [`crate::migrator`] when the Postgres store connects.

pub mod errors;
pub mod handlers;
pub mod models;
