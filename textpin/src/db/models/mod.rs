//! Database record structures matching table schemas.

pub mod text_records;
