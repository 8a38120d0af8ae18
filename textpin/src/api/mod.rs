//! API layer for HTTP request handling and data models.
//!
//! - **[`handlers`]**: Axum route handlers
//! - **[`models`]**: Request/response data structures
//!
//! # Routes
//!
//! - `POST /store-text`: upload text, returns its content identifier
//! - `GET /retrieve-text/{cid}`: fetch text previously stored under `cid`
//!
//! Every failure is answered with a JSON `{"error": "..."}` body, see [`crate::errors::Error`].
//! OpenAPI documentation is served at `/docs`.

pub mod handlers;
pub mod models;
