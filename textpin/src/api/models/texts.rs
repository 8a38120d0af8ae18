//! Request and response bodies for the text endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body of `POST /store-text`
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct StoreTextRequest {
    /// Text to upload. Required and non-empty.
    #[schema(example = "hello world")]
    pub text: Option<String>,
}

/// Returned by `POST /store-text`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StoreTextResponse {
    /// Content identifier the text was stored under
    pub cid: String,
}

/// Returned by `GET /retrieve-text/{cid}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RetrieveTextResponse {
    pub text: String,
}

/// Body of every error response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    #[schema(example = "Text data is required.")]
    pub error: String,
}
