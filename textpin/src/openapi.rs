//! OpenAPI documentation for the HTTP API, served as JSON at `/api-docs/openapi.json` and as a
//! browsable reference at `/docs`.

use utoipa::OpenApi;

use crate::api::handlers::texts;
use crate::api::models::texts::{ErrorResponse, RetrieveTextResponse, StoreTextRequest, StoreTextResponse};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "textpin",
        description = "Store text on IPFS and retrieve it by content identifier"
    ),
    paths(texts::store_text, texts::retrieve_text),
    components(schemas(StoreTextRequest, StoreTextResponse, RetrieveTextResponse, ErrorResponse)),
    tags((name = "texts", description = "Text storage and retrieval"))
)]
pub struct ApiDoc;
