//! HTTP handlers for storing and retrieving text.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use tracing::{info, warn};

use crate::{
    AppState,
    api::models::texts::{ErrorResponse, RetrieveTextResponse, StoreTextRequest, StoreTextResponse},
    db::models::text_records::TextRecordCreate,
    errors::{Error, Result},
    storage::{ContentId, StorageError, StoragePayload},
};

const TEXT_REQUIRED: &str = "Text data is required.";

#[utoipa::path(
    post,
    path = "/store-text",
    tag = "texts",
    summary = "Store text",
    description = "Upload text to IPFS and record the content identifier it was stored under",
    request_body = StoreTextRequest,
    responses(
        (status = 200, description = "Text stored", body = StoreTextResponse),
        (status = 400, description = "Text missing or empty", body = ErrorResponse),
        (status = 413, description = "Request body exceeds the size limit", body = ErrorResponse),
        (status = 500, description = "Upload or persistence failed", body = ErrorResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn store_text(
    State(state): State<AppState>,
    payload: std::result::Result<Json<StoreTextRequest>, JsonRejection>,
) -> Result<Json<StoreTextResponse>> {
    let Json(request) = payload.map_err(|rejection| {
        // An oversized body still carries text, so it is not reported as missing
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Error::PayloadTooLarge {
                message: rejection.body_text(),
            }
        } else {
            Error::Validation {
                message: format!("{TEXT_REQUIRED} {}", rejection.body_text()),
            }
        }
    })?;

    let text = request.text.filter(|text| !text.is_empty()).ok_or_else(|| Error::Validation {
        message: TEXT_REQUIRED.to_string(),
    })?;

    let cid = state
        .storage
        .upload(vec![StoragePayload::text(text.clone())])
        .await
        .map_err(Error::Upload)?
        .into_iter()
        .next()
        .ok_or(Error::Upload(StorageError::NoIdentifiers))?;

    let record = TextRecordCreate {
        cid: cid.to_string(),
        text,
    };
    state.records.insert(&record).await.map_err(|source| {
        // The upload is not rolled back; the content stays on IPFS without a record
        warn!(cid = %cid, "Content uploaded but its record could not be saved");
        Error::Persistence {
            cid: cid.to_string(),
            source,
        }
    })?;

    info!(cid = %cid, "Stored text");
    Ok(Json(StoreTextResponse { cid: cid.into_inner() }))
}

#[utoipa::path(
    get,
    path = "/retrieve-text/{cid}",
    tag = "texts",
    summary = "Retrieve text",
    description = "Download the text stored under a content identifier",
    params(
        ("cid" = String, Path, description = "Content identifier returned by /store-text"),
    ),
    responses(
        (status = 200, description = "Text found", body = RetrieveTextResponse),
        (status = 404, description = "No record for this identifier", body = ErrorResponse),
        (status = 500, description = "Lookup, download or decoding failed", body = ErrorResponse),
    )
)]
#[tracing::instrument(skip(state))]
pub async fn retrieve_text(State(state): State<AppState>, Path(cid): Path<String>) -> Result<Json<RetrieveTextResponse>> {
    let record = state.records.find_by_cid(&cid).await.map_err(|source| Error::Retrieval {
        cid: cid.clone(),
        source: source.into(),
    })?;

    if record.is_none() {
        return Err(Error::NotFound { cid });
    }

    let cid = ContentId::new(cid);
    let text = match state.storage.download(&cid).await.and_then(|content| content.text()) {
        Ok(text) => text,
        Err(source) => {
            return Err(Error::Retrieval {
                cid: cid.into_inner(),
                source: source.into(),
            });
        }
    };

    Ok(Json(RetrieveTextResponse { text }))
}
