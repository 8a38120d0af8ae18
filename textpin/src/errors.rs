use crate::api::models::texts::ErrorResponse;
use crate::db::errors::DbError;
use crate::storage::StorageError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum Error {
    /// Missing or malformed client input
    #[error("{message}")]
    Validation { message: String },

    /// Request body exceeded the size limit
    #[error("Request body too large: {message}")]
    PayloadTooLarge { message: String },

    /// No record exists for the requested content identifier
    #[error("No record for content identifier {cid}")]
    NotFound { cid: String },

    /// Uploading to the content storage failed or produced no identifier
    #[error("Failed to upload text to content storage")]
    Upload(#[source] StorageError),

    /// Content was uploaded but the record could not be saved
    #[error("Failed to persist record for {cid}")]
    Persistence {
        cid: String,
        #[source]
        source: DbError,
    },

    /// Looking up, downloading or decoding the content failed
    #[error("Failed to retrieve content for {cid}")]
    Retrieval {
        cid: String,
        #[source]
        source: anyhow::Error,
    },
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Validation { .. } => StatusCode::BAD_REQUEST,
            Error::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::Upload(_) | Error::Persistence { .. } | Error::Retrieval { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a user-safe error message, without leaking internal implementation details
    pub fn user_message(&self) -> String {
        match self {
            Error::Validation { message } => message.clone(),
            Error::PayloadTooLarge { .. } => "Text data is too large.".to_string(),
            Error::NotFound { .. } => "Data not found for the provided IPFS hash.".to_string(),
            Error::Upload(_) | Error::Persistence { .. } => "Failed to store data on IPFS.".to_string(),
            Error::Retrieval { .. } => "Failed to retrieve data.".to_string(),
        }
    }

    /// Full cause chain, for logs only
    fn chain(&self) -> String {
        let mut out = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            out.push_str(": ");
            out.push_str(&cause.to_string());
            source = cause.source();
        }
        out
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match &self {
            Error::Upload(_) | Error::Persistence { .. } | Error::Retrieval { .. } => {
                tracing::error!("Internal service error: {}", self.chain());
            }
            Error::Validation { .. } | Error::PayloadTooLarge { .. } | Error::NotFound { .. } => {
                tracing::debug!("Client error: {}", self);
            }
        }

        let body = ErrorResponse {
            error: self.user_message(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}

/// Type alias for service operation results
pub type Result<T> = std::result::Result<T, Error>;
