//! Content storage: the content-addressed network text is uploaded to.
//!
//! Handlers talk to storage through the [`ContentStorage`] trait so the backend can be swapped:
//!
//! - [`ThirdwebStorage`]: IPFS via the thirdweb storage service (production)
//! - [`InMemoryStorage`]: SHA-256 addressed map (development and tests)
//!
//! The service never generates identifiers itself; it only passes on what `upload` returns.

pub mod in_memory;
pub mod thirdweb;

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub use in_memory::InMemoryStorage;
pub use thirdweb::ThirdwebStorage;

/// Identifier returned by the storage network for uploaded content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentId(String);

impl ContentId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single item handed to [`ContentStorage::upload`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoragePayload {
    pub content: Bytes,
    pub content_type: String,
}

impl StoragePayload {
    /// Wrap UTF-8 text as a `text/plain` payload
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: Bytes::from(text.into()),
            content_type: "text/plain; charset=utf-8".to_string(),
        }
    }
}

/// Raw content fetched by [`ContentStorage::download`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedContent {
    bytes: Bytes,
}

impl DownloadedContent {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self { bytes: bytes.into() }
    }

    /// Interpret the content as UTF-8 text
    pub fn text(self) -> Result<String, StorageError> {
        Ok(String::from_utf8(self.bytes.to_vec())?)
    }
}

/// Errors raised by storage backends
#[derive(Debug, Error)]
pub enum StorageError {
    /// Transport-level failure talking to the storage service
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Storage service answered with a non-success status
    #[error("Storage service returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Upload succeeded but the response carried no hash
    #[error("Upload response did not contain an IPFS hash")]
    MissingHash,

    /// Upload produced no identifiers at all
    #[error("Upload returned no content identifiers")]
    NoIdentifiers,

    /// Nothing is stored under the identifier
    #[error("Content not found: {0}")]
    NotFound(String),

    /// Downloaded content is not valid UTF-8
    #[error("Content is not valid UTF-8 text: {0}")]
    Decode(#[from] std::string::FromUtf8Error),

    /// Identifier could not be turned into a gateway URL
    #[error("Invalid storage URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Trait for content-addressed storage backends
#[async_trait]
pub trait ContentStorage: Send + Sync {
    /// Upload payloads, returning one identifier per payload in order
    async fn upload(&self, payloads: Vec<StoragePayload>) -> Result<Vec<ContentId>, StorageError>;

    /// Fetch the content stored under `cid`
    async fn download(&self, cid: &ContentId) -> Result<DownloadedContent, StorageError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_payload() {
        let payload = StoragePayload::text("hello world");
        assert_eq!(payload.content, Bytes::from_static(b"hello world"));
        assert!(payload.content_type.starts_with("text/plain"));
    }

    #[test]
    fn test_downloaded_text_decoding() {
        assert_eq!(DownloadedContent::new("héllo").text().unwrap(), "héllo");

        let err = DownloadedContent::new(vec![0xff, 0xfe, 0xfd]).text().unwrap_err();
        assert!(matches!(err, StorageError::Decode(_)));
    }

    #[test]
    fn test_content_id_serializes_as_string() {
        let cid = ContentId::new("QmHash/0");
        assert_eq!(serde_json::to_string(&cid).unwrap(), "\"QmHash/0\"");
        assert_eq!(cid.to_string(), "QmHash/0");
    }
}
