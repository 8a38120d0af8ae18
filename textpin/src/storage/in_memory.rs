//! In-memory content-addressed storage.
//!
//! Identifiers are the hex SHA-256 of the content, so uploading the same bytes twice yields the
//! same identifier. Content is lost on restart.

use super::{ContentId, ContentStorage, DownloadedContent, StorageError, StoragePayload};
use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use sha2::{Digest, Sha256};

#[derive(Default)]
pub struct InMemoryStorage {
    objects: DashMap<String, Bytes>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct objects held
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[async_trait]
impl ContentStorage for InMemoryStorage {
    async fn upload(&self, payloads: Vec<StoragePayload>) -> Result<Vec<ContentId>, StorageError> {
        Ok(payloads
            .into_iter()
            .map(|payload| {
                let cid = format!("{:x}", Sha256::digest(&payload.content));
                self.objects.insert(cid.clone(), payload.content);
                ContentId::new(cid)
            })
            .collect())
    }

    async fn download(&self, cid: &ContentId) -> Result<DownloadedContent, StorageError> {
        self.objects
            .get(cid.as_str())
            .map(|content| DownloadedContent::new(content.value().clone()))
            .ok_or_else(|| StorageError::NotFound(cid.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upload_then_download() {
        let storage = InMemoryStorage::new();

        let cids = storage.upload(vec![StoragePayload::text("hello world")]).await.unwrap();
        assert_eq!(cids.len(), 1);
        // sha256("hello world")
        assert_eq!(
            cids[0].as_str(),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );

        let content = storage.download(&cids[0]).await.unwrap();
        assert_eq!(content.text().unwrap(), "hello world");
    }

    #[tokio::test]
    async fn test_identical_content_shares_identifier() {
        let storage = InMemoryStorage::new();

        let first = storage.upload(vec![StoragePayload::text("same")]).await.unwrap();
        let second = storage.upload(vec![StoragePayload::text("same")]).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(storage.len(), 1);
    }

    #[tokio::test]
    async fn test_download_unknown_identifier() {
        let storage = InMemoryStorage::new();
        assert!(storage.is_empty());

        let err = storage.download(&ContentId::new("does-not-exist")).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(cid) if cid == "does-not-exist"));
    }
}
