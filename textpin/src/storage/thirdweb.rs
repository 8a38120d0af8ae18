//! IPFS storage through the thirdweb storage service.
//!
//! Uploads go to the pinning endpoint as a multipart form, one `file` part per payload, wrapped
//! in a directory. The response carries the directory hash, so the identifier for payload `i`
//! is `<hash>/<i>`. Downloads resolve identifiers against the IPFS gateway.
//!
//! No request timeout is set: a stalled upload or download holds its request open.

use super::{ContentId, ContentStorage, DownloadedContent, StorageError, StoragePayload};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use url::Url;

const SECRET_KEY_HEADER: &str = "x-secret-key";
const IPFS_SCHEME: &str = "ipfs://";

#[derive(Debug, Deserialize)]
struct UploadResponse {
    #[serde(rename = "IpfsHash")]
    ipfs_hash: Option<String>,
}

#[derive(Clone)]
pub struct ThirdwebStorage {
    client: reqwest::Client,
    secret_key: String,
    upload_url: Url,
    gateway_url: Url,
}

impl ThirdwebStorage {
    pub fn new(secret_key: impl Into<String>, upload_url: Url, gateway_url: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            secret_key: secret_key.into(),
            upload_url,
            gateway_url,
        }
    }

    /// Gateway URL for an identifier; an `ipfs://` prefix is accepted
    fn download_url(&self, cid: &ContentId) -> Result<Url, StorageError> {
        let path = cid.as_str().strip_prefix(IPFS_SCHEME).unwrap_or(cid.as_str());
        let base = self.gateway_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}/ipfs/{}", path.trim_start_matches('/')))?)
    }

    async fn error_for_status(response: reqwest::Response) -> Result<reqwest::Response, StorageError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(StorageError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl ContentStorage for ThirdwebStorage {
    #[tracing::instrument(skip(self, payloads), fields(count = payloads.len(), url = %self.upload_url), err)]
    async fn upload(&self, payloads: Vec<StoragePayload>) -> Result<Vec<ContentId>, StorageError> {
        if payloads.is_empty() {
            return Ok(Vec::new());
        }

        let count = payloads.len();
        let mut form = Form::new();
        for (index, payload) in payloads.into_iter().enumerate() {
            let part = Part::bytes(payload.content.to_vec())
                .file_name(format!("files/{index}"))
                .mime_str(&payload.content_type)?;
            form = form.part("file", part);
        }
        let form = form
            .text("pinataOptions", r#"{"wrapWithDirectory":true}"#)
            .text("pinataMetadata", r#"{"name":"textpin","keyvalues":{}}"#);

        let response = self
            .client
            .post(self.upload_url.clone())
            .header(SECRET_KEY_HEADER, &self.secret_key)
            .multipart(form)
            .send()
            .await?;
        let response = Self::error_for_status(response).await?;

        let body: UploadResponse = response.json().await?;
        let hash = body.ipfs_hash.filter(|hash| !hash.is_empty()).ok_or(StorageError::MissingHash)?;
        tracing::debug!(hash = %hash, "Uploaded to IPFS");

        Ok((0..count).map(|index| ContentId::new(format!("{hash}/{index}"))).collect())
    }

    #[tracing::instrument(skip(self), fields(cid = %cid), err)]
    async fn download(&self, cid: &ContentId) -> Result<DownloadedContent, StorageError> {
        let url = self.download_url(cid)?;
        tracing::debug!(url = %url, "Downloading from IPFS gateway");

        let response = self
            .client
            .get(url)
            .header(SECRET_KEY_HEADER, &self.secret_key)
            .send()
            .await?;
        let response = Self::error_for_status(response).await?;

        Ok(DownloadedContent::new(response.bytes().await?))
    }
}
