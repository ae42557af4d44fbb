use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::domain::StorageKey;

/// Time-limited grant to read or write exactly one object.
#[derive(Debug, Clone)]
pub struct SignedUrl {
    pub url: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantMode {
    Upload,
    Download,
}

/// Durable blob storage keyed by opaque paths. The store that issues a
/// grant is also the one that resolves it when the signed URL is hit.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    async fn put(
        &self,
        key: &StorageKey,
        data: Bytes,
        content_type: &str,
    ) -> Result<(), ArtifactStoreError>;

    async fn fetch(&self, key: &StorageKey) -> Result<Vec<u8>, ArtifactStoreError>;

    async fn content_type(&self, key: &StorageKey) -> Result<String, ArtifactStoreError>;

    async fn signed_upload_url(
        &self,
        key: &StorageKey,
        ttl: Duration,
    ) -> Result<SignedUrl, ArtifactStoreError>;

    async fn signed_download_url(
        &self,
        key: &StorageKey,
        ttl: Duration,
    ) -> Result<SignedUrl, ArtifactStoreError>;

    /// Resolve a grant token back to its storage key. Expired tokens and
    /// tokens issued for the other mode are rejected.
    async fn resolve_grant(
        &self,
        token: Uuid,
        mode: GrantMode,
    ) -> Result<StorageKey, ArtifactStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ArtifactStoreError {
    #[error("upload failed: {0}")]
    UploadFailed(String),
    #[error("object not found: {0}")]
    NotFound(String),
    #[error("download failed: {0}")]
    DownloadFailed(String),
    #[error("grant unavailable: {0}")]
    GrantUnavailable(String),
    #[error("grant expired or unknown")]
    GrantRejected,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
