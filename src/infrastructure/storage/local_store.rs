use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Duration, Utc};
use object_store::local::LocalFileSystem;
use object_store::path::Path as StorePath;
use object_store::{ObjectStore, PutPayload};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::application::ports::{
    ArtifactStore, ArtifactStoreError, GrantMode, SignedUrl,
};
use crate::domain::StorageKey;

struct Grant {
    key: StorageKey,
    mode: GrantMode,
    expires_at: DateTime<Utc>,
}

/// Filesystem-backed artifact store for local deployments. Signed URLs are
/// modelled as single-purpose expiring tokens served by this process under
/// `/artifacts/{token}`, standing in for the external store's signed URLs.
pub struct LocalArtifactStore {
    inner: Arc<LocalFileSystem>,
    base_url: String,
    grants: RwLock<HashMap<Uuid, Grant>>,
    content_types: RwLock<HashMap<String, String>>,
}

impl LocalArtifactStore {
    pub fn new(base_path: PathBuf, base_url: String) -> Result<Self, ArtifactStoreError> {
        std::fs::create_dir_all(&base_path).map_err(ArtifactStoreError::Io)?;
        let fs = LocalFileSystem::new_with_prefix(base_path)
            .map_err(|e| ArtifactStoreError::UploadFailed(e.to_string()))?;
        Ok(Self {
            inner: Arc::new(fs),
            base_url: base_url.trim_end_matches('/').to_string(),
            grants: RwLock::new(HashMap::new()),
            content_types: RwLock::new(HashMap::new()),
        })
    }

    async fn issue_grant(
        &self,
        key: &StorageKey,
        mode: GrantMode,
        ttl: Duration,
    ) -> SignedUrl {
        let token = Uuid::new_v4();
        let expires_at = Utc::now() + ttl;
        self.grants.write().await.insert(
            token,
            Grant {
                key: key.clone(),
                mode,
                expires_at,
            },
        );
        SignedUrl {
            url: format!("{}/artifacts/{}", self.base_url, token),
            expires_at,
        }
    }
}

#[async_trait]
impl ArtifactStore for LocalArtifactStore {
    async fn put(
        &self,
        key: &StorageKey,
        data: Bytes,
        content_type: &str,
    ) -> Result<(), ArtifactStoreError> {
        let store_path = StorePath::from(key.as_str());
        self.inner
            .put(&store_path, PutPayload::from(data))
            .await
            .map_err(|e| ArtifactStoreError::UploadFailed(e.to_string()))?;
        self.content_types
            .write()
            .await
            .insert(key.as_str().to_string(), content_type.to_string());
        Ok(())
    }

    async fn fetch(&self, key: &StorageKey) -> Result<Vec<u8>, ArtifactStoreError> {
        let store_path = StorePath::from(key.as_str());
        let result = self
            .inner
            .get(&store_path)
            .await
            .map_err(|e| ArtifactStoreError::NotFound(e.to_string()))?;

        let bytes = result
            .bytes()
            .await
            .map_err(|e| ArtifactStoreError::DownloadFailed(e.to_string()))?;

        Ok(bytes.to_vec())
    }

    async fn content_type(&self, key: &StorageKey) -> Result<String, ArtifactStoreError> {
        Ok(self
            .content_types
            .read()
            .await
            .get(key.as_str())
            .cloned()
            .unwrap_or_else(|| "application/octet-stream".to_string()))
    }

    async fn signed_upload_url(
        &self,
        key: &StorageKey,
        ttl: Duration,
    ) -> Result<SignedUrl, ArtifactStoreError> {
        Ok(self.issue_grant(key, GrantMode::Upload, ttl).await)
    }

    async fn signed_download_url(
        &self,
        key: &StorageKey,
        ttl: Duration,
    ) -> Result<SignedUrl, ArtifactStoreError> {
        let store_path = StorePath::from(key.as_str());
        self.inner
            .head(&store_path)
            .await
            .map_err(|e| ArtifactStoreError::NotFound(e.to_string()))?;
        Ok(self.issue_grant(key, GrantMode::Download, ttl).await)
    }

    async fn resolve_grant(
        &self,
        token: Uuid,
        mode: GrantMode,
    ) -> Result<StorageKey, ArtifactStoreError> {
        let mut grants = self.grants.write().await;
        let Some(grant) = grants.get(&token) else {
            return Err(ArtifactStoreError::GrantRejected);
        };
        if grant.mode != mode {
            return Err(ArtifactStoreError::GrantRejected);
        }
        if grant.expires_at < Utc::now() {
            grants.remove(&token);
            return Err(ArtifactStoreError::GrantRejected);
        }
        Ok(grant.key.clone())
    }
}
