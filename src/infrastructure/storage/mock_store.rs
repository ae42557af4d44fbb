use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::application::ports::{
    ArtifactStore, ArtifactStoreError, GrantMode, SignedUrl,
};
use crate::domain::StorageKey;

struct MockGrant {
    key: StorageKey,
    mode: GrantMode,
    expires_at: DateTime<Utc>,
}

/// In-memory artifact store for tests. `fail_grants` and `fail_fetch`
/// simulate an unavailable external store.
#[derive(Default)]
pub struct InMemoryArtifactStore {
    objects: RwLock<HashMap<String, (Vec<u8>, String)>>,
    grants: RwLock<HashMap<Uuid, MockGrant>>,
    fail_grants: AtomicBool,
    fail_fetch: AtomicBool,
}

impl InMemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_grants(&self, fail: bool) {
        self.fail_grants.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_fetch(&self, fail: bool) {
        self.fail_fetch.store(fail, Ordering::SeqCst);
    }

    pub async fn contains(&self, key: &StorageKey) -> bool {
        self.objects.read().await.contains_key(key.as_str())
    }
}

#[async_trait]
impl ArtifactStore for InMemoryArtifactStore {
    async fn put(
        &self,
        key: &StorageKey,
        data: Bytes,
        content_type: &str,
    ) -> Result<(), ArtifactStoreError> {
        self.objects.write().await.insert(
            key.as_str().to_string(),
            (data.to_vec(), content_type.to_string()),
        );
        Ok(())
    }

    async fn fetch(&self, key: &StorageKey) -> Result<Vec<u8>, ArtifactStoreError> {
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(ArtifactStoreError::DownloadFailed(
                "simulated outage".to_string(),
            ));
        }
        self.objects
            .read()
            .await
            .get(key.as_str())
            .map(|(data, _)| data.clone())
            .ok_or_else(|| ArtifactStoreError::NotFound(key.to_string()))
    }

    async fn content_type(&self, key: &StorageKey) -> Result<String, ArtifactStoreError> {
        self.objects
            .read()
            .await
            .get(key.as_str())
            .map(|(_, ct)| ct.clone())
            .ok_or_else(|| ArtifactStoreError::NotFound(key.to_string()))
    }

    async fn signed_upload_url(
        &self,
        key: &StorageKey,
        ttl: Duration,
    ) -> Result<SignedUrl, ArtifactStoreError> {
        if self.fail_grants.load(Ordering::SeqCst) {
            return Err(ArtifactStoreError::GrantUnavailable(
                "simulated outage".to_string(),
            ));
        }
        let token = Uuid::new_v4();
        let expires_at = Utc::now() + ttl;
        self.grants.write().await.insert(
            token,
            MockGrant {
                key: key.clone(),
                mode: GrantMode::Upload,
                expires_at,
            },
        );
        Ok(SignedUrl {
            url: format!("/artifacts/{}", token),
            expires_at,
        })
    }

    async fn signed_download_url(
        &self,
        key: &StorageKey,
        ttl: Duration,
    ) -> Result<SignedUrl, ArtifactStoreError> {
        if self.fail_grants.load(Ordering::SeqCst) {
            return Err(ArtifactStoreError::GrantUnavailable(
                "simulated outage".to_string(),
            ));
        }
        let token = Uuid::new_v4();
        let expires_at = Utc::now() + ttl;
        self.grants.write().await.insert(
            token,
            MockGrant {
                key: key.clone(),
                mode: GrantMode::Download,
                expires_at,
            },
        );
        Ok(SignedUrl {
            url: format!("/artifacts/{}", token),
            expires_at,
        })
    }

    async fn resolve_grant(
        &self,
        token: Uuid,
        mode: GrantMode,
    ) -> Result<StorageKey, ArtifactStoreError> {
        let grants = self.grants.read().await;
        match grants.get(&token) {
            Some(grant)
                if grant.mode == mode && grant.expires_at >= Utc::now() =>
            {
                Ok(grant.key.clone())
            }
            _ => Err(ArtifactStoreError::GrantRejected),
        }
    }
}
