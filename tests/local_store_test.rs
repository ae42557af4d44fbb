use bytes::Bytes;
use chrono::Duration;
use uuid::Uuid;

use spikelab::application::ports::{ArtifactStore, ArtifactStoreError, GrantMode};
use spikelab::domain::{JobId, OwnerId, StorageKey};
use spikelab::infrastructure::storage::LocalArtifactStore;

fn store() -> (tempfile::TempDir, LocalArtifactStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalArtifactStore::new(
        dir.path().to_path_buf(),
        "http://localhost:3000".to_string(),
    )
    .unwrap();
    (dir, store)
}

#[tokio::test]
async fn given_stored_object_when_fetching_then_bytes_and_content_type_round_trip() {
    let (_dir, store) = store();
    let key = StorageKey::raw(OwnerId::new(), JobId::new());

    store
        .put(&key, Bytes::from_static(b"frame data"), "video/webm")
        .await
        .unwrap();

    assert_eq!(store.fetch(&key).await.unwrap(), b"frame data");
    assert_eq!(store.content_type(&key).await.unwrap(), "video/webm");
}

#[tokio::test]
async fn given_missing_object_when_fetching_then_not_found() {
    let (_dir, store) = store();
    let key = StorageKey::overlay(JobId::new());
    assert!(matches!(
        store.fetch(&key).await,
        Err(ArtifactStoreError::NotFound(_))
    ));
}

#[tokio::test]
async fn given_upload_grant_when_resolving_then_key_returned() {
    let (_dir, store) = store();
    let key = StorageKey::raw(OwnerId::new(), JobId::new());

    let signed = store
        .signed_upload_url(&key, Duration::minutes(15))
        .await
        .unwrap();
    let token: Uuid = signed
        .url
        .rsplit('/')
        .next()
        .unwrap()
        .parse()
        .unwrap();

    let resolved = store.resolve_grant(token, GrantMode::Upload).await.unwrap();
    assert_eq!(resolved, key);
}

#[tokio::test]
async fn given_upload_grant_when_resolving_as_download_then_rejected() {
    let (_dir, store) = store();
    let key = StorageKey::raw(OwnerId::new(), JobId::new());

    let signed = store
        .signed_upload_url(&key, Duration::minutes(15))
        .await
        .unwrap();
    let token: Uuid = signed.url.rsplit('/').next().unwrap().parse().unwrap();

    assert!(matches!(
        store.resolve_grant(token, GrantMode::Download).await,
        Err(ArtifactStoreError::GrantRejected)
    ));
}

#[tokio::test]
async fn given_expired_grant_when_resolving_then_rejected() {
    let (_dir, store) = store();
    let key = StorageKey::raw(OwnerId::new(), JobId::new());

    let signed = store
        .signed_upload_url(&key, Duration::seconds(-1))
        .await
        .unwrap();
    let token: Uuid = signed.url.rsplit('/').next().unwrap().parse().unwrap();

    assert!(matches!(
        store.resolve_grant(token, GrantMode::Upload).await,
        Err(ArtifactStoreError::GrantRejected)
    ));
}

#[tokio::test]
async fn given_unknown_token_when_resolving_then_rejected() {
    let (_dir, store) = store();
    assert!(matches!(
        store.resolve_grant(Uuid::new_v4(), GrantMode::Upload).await,
        Err(ArtifactStoreError::GrantRejected)
    ));
}

#[tokio::test]
async fn given_missing_object_when_signing_download_then_not_found() {
    let (_dir, store) = store();
    let key = StorageKey::overlay(JobId::new());
    assert!(matches!(
        store.signed_download_url(&key, Duration::hours(1)).await,
        Err(ArtifactStoreError::NotFound(_))
    ));
}

#[tokio::test]
async fn given_stored_object_when_signing_download_then_url_carries_base() {
    let (_dir, store) = store();
    let key = StorageKey::overlay(JobId::new());
    store
        .put(&key, Bytes::from_static(b"mp4"), "video/mp4")
        .await
        .unwrap();

    let signed = store
        .signed_download_url(&key, Duration::hours(1))
        .await
        .unwrap();
    assert!(signed
        .url
        .starts_with("http://localhost:3000/artifacts/"));
}
