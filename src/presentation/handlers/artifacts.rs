use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use crate::application::ports::{ArtifactStoreError, GrantMode};
use crate::presentation::state::AppState;

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Signed-URL upload endpoint: a direct PUT of raw bytes against an
/// upload grant issued at job creation.
#[tracing::instrument(skip(state, body))]
pub async fn upload_artifact_handler(
    State(state): State<AppState>,
    Path(token): Path<String>,
    body: Bytes,
) -> impl IntoResponse {
    let Ok(token) = Uuid::parse_str(&token) else {
        return grant_rejected();
    };

    let key = match state
        .artifact_store
        .resolve_grant(token, GrantMode::Upload)
        .await
    {
        Ok(key) => key,
        Err(_) => return grant_rejected(),
    };

    tracing::debug!(key = %key, bytes = body.len(), "Accepting signed upload");

    match state.artifact_store.put(&key, body, "video/webm").await {
        Ok(()) => StatusCode::OK.into_response(),
        Err(e) => {
            tracing::error!(error = %e, key = %key, "Signed upload failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Upload failed".to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// Signed-URL download endpoint, used for overlay playback.
#[tracing::instrument(skip(state))]
pub async fn download_artifact_handler(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> impl IntoResponse {
    let Ok(token) = Uuid::parse_str(&token) else {
        return grant_rejected();
    };

    let key = match state
        .artifact_store
        .resolve_grant(token, GrantMode::Download)
        .await
    {
        Ok(key) => key,
        Err(_) => return grant_rejected(),
    };

    match state.artifact_store.fetch(&key).await {
        Ok(data) => {
            let content_type = state
                .artifact_store
                .content_type(&key)
                .await
                .unwrap_or_else(|_| "application/octet-stream".to_string());
            ([(header::CONTENT_TYPE, content_type)], data).into_response()
        }
        Err(ArtifactStoreError::NotFound(e)) => {
            tracing::warn!(error = %e, key = %key, "Granted artifact missing");
            (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: "Artifact not found".to_string(),
                }),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, key = %key, "Signed download failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Download failed".to_string(),
                }),
            )
                .into_response()
        }
    }
}

fn grant_rejected() -> axum::response::Response {
    (
        StatusCode::FORBIDDEN,
        Json(ErrorResponse {
            error: "Signed URL expired or invalid".to_string(),
        }),
    )
        .into_response()
}
