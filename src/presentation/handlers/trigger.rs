use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::services::JobServiceError;
use crate::domain::JobId;
use crate::presentation::state::AppState;

#[derive(Serialize, Deserialize)]
pub struct TriggerResponse {
    pub status: String,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Fire-and-forget processing trigger. Acknowledges once the job is handed
/// to the worker queue; duplicate triggers on a job that already left
/// `queued` are acknowledged as no-ops.
#[tracing::instrument(skip(state))]
pub async fn trigger_handler(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> impl IntoResponse {
    let uuid = match Uuid::parse_str(&job_id) {
        Ok(u) => u,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: format!("Invalid job ID: {}", job_id),
                }),
            )
                .into_response();
        }
    };

    match state
        .job_service
        .trigger_processing(JobId::from_uuid(uuid))
        .await
    {
        Ok(()) => (
            StatusCode::ACCEPTED,
            Json(TriggerResponse {
                status: "accepted".to_string(),
            }),
        )
            .into_response(),
        Err(JobServiceError::NotFound(_)) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Job not found: {}", job_id),
            }),
        )
            .into_response(),
        Err(JobServiceError::QueueUnavailable(e)) => {
            tracing::error!(error = %e, "Worker queue unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse {
                    error: "Analysis queue full or worker unavailable".to_string(),
                }),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to trigger processing");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to trigger processing".to_string(),
                }),
            )
                .into_response()
        }
    }
}
