use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::application::services::JobServiceError;
use crate::presentation::handlers::authenticate;
use crate::presentation::state::AppState;

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobResponse {
    pub job_id: String,
    pub upload_url: String,
}

#[derive(Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[tracing::instrument(skip(state, headers))]
pub async fn create_job_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let owner = match authenticate(&state, &headers).await {
        Ok(owner) => owner,
        Err(response) => return response,
    };

    match state.job_service.create_job(owner).await {
        Ok((job, grant)) => (
            StatusCode::CREATED,
            Json(CreateJobResponse {
                job_id: job.id.to_string(),
                upload_url: grant.url,
            }),
        )
            .into_response(),
        Err(JobServiceError::StorageUnavailable(e)) => {
            tracing::error!(error = %e, "Upload grant unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse {
                    error: "Failed to create upload URL".to_string(),
                }),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to create job");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to create video record".to_string(),
                }),
            )
                .into_response()
        }
    }
}
