use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::services::JobServiceError;
use crate::domain::{AnalysisSummary, Job, JobId, ResolvedReport};
use crate::presentation::handlers::authenticate;
use crate::presentation::state::AppState;

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatusResponse {
    pub job: JobView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<ReportView>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobView {
    pub id: String,
    pub state: String,
    pub error_message: Option<String>,
    pub fps: Option<u32>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub created_at: String,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportView {
    pub overlay_signed_url: String,
    pub summary_data: AnalysisSummary,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl JobStatusResponse {
    pub fn from_parts(job: Job, report: Option<ResolvedReport>) -> Self {
        Self {
            job: JobView {
                id: job.id.to_string(),
                state: job.state.to_string(),
                error_message: job.error_message,
                fps: job.capture.map(|c| c.fps),
                width: job.capture.map(|c| c.width),
                height: job.capture.map(|c| c.height),
                created_at: job.created_at.to_rfc3339(),
            },
            report: report.map(|r| ReportView {
                overlay_signed_url: r.overlay_signed_url,
                summary_data: r.summary,
            }),
        }
    }
}

#[tracing::instrument(skip(state, headers))]
pub async fn job_status_handler(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let owner = match authenticate(&state, &headers).await {
        Ok(owner) => owner,
        Err(response) => return response,
    };

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
        .get_status(JobId::from_uuid(uuid), owner)
        .await
    {
        Ok((job, report)) => (
            StatusCode::OK,
            Json(JobStatusResponse::from_parts(job, report)),
        )
            .into_response(),
        Err(JobServiceError::NotFound(_)) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Job not found: {}", job_id),
            }),
        )
            .into_response(),
        Err(JobServiceError::StorageUnavailable(e) | JobServiceError::CorruptSummary(e)) => {
            tracing::error!(error = %e, "Failed to resolve report");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse {
                    error: "Report artifacts unavailable".to_string(),
                }),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to fetch job status");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch job".to_string(),
                }),
            )
                .into_response()
        }
    }
}
