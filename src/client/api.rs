use async_trait::async_trait;

use crate::domain::JobId;
use crate::presentation::handlers::{CreateJobResponse, JobStatusResponse};

/// Client-side view of the job service boundary. Abstracted so the
/// orchestrator can be driven against a fake in tests.
#[async_trait]
pub trait AnalysisApi: Send + Sync {
    async fn create_job(&self) -> Result<CreateJobResponse, ClientError>;

    /// Direct PUT of the raw recording against the upload grant.
    async fn upload(&self, upload_url: &str, video: Vec<u8>) -> Result<(), ClientError>;

    async fn trigger(&self, job_id: JobId) -> Result<(), ClientError>;

    async fn status(&self, job_id: JobId) -> Result<JobStatusResponse, ClientError>;
}

/// Client-side failure classification. `Transport` (network problems and
/// server 5xx) is retried on the next poll tick; everything else surfaces
/// immediately.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ClientError {
    #[error("unauthorized")]
    Unauthorized,
    #[error("not found")]
    NotFound,
    #[error("transport: {0}")]
    Transport(String),
    #[error("request rejected: {0}")]
    Rejected(String),
}

pub struct HttpAnalysisApi {
    http: reqwest::Client,
    base_url: String,
    bearer_token: String,
}

impl HttpAnalysisApi {
    pub fn new(base_url: impl Into<String>, bearer_token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            bearer_token: bearer_token.into(),
        }
    }

    fn classify(status: reqwest::StatusCode) -> Option<ClientError> {
        if status.is_success() {
            return None;
        }
        Some(match status.as_u16() {
            401 => ClientError::Unauthorized,
            404 => ClientError::NotFound,
            s if status.is_server_error() => {
                ClientError::Transport(format!("server error: {}", s))
            }
            s => ClientError::Rejected(format!("status {}", s)),
        })
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::Transport(e.to_string())
    }
}

#[async_trait]
impl AnalysisApi for HttpAnalysisApi {
    async fn create_job(&self) -> Result<CreateJobResponse, ClientError> {
        let response = self
            .http
            .post(format!("{}/api/v1/jobs", self.base_url))
            .bearer_auth(&self.bearer_token)
            .send()
            .await?;
        if let Some(e) = Self::classify(response.status()) {
            return Err(e);
        }
        Ok(response.json().await?)
    }

    async fn upload(&self, upload_url: &str, video: Vec<u8>) -> Result<(), ClientError> {
        let response = self
            .http
            .put(upload_url)
            .header(reqwest::header::CONTENT_TYPE, "video/webm")
            .body(video)
            .send()
            .await?;
        if let Some(e) = Self::classify(response.status()) {
            return Err(e);
        }
        Ok(())
    }

    async fn trigger(&self, job_id: JobId) -> Result<(), ClientError> {
        let response = self
            .http
            .post(format!("{}/api/v1/jobs/{}/process", self.base_url, job_id))
            .bearer_auth(&self.bearer_token)
            .send()
            .await?;
        if let Some(e) = Self::classify(response.status()) {
            return Err(e);
        }
        Ok(())
    }

    async fn status(&self, job_id: JobId) -> Result<JobStatusResponse, ClientError> {
        let response = self
            .http
            .get(format!("{}/api/v1/jobs/{}", self.base_url, job_id))
            .bearer_auth(&self.bearer_token)
            .send()
            .await?;
        if let Some(e) = Self::classify(response.status()) {
            return Err(e);
        }
        Ok(response.json().await?)
    }
}
