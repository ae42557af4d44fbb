use std::sync::Arc;

use chrono::Duration;
use tokio::sync::mpsc;

use crate::application::ports::{
    ArtifactStore, ArtifactStoreError, JobRepository, RepositoryError, SignedUrl,
};
use crate::domain::{Job, JobId, JobState, OwnerId, ResolvedReport};

use super::AnalysisMessage;

/// Owns the job and report lifecycle: creation with an upload grant,
/// handing queued jobs to the worker, and ownership-checked status reads.
pub struct JobService {
    repository: Arc<dyn JobRepository>,
    artifact_store: Arc<dyn ArtifactStore>,
    worker_sender: mpsc::Sender<AnalysisMessage>,
    upload_ttl: Duration,
    download_ttl: Duration,
}

impl JobService {
    pub fn new(
        repository: Arc<dyn JobRepository>,
        artifact_store: Arc<dyn ArtifactStore>,
        worker_sender: mpsc::Sender<AnalysisMessage>,
        upload_ttl: Duration,
        download_ttl: Duration,
    ) -> Self {
        Self {
            repository,
            artifact_store,
            worker_sender,
            upload_ttl,
            download_ttl,
        }
    }

    /// Allocate a queued job with a fresh owner-scoped storage key and ask
    /// the artifact store for an upload grant on it. If the grant cannot
    /// be issued the job record is deleted again so no unusable queued job
    /// is left behind.
    pub async fn create_job(
        &self,
        owner: OwnerId,
    ) -> Result<(Job, SignedUrl), JobServiceError> {
        let job = Job::new(owner);
        self.repository.create(&job).await?;

        match self
            .artifact_store
            .signed_upload_url(&job.storage_key, self.upload_ttl)
            .await
        {
            Ok(grant) => {
                tracing::info!(job_id = %job.id, owner_id = %owner, "Job created");
                Ok((job, grant))
            }
            Err(e) => {
                tracing::error!(job_id = %job.id, error = %e, "Upload grant failed, rolling back job");
                if let Err(del_err) = self.repository.delete(job.id).await {
                    tracing::warn!(job_id = %job.id, error = %del_err, "Rollback delete failed");
                }
                Err(JobServiceError::StorageUnavailable(e.to_string()))
            }
        }
    }

    /// Hand a queued job to the analysis worker. Fire-and-forget: returns
    /// once the message is accepted. Re-triggering a job that already left
    /// `queued` is a no-op so duplicate client calls are harmless.
    pub async fn trigger_processing(&self, job_id: JobId) -> Result<(), JobServiceError> {
        let job = self
            .repository
            .get_by_id(job_id)
            .await?
            .ok_or(JobServiceError::NotFound(job_id))?;

        if job.state != JobState::Queued {
            tracing::debug!(job_id = %job_id, state = %job.state, "Trigger ignored, job not queued");
            return Ok(());
        }

        self.worker_sender
            .send(AnalysisMessage { job_id })
            .await
            .map_err(|_| {
                JobServiceError::QueueUnavailable("analysis worker unavailable".to_string())
            })?;

        tracing::info!(job_id = %job_id, "Analysis job enqueued");
        Ok(())
    }

    /// Ownership-checked status read. A job owned by someone else is
    /// indistinguishable from a missing one. When the job is done, the
    /// report is materialized: a fresh download URL for the overlay and
    /// the parsed summary document.
    pub async fn get_status(
        &self,
        job_id: JobId,
        owner: OwnerId,
    ) -> Result<(Job, Option<ResolvedReport>), JobServiceError> {
        let job = self
            .repository
            .get_owned(job_id, owner)
            .await?
            .ok_or(JobServiceError::NotFound(job_id))?;

        if job.state != JobState::Done {
            return Ok((job, None));
        }

        let Some(report) = self.repository.get_report(job_id).await? else {
            return Ok((job, None));
        };

        let overlay_url = self
            .artifact_store
            .signed_download_url(&report.overlay_key, self.download_ttl)
            .await
            .map_err(|e| JobServiceError::StorageUnavailable(e.to_string()))?;

        let summary_bytes = self
            .artifact_store
            .fetch(&report.summary_key)
            .await
            .map_err(|e| JobServiceError::StorageUnavailable(e.to_string()))?;

        let summary = serde_json::from_slice(&summary_bytes)
            .map_err(|e| JobServiceError::CorruptSummary(e.to_string()))?;

        Ok((
            job,
            Some(ResolvedReport {
                overlay_signed_url: overlay_url.url,
                summary,
            }),
        ))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JobServiceError {
    #[error("job not found: {0}")]
    NotFound(JobId),
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
    #[error("queue unavailable: {0}")]
    QueueUnavailable(String),
    #[error("summary document unreadable: {0}")]
    CorruptSummary(String),
    #[error("repository: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<ArtifactStoreError> for JobServiceError {
    fn from(e: ArtifactStoreError) -> Self {
        JobServiceError::StorageUnavailable(e.to_string())
    }
}
