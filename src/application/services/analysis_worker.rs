use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::mpsc;

use crate::application::ports::{
    AnalyzerError, ArtifactStore, ArtifactStoreError, JobRepository, RepositoryError,
    VideoAnalyzer,
};
use crate::domain::{JobId, Report, StorageKey};

/// One-way message handing a queued job to the worker. The sender holds no
/// reference to the in-flight task.
pub struct AnalysisMessage {
    pub job_id: JobId,
}

/// Consumes queued jobs, runs the pluggable analyzer, writes both
/// artifacts, records the report, and finalizes job state. A job that
/// enters processing always reaches `done` or `failed`.
pub struct AnalysisWorker {
    receiver: mpsc::Receiver<AnalysisMessage>,
    repository: Arc<dyn JobRepository>,
    artifact_store: Arc<dyn ArtifactStore>,
    analyzer: Arc<dyn VideoAnalyzer>,
}

impl AnalysisWorker {
    pub fn new(
        receiver: mpsc::Receiver<AnalysisMessage>,
        repository: Arc<dyn JobRepository>,
        artifact_store: Arc<dyn ArtifactStore>,
        analyzer: Arc<dyn VideoAnalyzer>,
    ) -> Self {
        Self {
            receiver,
            repository,
            artifact_store,
            analyzer,
        }
    }

    pub async fn run(mut self) {
        tracing::info!("Analysis worker started");
        while let Some(msg) = self.receiver.recv().await {
            let span = tracing::info_span!("analysis_job", job_id = %msg.job_id);
            let _guard = span.enter();

            if let Err(e) = self.process_job(msg.job_id).await {
                tracing::error!(error = %e, "Analysis job failed");
            }
        }
        tracing::info!("Analysis worker stopped: channel closed");
    }

    async fn process_job(&self, job_id: JobId) -> Result<(), WorkerError> {
        // At-most-one worker per job: losing the claim means another
        // delivery already took it, or the job left `queued` some other
        // way. Either way this message is a duplicate.
        if !self
            .repository
            .claim_queued(job_id)
            .await
            .map_err(WorkerError::Claim)?
        {
            tracing::debug!("Claim lost, dropping duplicate trigger");
            return Ok(());
        }

        match self.process_pipeline(job_id).await {
            Ok(()) => {
                self.repository
                    .complete(job_id)
                    .await
                    .map_err(WorkerError::Finalize)?;
                tracing::info!("Analysis completed");
                Ok(())
            }
            Err(e) => {
                let diagnostic = e.to_string();
                self.repository
                    .fail(job_id, &diagnostic)
                    .await
                    .map_err(WorkerError::Finalize)?;
                Err(e)
            }
        }
    }

    async fn process_pipeline(&self, job_id: JobId) -> Result<(), WorkerError> {
        let job = self
            .repository
            .get_by_id(job_id)
            .await
            .map_err(WorkerError::Claim)?
            .ok_or_else(|| {
                WorkerError::Claim(RepositoryError::NotFound(job_id.to_string()))
            })?;

        let video = self
            .artifact_store
            .fetch(&job.storage_key)
            .await
            .map_err(WorkerError::Download)?;

        let output = self
            .analyzer
            .analyze(&video)
            .await
            .map_err(WorkerError::Analyze)?;

        if let Some(capture) = output.capture {
            self.repository
                .set_capture(job_id, capture)
                .await
                .map_err(WorkerError::Record)?;
        }

        let overlay_key = StorageKey::overlay(job_id);
        let summary_key = StorageKey::summary(job_id);

        self.artifact_store
            .put(&overlay_key, Bytes::from(output.overlay), "video/mp4")
            .await
            .map_err(WorkerError::UploadOverlay)?;

        let summary_json =
            serde_json::to_vec(&output.summary).map_err(WorkerError::EncodeSummary)?;
        self.artifact_store
            .put(&summary_key, Bytes::from(summary_json), "application/json")
            .await
            .map_err(WorkerError::UploadSummary)?;

        // Both artifacts are in place; only now does the report become
        // visible.
        let report = Report::new(job_id, overlay_key, summary_key);
        self.repository
            .insert_report(&report)
            .await
            .map_err(WorkerError::Record)?;

        Ok(())
    }
}

/// Worker failures, labelled by pipeline stage so the diagnostic on the
/// failed job names where it broke.
#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error("claim: {0}")]
    Claim(RepositoryError),
    #[error("download: {0}")]
    Download(ArtifactStoreError),
    #[error("analyze: {0}")]
    Analyze(AnalyzerError),
    #[error("upload_overlay: {0}")]
    UploadOverlay(ArtifactStoreError),
    #[error("upload_summary: {0}")]
    UploadSummary(ArtifactStoreError),
    #[error("encode_summary: {0}")]
    EncodeSummary(serde_json::Error),
    #[error("record: {0}")]
    Record(RepositoryError),
    #[error("finalize: {0}")]
    Finalize(RepositoryError),
}
