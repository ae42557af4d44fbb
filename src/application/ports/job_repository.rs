use async_trait::async_trait;

use crate::domain::{CaptureMetadata, Job, JobId, OwnerId, Report};

use super::RepositoryError;

/// Durable records for jobs and their reports. Implementations must make
/// `claim_queued` an atomic compare-and-set; it is the only concurrency
/// guarantee the worker relies on.
#[async_trait]
pub trait JobRepository: Send + Sync {
    async fn create(&self, job: &Job) -> Result<(), RepositoryError>;

    /// Remove a job record. Used to roll back a creation whose upload
    /// grant could not be issued.
    async fn delete(&self, id: JobId) -> Result<(), RepositoryError>;

    async fn get_by_id(&self, id: JobId) -> Result<Option<Job>, RepositoryError>;

    /// Ownership-checked read: `None` when the job does not exist or
    /// belongs to a different owner.
    async fn get_owned(&self, id: JobId, owner: OwnerId) -> Result<Option<Job>, RepositoryError>;

    /// Atomically move a `queued` job to `processing`, clearing any stale
    /// error message. Returns `false` when the job was not in `queued`
    /// state, in which case the caller must not process it.
    async fn claim_queued(&self, id: JobId) -> Result<bool, RepositoryError>;

    /// `processing -> done`. Fails with `ConstraintViolation` if the job
    /// is not in `processing` state.
    async fn complete(&self, id: JobId) -> Result<(), RepositoryError>;

    /// `processing -> failed`, attaching a diagnostic. Fails with
    /// `ConstraintViolation` if the job is not in `processing` state.
    async fn fail(&self, id: JobId, error_message: &str) -> Result<(), RepositoryError>;

    async fn set_capture(
        &self,
        id: JobId,
        capture: CaptureMetadata,
    ) -> Result<(), RepositoryError>;

    async fn insert_report(&self, report: &Report) -> Result<(), RepositoryError>;

    async fn get_report(&self, job_id: JobId) -> Result<Option<Report>, RepositoryError>;
}
