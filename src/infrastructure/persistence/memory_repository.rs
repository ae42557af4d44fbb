use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::application::ports::{JobRepository, RepositoryError};
use crate::domain::{CaptureMetadata, Job, JobId, JobState, OwnerId, Report};

/// In-memory repository used for local development and tests. The write
/// lock makes `claim_queued` a genuine compare-and-set.
#[derive(Default)]
pub struct InMemoryJobRepository {
    jobs: RwLock<HashMap<JobId, Job>>,
    reports: RwLock<HashMap<JobId, Report>>,
}

impl InMemoryJobRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobRepository for InMemoryJobRepository {
    async fn create(&self, job: &Job) -> Result<(), RepositoryError> {
        let mut jobs = self.jobs.write().await;
        if jobs.contains_key(&job.id) {
            return Err(RepositoryError::ConstraintViolation(format!(
                "duplicate job id: {}",
                job.id
            )));
        }
        jobs.insert(job.id, job.clone());
        Ok(())
    }

    async fn delete(&self, id: JobId) -> Result<(), RepositoryError> {
        self.jobs.write().await.remove(&id);
        Ok(())
    }

    async fn get_by_id(&self, id: JobId) -> Result<Option<Job>, RepositoryError> {
        Ok(self.jobs.read().await.get(&id).cloned())
    }

    async fn get_owned(&self, id: JobId, owner: OwnerId) -> Result<Option<Job>, RepositoryError> {
        Ok(self
            .jobs
            .read()
            .await
            .get(&id)
            .filter(|job| job.owner_id == owner)
            .cloned())
    }

    async fn claim_queued(&self, id: JobId) -> Result<bool, RepositoryError> {
        let mut jobs = self.jobs.write().await;
        match jobs.get_mut(&id) {
            Some(job) if job.state == JobState::Queued => {
                job.state = JobState::Processing;
                job.error_message = None;
                job.updated_at = Utc::now();
                Ok(true)
            }
            Some(_) => Ok(false),
            None => Err(RepositoryError::NotFound(id.to_string())),
        }
    }

    async fn complete(&self, id: JobId) -> Result<(), RepositoryError> {
        let mut jobs = self.jobs.write().await;
        let job = jobs
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))?;
        if job.state != JobState::Processing {
            return Err(RepositoryError::ConstraintViolation(format!(
                "cannot complete job in state {}",
                job.state
            )));
        }
        job.state = JobState::Done;
        job.updated_at = Utc::now();
        Ok(())
    }

    async fn fail(&self, id: JobId, error_message: &str) -> Result<(), RepositoryError> {
        let mut jobs = self.jobs.write().await;
        let job = jobs
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))?;
        if job.state != JobState::Processing {
            return Err(RepositoryError::ConstraintViolation(format!(
                "cannot fail job in state {}",
                job.state
            )));
        }
        job.state = JobState::Failed;
        job.error_message = Some(error_message.to_string());
        job.updated_at = Utc::now();
        Ok(())
    }

    async fn set_capture(
        &self,
        id: JobId,
        capture: CaptureMetadata,
    ) -> Result<(), RepositoryError> {
        let mut jobs = self.jobs.write().await;
        let job = jobs
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))?;
        job.capture = Some(capture);
        job.updated_at = Utc::now();
        Ok(())
    }

    async fn insert_report(&self, report: &Report) -> Result<(), RepositoryError> {
        let mut reports = self.reports.write().await;
        if reports.contains_key(&report.job_id) {
            return Err(RepositoryError::ConstraintViolation(format!(
                "report already exists for job: {}",
                report.job_id
            )));
        }
        reports.insert(report.job_id, report.clone());
        Ok(())
    }

    async fn get_report(&self, job_id: JobId) -> Result<Option<Report>, RepositoryError> {
        Ok(self.reports.read().await.get(&job_id).cloned())
    }
}
