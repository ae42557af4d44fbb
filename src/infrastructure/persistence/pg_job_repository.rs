use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use crate::application::ports::{JobRepository, RepositoryError};
use crate::domain::{
    CaptureMetadata, Job, JobId, JobState, OwnerId, Report, StorageKey,
};

pub struct PgJobRepository {
    pool: PgPool,
}

impl PgJobRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn job_from_row(row: &PgRow) -> Result<Job, RepositoryError> {
    let state: String = row
        .try_get("state")
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;
    let state = state.parse::<JobState>().map_err(RepositoryError::QueryFailed)?;

    let fps: Option<i32> = row
        .try_get("fps")
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;
    let width: Option<i32> = row
        .try_get("width")
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;
    let height: Option<i32> = row
        .try_get("height")
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;
    let capture = match (fps, width, height) {
        (Some(fps), Some(width), Some(height)) => Some(CaptureMetadata {
            fps: fps as u32,
            width: width as u32,
            height: height as u32,
        }),
        _ => None,
    };

    let get_uuid = |name: &str| -> Result<Uuid, RepositoryError> {
        row.try_get(name)
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))
    };
    let storage_key: String = row
        .try_get("storage_key")
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;
    let error_message: Option<String> = row
        .try_get("error_message")
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;
    let created_at: DateTime<Utc> = row
        .try_get("created_at")
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;
    let updated_at: DateTime<Utc> = row
        .try_get("updated_at")
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

    Ok(Job {
        id: JobId::from_uuid(get_uuid("id")?),
        owner_id: OwnerId::from_uuid(get_uuid("owner_id")?),
        state,
        storage_key: StorageKey::from_raw(storage_key),
        error_message,
        capture,
        created_at,
        updated_at,
    })
}

const JOB_COLUMNS: &str =
    "id, owner_id, state, storage_key, error_message, fps, width, height, created_at, updated_at";

#[async_trait]
impl JobRepository for PgJobRepository {
    #[instrument(skip(self, job), fields(job_id = %job.id))]
    async fn create(&self, job: &Job) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO videos (id, owner_id, state, storage_key, error_message, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(job.id.as_uuid())
        .bind(job.owner_id.as_uuid())
        .bind(job.state.as_str())
        .bind(job.storage_key.as_str())
        .bind(&job.error_message)
        .bind(job.created_at)
        .bind(job.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    #[instrument(skip(self), fields(job_id = %id))]
    async fn delete(&self, id: JobId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM videos WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;
        Ok(())
    }

    #[instrument(skip(self), fields(job_id = %id))]
    async fn get_by_id(&self, id: JobId) -> Result<Option<Job>, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM videos WHERE id = $1",
            JOB_COLUMNS
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        row.as_ref().map(job_from_row).transpose()
    }

    #[instrument(skip(self), fields(job_id = %id, owner_id = %owner))]
    async fn get_owned(&self, id: JobId, owner: OwnerId) -> Result<Option<Job>, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM videos WHERE id = $1 AND owner_id = $2",
            JOB_COLUMNS
        ))
        .bind(id.as_uuid())
        .bind(owner.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        row.as_ref().map(job_from_row).transpose()
    }

    #[instrument(skip(self), fields(job_id = %id))]
    async fn claim_queued(&self, id: JobId) -> Result<bool, RepositoryError> {
        // Conditional update: the WHERE clause on state is what makes the
        // claim atomic under concurrent trigger retries.
        let result = sqlx::query(
            r#"
            UPDATE videos
            SET state = 'processing', error_message = NULL, updated_at = $2
            WHERE id = $1 AND state = 'queued'
            "#,
        )
        .bind(id.as_uuid())
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        if result.rows_affected() == 1 {
            return Ok(true);
        }
        match self.get_by_id(id).await? {
            Some(_) => Ok(false),
            None => Err(RepositoryError::NotFound(id.to_string())),
        }
    }

    #[instrument(skip(self), fields(job_id = %id))]
    async fn complete(&self, id: JobId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE videos
            SET state = 'done', updated_at = $2
            WHERE id = $1 AND state = 'processing'
            "#,
        )
        .bind(id.as_uuid())
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        if result.rows_affected() == 1 {
            Ok(())
        } else {
            Err(RepositoryError::ConstraintViolation(format!(
                "job {} not in processing state",
                id
            )))
        }
    }

    #[instrument(skip(self, error_message), fields(job_id = %id))]
    async fn fail(&self, id: JobId, error_message: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE videos
            SET state = 'failed', error_message = $2, updated_at = $3
            WHERE id = $1 AND state = 'processing'
            "#,
        )
        .bind(id.as_uuid())
        .bind(error_message)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        if result.rows_affected() == 1 {
            Ok(())
        } else {
            Err(RepositoryError::ConstraintViolation(format!(
                "job {} not in processing state",
                id
            )))
        }
    }

    #[instrument(skip(self), fields(job_id = %id))]
    async fn set_capture(
        &self,
        id: JobId,
        capture: CaptureMetadata,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            UPDATE videos
            SET fps = $2, width = $3, height = $4, updated_at = $5
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .bind(capture.fps as i32)
        .bind(capture.width as i32)
        .bind(capture.height as i32)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    #[instrument(skip(self, report), fields(job_id = %report.job_id))]
    async fn insert_report(&self, report: &Report) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO reports (video_id, overlay_key, summary_key, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(report.job_id.as_uuid())
        .bind(report.overlay_key.as_str())
        .bind(report.summary_key.as_str())
        .bind(report.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    #[instrument(skip(self), fields(job_id = %job_id))]
    async fn get_report(&self, job_id: JobId) -> Result<Option<Report>, RepositoryError> {
        let row = sqlx::query(
            "SELECT video_id, overlay_key, summary_key, created_at FROM reports WHERE video_id = $1",
        )
        .bind(job_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        match row {
            Some(r) => {
                let video_id: Uuid = r
                    .try_get("video_id")
                    .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;
                let overlay_key: String = r
                    .try_get("overlay_key")
                    .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;
                let summary_key: String = r
                    .try_get("summary_key")
                    .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;
                let created_at: DateTime<Utc> = r
                    .try_get("created_at")
                    .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

                Ok(Some(Report {
                    job_id: JobId::from_uuid(video_id),
                    overlay_key: StorageKey::from_raw(overlay_key),
                    summary_key: StorageKey::from_raw(summary_key),
                    created_at,
                }))
            }
            None => Ok(None),
        }
    }
}
