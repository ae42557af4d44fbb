use spikelab::application::ports::{JobRepository, RepositoryError};
use spikelab::domain::{CaptureMetadata, Job, JobId, JobState, OwnerId, Report, StorageKey};

fn queued_job() -> Job {
    Job::new(OwnerId::new())
}

#[tokio::test]
async fn given_created_job_when_fetching_then_queued_state_returned() {
    let repo = spikelab::infrastructure::persistence::InMemoryJobRepository::new();
    let job = queued_job();
    repo.create(&job).await.unwrap();

    let fetched = repo.get_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(fetched.state, JobState::Queued);
    assert_eq!(fetched.owner_id, job.owner_id);
    assert_eq!(fetched.storage_key, job.storage_key);
}

#[tokio::test]
async fn given_wrong_owner_when_fetching_owned_then_none() {
    let repo = spikelab::infrastructure::persistence::InMemoryJobRepository::new();
    let job = queued_job();
    repo.create(&job).await.unwrap();

    let other = OwnerId::new();
    assert!(repo.get_owned(job.id, other).await.unwrap().is_none());
    assert!(repo.get_owned(job.id, job.owner_id).await.unwrap().is_some());
}

#[tokio::test]
async fn given_queued_job_when_claiming_then_processing_and_error_cleared() {
    let repo = spikelab::infrastructure::persistence::InMemoryJobRepository::new();
    let mut job = queued_job();
    job.error_message = Some("stale".to_string());
    repo.create(&job).await.unwrap();

    assert!(repo.claim_queued(job.id).await.unwrap());

    let claimed = repo.get_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(claimed.state, JobState::Processing);
    assert!(claimed.error_message.is_none());
}

#[tokio::test]
async fn given_concurrent_claims_then_exactly_one_wins() {
    let repo =
        std::sync::Arc::new(spikelab::infrastructure::persistence::InMemoryJobRepository::new());
    let job = queued_job();
    repo.create(&job).await.unwrap();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let repo = std::sync::Arc::clone(&repo);
        let id = job.id;
        handles.push(tokio::spawn(async move {
            repo.claim_queued(id).await.unwrap()
        }));
    }

    let mut winners = 0;
    for handle in handles {
        if handle.await.unwrap() {
            winners += 1;
        }
    }
    assert_eq!(winners, 1);
}

#[tokio::test]
async fn given_terminal_job_when_completing_again_then_constraint_violation() {
    let repo = spikelab::infrastructure::persistence::InMemoryJobRepository::new();
    let job = queued_job();
    repo.create(&job).await.unwrap();
    repo.claim_queued(job.id).await.unwrap();
    repo.complete(job.id).await.unwrap();

    assert!(matches!(
        repo.complete(job.id).await,
        Err(RepositoryError::ConstraintViolation(_))
    ));
    assert!(matches!(
        repo.fail(job.id, "late failure").await,
        Err(RepositoryError::ConstraintViolation(_))
    ));
    assert!(!repo.claim_queued(job.id).await.unwrap());

    let job_after = repo.get_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(job_after.state, JobState::Done);
}

#[tokio::test]
async fn given_failed_job_when_claiming_then_claim_lost() {
    let repo = spikelab::infrastructure::persistence::InMemoryJobRepository::new();
    let job = queued_job();
    repo.create(&job).await.unwrap();
    repo.claim_queued(job.id).await.unwrap();
    repo.fail(job.id, "download: missing").await.unwrap();

    assert!(!repo.claim_queued(job.id).await.unwrap());

    let failed = repo.get_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(failed.state, JobState::Failed);
    assert_eq!(failed.error_message.as_deref(), Some("download: missing"));
}

#[tokio::test]
async fn given_capture_metadata_when_setting_then_persisted() {
    let repo = spikelab::infrastructure::persistence::InMemoryJobRepository::new();
    let job = queued_job();
    repo.create(&job).await.unwrap();

    repo.set_capture(
        job.id,
        CaptureMetadata {
            fps: 30,
            width: 1280,
            height: 720,
        },
    )
    .await
    .unwrap();

    let fetched = repo.get_by_id(job.id).await.unwrap().unwrap();
    let capture = fetched.capture.unwrap();
    assert_eq!(capture.fps, 30);
    assert_eq!(capture.width, 1280);
    assert_eq!(capture.height, 720);
}

#[tokio::test]
async fn given_duplicate_report_when_inserting_then_constraint_violation() {
    let repo = spikelab::infrastructure::persistence::InMemoryJobRepository::new();
    let job_id = JobId::new();
    let report = Report::new(
        job_id,
        StorageKey::overlay(job_id),
        StorageKey::summary(job_id),
    );

    repo.insert_report(&report).await.unwrap();
    assert!(matches!(
        repo.insert_report(&report).await,
        Err(RepositoryError::ConstraintViolation(_))
    ));
    assert!(repo.get_report(job_id).await.unwrap().is_some());
}

#[tokio::test]
async fn given_deleted_job_when_fetching_then_none() {
    let repo = spikelab::infrastructure::persistence::InMemoryJobRepository::new();
    let job = queued_job();
    repo.create(&job).await.unwrap();
    repo.delete(job.id).await.unwrap();
    assert!(repo.get_by_id(job.id).await.unwrap().is_none());
}
