use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;

use spikelab::application::ports::{ArtifactStore, JobRepository, VideoAnalyzer};
use spikelab::application::services::{AnalysisMessage, AnalysisWorker};
use spikelab::domain::{Job, JobId, JobState, OwnerId, StorageKey};
use spikelab::infrastructure::analysis::PassthroughAnalyzer;
use spikelab::infrastructure::persistence::InMemoryJobRepository;
use spikelab::infrastructure::storage::InMemoryArtifactStore;

struct Harness {
    repository: Arc<InMemoryJobRepository>,
    artifact_store: Arc<InMemoryArtifactStore>,
    sender: tokio::sync::mpsc::Sender<AnalysisMessage>,
}

fn spawn_worker() -> Harness {
    let repository = Arc::new(InMemoryJobRepository::new());
    let artifact_store = Arc::new(InMemoryArtifactStore::new());
    let (sender, receiver) = tokio::sync::mpsc::channel(8);
    let worker = AnalysisWorker::new(
        receiver,
        Arc::clone(&repository) as Arc<dyn JobRepository>,
        Arc::clone(&artifact_store) as Arc<dyn ArtifactStore>,
        Arc::new(PassthroughAnalyzer) as Arc<dyn VideoAnalyzer>,
    );
    tokio::spawn(worker.run());
    Harness {
        repository,
        artifact_store,
        sender,
    }
}

async fn wait_for_terminal(repository: &InMemoryJobRepository, job_id: JobId) -> JobState {
    for _ in 0..200 {
        let job = repository.get_by_id(job_id).await.unwrap().unwrap();
        if job.state.is_terminal() {
            return job.state;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("job {} never reached a terminal state", job_id);
}

#[tokio::test]
async fn given_uploaded_video_when_processing_then_done_with_report_and_artifacts() {
    let h = spawn_worker();
    let job = Job::new(OwnerId::new());
    h.repository.create(&job).await.unwrap();
    h.artifact_store
        .put(&job.storage_key, Bytes::from_static(b"webm bytes"), "video/webm")
        .await
        .unwrap();

    h.sender
        .send(AnalysisMessage { job_id: job.id })
        .await
        .unwrap();

    assert_eq!(wait_for_terminal(&h.repository, job.id).await, JobState::Done);

    let report = h.repository.get_report(job.id).await.unwrap().unwrap();
    assert_eq!(report.overlay_key, StorageKey::overlay(job.id));
    assert_eq!(report.summary_key, StorageKey::summary(job.id));
    assert!(h.artifact_store.contains(&report.overlay_key).await);
    assert!(h.artifact_store.contains(&report.summary_key).await);

    let done = h.repository.get_by_id(job.id).await.unwrap().unwrap();
    assert!(done.error_message.is_none());
}

#[tokio::test]
async fn given_missing_raw_video_when_processing_then_failed_with_download_diagnostic() {
    let h = spawn_worker();
    let job = Job::new(OwnerId::new());
    h.repository.create(&job).await.unwrap();

    h.sender
        .send(AnalysisMessage { job_id: job.id })
        .await
        .unwrap();

    assert_eq!(
        wait_for_terminal(&h.repository, job.id).await,
        JobState::Failed
    );

    let failed = h.repository.get_by_id(job.id).await.unwrap().unwrap();
    let diagnostic = failed.error_message.unwrap();
    assert!(
        diagnostic.starts_with("download:"),
        "unexpected diagnostic: {}",
        diagnostic
    );
    assert!(h.repository.get_report(job.id).await.unwrap().is_none());
}

#[tokio::test]
async fn given_empty_video_when_processing_then_failed_with_analyze_diagnostic() {
    let h = spawn_worker();
    let job = Job::new(OwnerId::new());
    h.repository.create(&job).await.unwrap();
    h.artifact_store
        .put(&job.storage_key, Bytes::new(), "video/webm")
        .await
        .unwrap();

    h.sender
        .send(AnalysisMessage { job_id: job.id })
        .await
        .unwrap();

    assert_eq!(
        wait_for_terminal(&h.repository, job.id).await,
        JobState::Failed
    );

    let failed = h.repository.get_by_id(job.id).await.unwrap().unwrap();
    assert!(failed.error_message.unwrap().starts_with("analyze:"));
}

#[tokio::test]
async fn given_duplicate_triggers_when_processing_then_single_report() {
    let h = spawn_worker();
    let job = Job::new(OwnerId::new());
    h.repository.create(&job).await.unwrap();
    h.artifact_store
        .put(&job.storage_key, Bytes::from_static(b"webm bytes"), "video/webm")
        .await
        .unwrap();

    for _ in 0..3 {
        h.sender
            .send(AnalysisMessage { job_id: job.id })
            .await
            .unwrap();
    }

    assert_eq!(wait_for_terminal(&h.repository, job.id).await, JobState::Done);

    // Give the worker time to drain the duplicate messages, then check
    // nothing resurrected the job.
    tokio::time::sleep(Duration::from_millis(100)).await;
    let job_after = h.repository.get_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(job_after.state, JobState::Done);
    assert!(h.repository.get_report(job.id).await.unwrap().is_some());
}

#[tokio::test]
async fn given_failed_job_when_retriggered_then_stays_failed() {
    let h = spawn_worker();
    let job = Job::new(OwnerId::new());
    h.repository.create(&job).await.unwrap();

    h.sender
        .send(AnalysisMessage { job_id: job.id })
        .await
        .unwrap();
    assert_eq!(
        wait_for_terminal(&h.repository, job.id).await,
        JobState::Failed
    );

    // A late duplicate loses the claim and leaves the terminal state alone.
    h.sender
        .send(AnalysisMessage { job_id: job.id })
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    let job_after = h.repository.get_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(job_after.state, JobState::Failed);
}
