use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex};
use uuid::Uuid;

use crate::domain::{
    evaluate, AnalysisSummary, BaselineProfiles, BaselineStatus, JobId, JobState,
};
use crate::presentation::handlers::JobStatusResponse;

use super::{AnalysisApi, ClientError};

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub poll_interval: Duration,
    /// Polls after which persistent `processing` is surfaced as a stall,
    /// distinct from a failed job.
    pub max_polls: u32,
    /// Baseline profile the results are classified against. A purely
    /// local choice; never sent to the server.
    pub profile: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            max_polls: 150,
            profile: "club_indoor".to_string(),
        }
    }
}

/// Local capture/upload lifecycle. Mirrors the server job state but stays
/// distinct from it until the first successful poll.
#[derive(Debug, Clone)]
pub enum ClientPhase {
    Idle,
    Queued {
        job_id: JobId,
    },
    Processing {
        job_id: JobId,
        /// Heuristic driven by elapsed polls; the worker reports no real
        /// percentage. Non-decreasing, capped below 100 until done.
        progress: u8,
    },
    Done {
        job_id: JobId,
        report: EvaluatedReport,
    },
    Failed {
        job_id: Option<JobId>,
        error: String,
    },
    Stalled {
        job_id: JobId,
    },
}

#[derive(Debug, Clone)]
pub struct EvaluatedReport {
    pub overlay_url: String,
    pub summary: AnalysisSummary,
    pub evaluation: BTreeMap<String, BaselineStatus>,
}

/// Drives a submission end to end: create, upload, trigger, then poll to a
/// terminal state. Owns its poll cycle through an explicit cancel token;
/// starting a new cycle always cancels the previous one first.
pub struct Orchestrator {
    api: Arc<dyn AnalysisApi>,
    baselines: BaselineProfiles,
    config: ClientConfig,
    phase_tx: watch::Sender<ClientPhase>,
    poll_cancel: Mutex<Option<watch::Sender<bool>>>,
}

impl Orchestrator {
    pub fn new(api: Arc<dyn AnalysisApi>, baselines: BaselineProfiles, config: ClientConfig) -> Self {
        let (phase_tx, _) = watch::channel(ClientPhase::Idle);
        Self {
            api,
            baselines,
            config,
            phase_tx,
            poll_cancel: Mutex::new(None),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ClientPhase> {
        self.phase_tx.subscribe()
    }

    pub fn phase(&self) -> ClientPhase {
        self.phase_tx.borrow().clone()
    }

    /// Submit a recording: create the job, upload the bytes against the
    /// grant, trigger processing, and start polling. Any step failing
    /// lands in `Failed` with a diagnostic and the orchestrator can be
    /// `reset()` back to `Idle`.
    pub async fn submit(&self, video: Vec<u8>) -> Result<JobId, ClientError> {
        let created = match self.api.create_job().await {
            Ok(created) => created,
            Err(e) => return Err(self.fail_submit(None, e)),
        };

        let job_id = match Uuid::parse_str(&created.job_id) {
            Ok(uuid) => JobId::from_uuid(uuid),
            Err(e) => {
                return Err(self.fail_submit(
                    None,
                    ClientError::Rejected(format!("malformed job id: {}", e)),
                ));
            }
        };

        if let Err(e) = self.api.upload(&created.upload_url, video).await {
            return Err(self.fail_submit(Some(job_id), e));
        }

        self.phase_tx.send_replace(ClientPhase::Queued { job_id });

        if let Err(e) = self.api.trigger(job_id).await {
            return Err(self.fail_submit(Some(job_id), e));
        }

        self.start_polling(job_id).await;
        Ok(job_id)
    }

    /// Cancel any running poll cycle and return to `Idle`.
    pub async fn reset(&self) {
        if let Some(prev) = self.poll_cancel.lock().await.take() {
            let _ = prev.send(true);
        }
        self.phase_tx.send_replace(ClientPhase::Idle);
    }

    fn fail_submit(&self, job_id: Option<JobId>, error: ClientError) -> ClientError {
        self.phase_tx.send_replace(ClientPhase::Failed {
            job_id,
            error: error.to_string(),
        });
        error
    }

    async fn start_polling(&self, job_id: JobId) {
        let (cancel_tx, cancel_rx) = watch::channel(false);
        if let Some(prev) = self.poll_cancel.lock().await.replace(cancel_tx) {
            let _ = prev.send(true);
        }

        let api = Arc::clone(&self.api);
        let phase_tx = self.phase_tx.clone();
        let baselines = self.baselines.clone();
        let profile = self.config.profile.clone();
        let poll_interval = self.config.poll_interval;
        let max_polls = self.config.max_polls;

        tokio::spawn(poll_loop(
            api,
            phase_tx,
            cancel_rx,
            job_id,
            baselines,
            profile,
            poll_interval,
            max_polls,
        ));
    }
}

#[allow(clippy::too_many_arguments)]
async fn poll_loop(
    api: Arc<dyn AnalysisApi>,
    phase_tx: watch::Sender<ClientPhase>,
    mut cancel_rx: watch::Receiver<bool>,
    job_id: JobId,
    baselines: BaselineProfiles,
    profile: String,
    poll_interval: Duration,
    max_polls: u32,
) {
    let mut ticker = tokio::time::interval(poll_interval);
    let mut polls: u32 = 0;
    let mut progress: u8 = 0;

    loop {
        tokio::select! {
            changed = cancel_rx.changed() => {
                if changed.is_err() || *cancel_rx.borrow() {
                    tracing::debug!(job_id = %job_id, "Poll cycle cancelled");
                    return;
                }
            }
            _ = ticker.tick() => {
                polls += 1;

                let status = match api.status(job_id).await {
                    Ok(status) => status,
                    Err(ClientError::Transport(e)) => {
                        // Transient: retry on the next scheduled tick.
                        tracing::debug!(job_id = %job_id, error = %e, "Poll failed, will retry");
                        if polls >= max_polls {
                            phase_tx.send_replace(ClientPhase::Stalled { job_id });
                            return;
                        }
                        continue;
                    }
                    Err(e) => {
                        phase_tx.send_replace(ClientPhase::Failed {
                            job_id: Some(job_id),
                            error: e.to_string(),
                        });
                        return;
                    }
                };

                match status.job.state.parse::<JobState>() {
                    Ok(JobState::Queued) => {}
                    Ok(JobState::Processing) => {
                        let estimate = 10u8.saturating_add(
                            (polls.min(16) as u8).saturating_mul(5),
                        );
                        progress = progress.max(estimate.min(90));
                        phase_tx.send_replace(ClientPhase::Processing { job_id, progress });
                    }
                    Ok(JobState::Done) => {
                        phase_tx.send_replace(finish(job_id, status, &baselines, &profile));
                        return;
                    }
                    Ok(JobState::Failed) => {
                        phase_tx.send_replace(ClientPhase::Failed {
                            job_id: Some(job_id),
                            error: status
                                .job
                                .error_message
                                .unwrap_or_else(|| "analysis failed".to_string()),
                        });
                        return;
                    }
                    Err(e) => {
                        tracing::warn!(job_id = %job_id, error = %e, "Unknown job state in poll response");
                    }
                }

                if polls >= max_polls {
                    phase_tx.send_replace(ClientPhase::Stalled { job_id });
                    return;
                }
            }
        }
    }
}

fn finish(
    job_id: JobId,
    status: JobStatusResponse,
    baselines: &BaselineProfiles,
    profile: &str,
) -> ClientPhase {
    let Some(report) = status.report else {
        // Done without a visible report should not happen; surface it
        // rather than displaying a partial result.
        return ClientPhase::Failed {
            job_id: Some(job_id),
            error: "report unavailable for completed job".to_string(),
        };
    };

    let evaluation = match baselines.get(profile) {
        Some(ranges) => evaluate(&report.summary_data.metric_sample(), ranges),
        None => {
            tracing::warn!(profile = %profile, "Unknown baseline profile, skipping evaluation");
            BTreeMap::new()
        }
    };

    ClientPhase::Done {
        job_id,
        report: EvaluatedReport {
            overlay_url: report.overlay_signed_url,
            summary: report.summary_data,
            evaluation,
        },
    }
}
