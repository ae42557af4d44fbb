use chrono::{DateTime, Utc};

use super::{AnalysisSummary, JobId, StorageKey};

/// Persistent record of a completed analysis. Written exactly once per
/// completed attempt, only after both artifacts are in the store.
#[derive(Debug, Clone)]
pub struct Report {
    pub job_id: JobId,
    pub overlay_key: StorageKey,
    pub summary_key: StorageKey,
    pub created_at: DateTime<Utc>,
}

impl Report {
    pub fn new(job_id: JobId, overlay_key: StorageKey, summary_key: StorageKey) -> Self {
        Self {
            job_id,
            overlay_key,
            summary_key,
            created_at: Utc::now(),
        }
    }
}

/// Report as handed to a client: a fresh time-limited download URL for the
/// overlay and the parsed summary document. Materialized on read, never
/// stored.
#[derive(Debug, Clone)]
pub struct ResolvedReport {
    pub overlay_signed_url: String,
    pub summary: AnalysisSummary,
}
