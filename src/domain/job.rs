use chrono::{DateTime, Utc};

use super::{JobId, JobState, OwnerId, StorageKey};

/// Frame rate and dimensions probed from the uploaded video. Absent until
/// the analysis worker has decoded the source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureMetadata {
    pub fps: u32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone)]
pub struct Job {
    pub id: JobId,
    pub owner_id: OwnerId,
    pub state: JobState,
    pub storage_key: StorageKey,
    pub error_message: Option<String>,
    pub capture: Option<CaptureMetadata>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    pub fn new(owner_id: OwnerId) -> Self {
        let id = JobId::new();
        let now = Utc::now();
        Self {
            id,
            owner_id,
            state: JobState::Queued,
            storage_key: StorageKey::raw(owner_id, id),
            error_message: None,
            capture: None,
            created_at: now,
            updated_at: now,
        }
    }
}
