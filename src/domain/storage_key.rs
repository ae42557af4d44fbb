use std::fmt;

use super::{JobId, OwnerId};

/// Opaque reference to a blob in the artifact store. Raw uploads live under
/// a per-owner namespace; processed artifacts under a per-job namespace so
/// retried attempts never collide with other jobs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageKey(String);

impl StorageKey {
    pub fn raw(owner: OwnerId, job: JobId) -> Self {
        Self(format!("raw/{}/{}.webm", owner, job))
    }

    pub fn overlay(job: JobId) -> Self {
        Self(format!("processed/{}/overlay.mp4", job))
    }

    pub fn summary(job: JobId) -> Self {
        Self(format!("processed/{}/summary.json", job))
    }

    pub fn from_raw(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
