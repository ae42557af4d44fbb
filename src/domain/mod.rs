mod baseline;
mod job;
mod job_id;
mod job_state;
mod owner_id;
mod report;
mod storage_key;
mod summary;

pub use baseline::{
    baseline_status, evaluate, BaselineProfile, BaselineProfiles, BaselineRange, BaselineStatus,
};
pub use job::{CaptureMetadata, Job};
pub use job_id::JobId;
pub use job_state::JobState;
pub use owner_id::OwnerId;
pub use report::{Report, ResolvedReport};
pub use storage_key::StorageKey;
pub use summary::{
    AnalysisSummary, AngleMetrics, KeyFrames, MetricSample, Recommendation, TimingMetrics,
    METRIC_ARM_COCK_PEAK_DEG, METRIC_ELBOW_EXTENSION_PEAK_DEG, METRIC_JUMP_TIME_S,
    METRIC_PENULTIMATE_LAST_RATIO, METRIC_TIME_TO_CONTACT_S, METRIC_TORSO_LEAN_DEG,
};
