mod analysis_worker;
mod job_service;

pub use analysis_worker::{AnalysisMessage, AnalysisWorker, WorkerError};
pub use job_service::{JobService, JobServiceError};
