mod artifacts;
mod auth;
mod create_job;
mod health;
mod job_status;
mod trigger;

pub use artifacts::{download_artifact_handler, upload_artifact_handler};
pub use auth::authenticate;
pub use create_job::{create_job_handler, CreateJobResponse};
pub use health::health_handler;
pub use job_status::{job_status_handler, JobStatusResponse, JobView, ReportView};
pub use trigger::{trigger_handler, TriggerResponse};
