use std::sync::Arc;

use crate::application::ports::{ArtifactStore, AuthVerifier};
use crate::application::services::JobService;

#[derive(Clone)]
pub struct AppState {
    pub job_service: Arc<JobService>,
    pub artifact_store: Arc<dyn ArtifactStore>,
    pub auth_verifier: Arc<dyn AuthVerifier>,
}
