mod artifact_store;
mod auth_verifier;
mod job_repository;
mod repository_error;
mod video_analyzer;

pub use artifact_store::{ArtifactStore, ArtifactStoreError, GrantMode, SignedUrl};
pub use auth_verifier::{AuthError, AuthVerifier};
pub use job_repository::JobRepository;
pub use repository_error::RepositoryError;
pub use video_analyzer::{AnalysisOutput, AnalyzerError, VideoAnalyzer};
