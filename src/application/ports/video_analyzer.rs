use async_trait::async_trait;

use crate::domain::{AnalysisSummary, CaptureMetadata};

/// Everything a single analysis pass produces: the annotated overlay, the
/// summary document, and whatever the analyzer could probe about the
/// source video.
#[derive(Debug, Clone)]
pub struct AnalysisOutput {
    pub overlay: Vec<u8>,
    pub summary: AnalysisSummary,
    pub capture: Option<CaptureMetadata>,
}

/// The pluggable analysis routine. The bundled stand-in forwards the input
/// as the overlay; a real implementation runs pose estimation and fills in
/// metrics, key frames, and recommendations.
#[async_trait]
pub trait VideoAnalyzer: Send + Sync {
    async fn analyze(&self, video: &[u8]) -> Result<AnalysisOutput, AnalyzerError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AnalyzerError {
    #[error("source video unreadable: {0}")]
    InvalidVideo(String),
    #[error("analysis failed: {0}")]
    Failed(String),
}
