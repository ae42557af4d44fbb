use async_trait::async_trait;

use crate::application::ports::{AnalysisOutput, AnalyzerError, VideoAnalyzer};
use crate::domain::AnalysisSummary;

/// Stand-in analyzer: forwards the input as the overlay and emits a
/// minimal summary. Exercises the full pipeline without a pose model.
pub struct PassthroughAnalyzer;

#[async_trait]
impl VideoAnalyzer for PassthroughAnalyzer {
    async fn analyze(&self, video: &[u8]) -> Result<AnalysisOutput, AnalyzerError> {
        if video.is_empty() {
            return Err(AnalyzerError::InvalidVideo("empty source".to_string()));
        }
        Ok(AnalysisOutput {
            overlay: video.to_vec(),
            summary: AnalysisSummary {
                message: Some("Analysis complete".to_string()),
                ..AnalysisSummary::default()
            },
            capture: None,
        })
    }
}
