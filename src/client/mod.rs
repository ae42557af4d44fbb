mod api;
mod orchestrator;

pub use api::{AnalysisApi, ClientError, HttpAnalysisApi};
pub use orchestrator::{ClientConfig, ClientPhase, EvaluatedReport, Orchestrator};
