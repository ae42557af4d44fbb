mod passthrough;

pub use passthrough::PassthroughAnalyzer;
