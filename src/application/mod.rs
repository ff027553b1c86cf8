// Raw telemetry normalization
pub mod metric_extractor;

// Analysis pipeline and its output
pub mod analysis_result;
pub mod engine;

// Port-driven orchestration
pub mod analysis_service;

pub use analysis_result::{AnalysisView, EnhancedAnalysisResult, ResultComponent};
pub use analysis_service::AnalysisService;
pub use engine::{EnhancedAnalysisEngine, analyze};
pub use metric_extractor::MetricExtractor;
