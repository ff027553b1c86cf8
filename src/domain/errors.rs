use thiserror::Error;

/// Conditions the analysis engine surfaces to its caller.
///
/// Missing metrics and unstable statistics are recovered inside the engine and
/// never show up here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("Insufficient data: {observed} matches supplied, at least {required} required")]
    InsufficientData { observed: usize, required: usize },

    #[error("Invalid analysis request: {reason}")]
    InvalidRequest { reason: String },
}

impl AnalysisError {
    /// Whether retrying with a larger match window could succeed.
    pub fn is_retryable_with_more_data(&self) -> bool {
        matches!(self, AnalysisError::InsufficientData { .. })
    }
}
