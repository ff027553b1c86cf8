// Performance state detection: tilt, flow and the classifier that resolves them
pub mod classifier;
pub mod flow;
pub mod tilt;

pub use classifier::{
    ClassificationInput, PerformanceState, PerformanceStateClassifier, PerformanceStateKind,
};
pub use flow::{FlowDetector, FlowStateIndicators};
pub use tilt::{TiltAnalysis, TiltDetector, TiltIndicator, TiltIndicatorType};
