//! Configuration domain module
//!
//! Domain value objects for the analysis policy, kept separate from the
//! environment/file loading in `crate::config`.

pub mod analysis_config;

pub use analysis_config::{AnalysisConfig, AnalysisConfigError};
