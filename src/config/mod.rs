//! Configuration module for Tiltwatch.
//!
//! Loading order: built-in defaults, then an optional TOML policy file, then
//! `TILTWATCH_*` environment variables.

mod analysis_env_config;
mod observability_config;

pub use analysis_env_config::AnalysisEnvConfig;
pub use observability_config::ObservabilityEnvConfig;

pub use crate::domain::config::AnalysisConfig;
use anyhow::{Context, Result};
use std::path::Path;

/// Main application configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub analysis: AnalysisConfig,
    pub observability: ObservabilityEnvConfig,
}

impl Config {
    /// Load configuration from environment variables only.
    pub fn from_env() -> Result<Self> {
        Self::load(None)
    }

    /// Load configuration, reading the analysis policy from `policy_file`
    /// first when one is given.
    pub fn load(policy_file: Option<&Path>) -> Result<Self> {
        let base = match policy_file {
            Some(path) => load_policy_from_toml(path)?,
            None => AnalysisConfig::default(),
        };
        let analysis =
            AnalysisEnvConfig::apply(base).context("Failed to load analysis config")?;
        analysis
            .validate()
            .context("Analysis config failed validation")?;

        Ok(Self {
            analysis,
            observability: ObservabilityEnvConfig::from_env(),
        })
    }
}

/// Loads an analysis policy from a TOML file. Missing keys keep their defaults.
pub fn load_policy_from_toml(path: &Path) -> Result<AnalysisConfig> {
    let content = std::fs::read_to_string(path)
        .context(format!("Failed to read policy file: {}", path.display()))?;
    let policy: AnalysisConfig = toml::from_str(&content)
        .context(format!("Failed to parse policy TOML: {}", path.display()))?;
    Ok(policy)
}
