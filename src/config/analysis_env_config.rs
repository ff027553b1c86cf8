//! Analysis policy overrides from environment variables.
//!
//! Every `AnalysisConfig` field can be set through `TILTWATCH_<FIELD>`, e.g.
//! `TILTWATCH_TILT_SIGMA=1.5`. Unset variables keep the value they already had.

use crate::domain::config::AnalysisConfig;
use anyhow::{Context, Result};
use std::env;

pub struct AnalysisEnvConfig;

impl AnalysisEnvConfig {
    /// Apply environment overrides on top of `base`.
    pub fn apply(base: AnalysisConfig) -> Result<AnalysisConfig> {
        Ok(AnalysisConfig {
            min_matches: Self::parse_usize("TILTWATCH_MIN_MATCHES", base.min_matches)?,
            max_matches: Self::parse_usize("TILTWATCH_MAX_MATCHES", base.max_matches)?,
            ci_z: Self::parse_f64("TILTWATCH_CI_Z", base.ci_z)?,
            confidence_medium_min: Self::parse_usize(
                "TILTWATCH_CONFIDENCE_MEDIUM_MIN",
                base.confidence_medium_min,
            )?,
            confidence_high_min: Self::parse_usize(
                "TILTWATCH_CONFIDENCE_HIGH_MIN",
                base.confidence_high_min,
            )?,
            std_dev_floor_fraction: Self::parse_f64(
                "TILTWATCH_STD_DEV_FLOOR_FRACTION",
                base.std_dev_floor_fraction,
            )?,
            recent_window: Self::parse_usize("TILTWATCH_RECENT_WINDOW", base.recent_window)?,
            tilt_sigma: Self::parse_f64("TILTWATCH_TILT_SIGMA", base.tilt_sigma)?,
            high_severity_sigma: Self::parse_f64(
                "TILTWATCH_HIGH_SEVERITY_SIGMA",
                base.high_severity_sigma,
            )?,
            min_cascade_length: Self::parse_usize(
                "TILTWATCH_MIN_CASCADE_LENGTH",
                base.min_cascade_length,
            )?,
            long_cascade_length: Self::parse_usize(
                "TILTWATCH_LONG_CASCADE_LENGTH",
                base.long_cascade_length,
            )?,
            flow_sigma: Self::parse_f64("TILTWATCH_FLOW_SIGMA", base.flow_sigma)?,
            mechanical_divergence_sigma: Self::parse_f64(
                "TILTWATCH_MECHANICAL_DIVERGENCE_SIGMA",
                base.mechanical_divergence_sigma,
            )?,
            correlation_min_samples: Self::parse_usize(
                "TILTWATCH_CORRELATION_MIN_SAMPLES",
                base.correlation_min_samples,
            )?,
            high_significance_p: Self::parse_f64(
                "TILTWATCH_HIGH_SIGNIFICANCE_P",
                base.high_significance_p,
            )?,
            moderate_significance_p: Self::parse_f64(
                "TILTWATCH_MODERATE_SIGNIFICANCE_P",
                base.moderate_significance_p,
            )?,
            top_drivers: Self::parse_usize("TILTWATCH_TOP_DRIVERS", base.top_drivers)?,
            surprising_min_coefficient: Self::parse_f64(
                "TILTWATCH_SURPRISING_MIN_COEFFICIENT",
                base.surprising_min_coefficient,
            )?,
            trend_window: Self::parse_usize("TILTWATCH_TREND_WINDOW", base.trend_window)?,
            session_gap_minutes: Self::parse_i64(
                "TILTWATCH_SESSION_GAP_MINUTES",
                base.session_gap_minutes,
            )?,
        })
    }

    fn parse_usize(key: &str, default: usize) -> Result<usize> {
        env::var(key)
            .unwrap_or_else(|_| default.to_string())
            .parse::<usize>()
            .context(format!("Failed to parse {}", key))
    }

    fn parse_f64(key: &str, default: f64) -> Result<f64> {
        env::var(key)
            .unwrap_or_else(|_| default.to_string())
            .parse::<f64>()
            .context(format!("Failed to parse {}", key))
    }

    fn parse_i64(key: &str, default: i64) -> Result<i64> {
        env::var(key)
            .unwrap_or_else(|_| default.to_string())
            .parse::<i64>()
            .context(format!("Failed to parse {}", key))
    }
}
