//! Analysis Policy Domain Value Object
//!
//! Every numeric constant the engine uses to judge a match history lives here:
//! window bounds, σ bands, confidence cutoffs and significance levels. The
//! defaults are a reasonable policy, not ground truth, so all of them can be
//! overridden from a TOML file or the environment (see `crate::config`).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Longest accepted session gap (one week).
pub const MAX_SESSION_GAP_MINUTES: i64 = 7 * 24 * 60;

/// Error type for AnalysisConfig validation
#[derive(Debug, Error, PartialEq)]
pub enum AnalysisConfigError {
    #[error("Invalid window: min_matches = {min}, max_matches = {max}")]
    InvalidWindow { min: usize, max: usize },

    #[error("Invalid sigma band: {field} = {value}. Must be positive")]
    InvalidSigma { field: String, value: f64 },

    #[error("Invalid p-value cutoffs: high = {high}, moderate = {moderate}")]
    InvalidSignificance { high: f64, moderate: f64 },

    #[error("Invalid confidence cutoffs: medium = {medium}, high = {high}")]
    InvalidConfidenceCutoffs { medium: usize, high: usize },

    #[error("Invalid limit: {field} = {value}. Must be positive")]
    InvalidLimit { field: String, value: usize },

    #[error("Invalid session gap: {value} minutes. Must be between 1 and {max}")]
    InvalidSessionGap { value: i64, max: i64 },
}

/// Analysis policy value object
///
/// # Invariants
///
/// - `2 <= min_matches <= max_matches`
/// - every σ band is strictly positive
/// - `0 < high_significance_p < moderate_significance_p < 1`
/// - `confidence_medium_min < confidence_high_min`
/// - `1 <= session_gap_minutes <= MAX_SESSION_GAP_MINUTES`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Fewer matches than this is the insufficient-data condition
    pub min_matches: usize,
    /// Larger windows are truncated to the most recent `max_matches`
    pub max_matches: usize,

    /// z used for baseline confidence intervals (1.96 = 95%)
    pub ci_z: f64,
    /// Sample size at which a baseline becomes `medium` confidence
    pub confidence_medium_min: usize,
    /// Sample size at which a baseline becomes `high` confidence
    pub confidence_high_min: usize,
    /// Std-dev floor as a fraction of |mean|, used for z-scores
    pub std_dev_floor_fraction: f64,

    /// Trailing matches evaluated against the reference baseline
    pub recent_window: usize,
    /// Degradation band for tilt, in standard deviations
    pub tilt_sigma: f64,
    /// Breach beyond this many σ is `high` severity
    pub high_severity_sigma: f64,
    /// Cascade length from which tilt is considered active
    pub min_cascade_length: usize,
    /// Cascade length treated as a long cascade in recommendations
    pub long_cascade_length: usize,

    /// Positive deviation band for flow, in standard deviations
    pub flow_sigma: f64,
    /// Each linked metric must deviate at least this far, in opposite directions
    pub mechanical_divergence_sigma: f64,

    /// Minimum paired samples before a correlation is computed
    pub correlation_min_samples: usize,
    pub high_significance_p: f64,
    pub moderate_significance_p: f64,
    /// Maximum number of primary performance drivers reported
    pub top_drivers: usize,
    /// Minimum |r| for a sign contradiction to count as surprising
    pub surprising_min_coefficient: f64,

    /// Matches examined for trend-risk alerts
    pub trend_window: usize,
    /// Gap that starts a new play session when positions are derived
    pub session_gap_minutes: i64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            min_matches: 5,
            max_matches: 50,
            ci_z: 1.96,
            confidence_medium_min: 5,
            confidence_high_min: 15,
            std_dev_floor_fraction: 0.02,
            recent_window: 3,
            tilt_sigma: 1.0,
            high_severity_sigma: 2.0,
            min_cascade_length: 2,
            long_cascade_length: 3,
            flow_sigma: 1.0,
            mechanical_divergence_sigma: 1.0,
            correlation_min_samples: 5,
            high_significance_p: 0.01,
            moderate_significance_p: 0.05,
            top_drivers: 3,
            surprising_min_coefficient: 0.3,
            trend_window: 3,
            session_gap_minutes: 90,
        }
    }
}

impl AnalysisConfig {
    /// Validate all invariants
    pub fn validate(&self) -> Result<(), AnalysisConfigError> {
        if self.min_matches < 2 || self.min_matches > self.max_matches {
            return Err(AnalysisConfigError::InvalidWindow {
                min: self.min_matches,
                max: self.max_matches,
            });
        }

        for (field, value) in [
            ("ci_z", self.ci_z),
            ("tilt_sigma", self.tilt_sigma),
            ("high_severity_sigma", self.high_severity_sigma),
            ("flow_sigma", self.flow_sigma),
            ("mechanical_divergence_sigma", self.mechanical_divergence_sigma),
            ("std_dev_floor_fraction", self.std_dev_floor_fraction),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(AnalysisConfigError::InvalidSigma {
                    field: field.to_string(),
                    value,
                });
            }
        }

        if !(0.0 < self.high_significance_p
            && self.high_significance_p < self.moderate_significance_p
            && self.moderate_significance_p < 1.0)
        {
            return Err(AnalysisConfigError::InvalidSignificance {
                high: self.high_significance_p,
                moderate: self.moderate_significance_p,
            });
        }

        if self.confidence_medium_min >= self.confidence_high_min {
            return Err(AnalysisConfigError::InvalidConfidenceCutoffs {
                medium: self.confidence_medium_min,
                high: self.confidence_high_min,
            });
        }

        for (field, value) in [
            ("recent_window", self.recent_window),
            ("min_cascade_length", self.min_cascade_length),
            ("top_drivers", self.top_drivers),
            ("trend_window", self.trend_window),
        ] {
            if value == 0 {
                return Err(AnalysisConfigError::InvalidLimit {
                    field: field.to_string(),
                    value,
                });
            }
        }

        // Below 3 paired samples a t-test has no degrees of freedom left
        if self.correlation_min_samples < 3 {
            return Err(AnalysisConfigError::InvalidLimit {
                field: "correlation_min_samples".to_string(),
                value: self.correlation_min_samples,
            });
        }

        if !(1..=MAX_SESSION_GAP_MINUTES).contains(&self.session_gap_minutes) {
            return Err(AnalysisConfigError::InvalidSessionGap {
                value: self.session_gap_minutes,
                max: MAX_SESSION_GAP_MINUTES,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(AnalysisConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_window() {
        let config = AnalysisConfig {
            min_matches: 10,
            max_matches: 5,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(AnalysisConfigError::InvalidWindow { min: 10, max: 5 })
        );
    }

    #[test]
    fn test_significance_cutoffs_out_of_order() {
        let config = AnalysisConfig {
            high_significance_p: 0.05,
            moderate_significance_p: 0.01,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(AnalysisConfigError::InvalidSignificance { .. })
        ));
    }

    #[test]
    fn test_non_positive_sigma() {
        let config = AnalysisConfig {
            tilt_sigma: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(AnalysisConfigError::InvalidSigma { field, .. }) if field == "tilt_sigma"
        ));
    }

    #[test]
    fn test_session_gap_out_of_range() {
        for gap in [i64::MAX, 0, -30, MAX_SESSION_GAP_MINUTES + 1] {
            let config = AnalysisConfig {
                session_gap_minutes: gap,
                ..Default::default()
            };
            assert_eq!(
                config.validate(),
                Err(AnalysisConfigError::InvalidSessionGap {
                    value: gap,
                    max: MAX_SESSION_GAP_MINUTES
                })
            );
        }
        let week = AnalysisConfig {
            session_gap_minutes: MAX_SESSION_GAP_MINUTES,
            ..Default::default()
        };
        assert!(week.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: AnalysisConfig = toml::from_str("tilt_sigma = 1.5\ntop_drivers = 5\n").unwrap();
        assert_eq!(config.tilt_sigma, 1.5);
        assert_eq!(config.top_drivers, 5);
        assert_eq!(config.min_matches, 5);
    }
}
