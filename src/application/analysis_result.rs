use crate::domain::correlation::CorrelationAnalysis;
use crate::domain::metrics::Metric;
use crate::domain::patterns::PatternAnalysis;
use crate::domain::performance::{ExtendedProcessedStats, PersonalBaseline};
use crate::domain::state::{FlowStateIndicators, PerformanceState, TiltAnalysis};
use crate::domain::thresholds::AdaptiveThresholdTable;
use crate::domain::warnings::PredictiveWarnings;
use anyhow::bail;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Everything one analysis run produced. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancedAnalysisResult {
    pub player_id: String,
    /// Timestamp of the most recent analysed match
    pub generated_at: DateTime<Utc>,
    pub matches_analyzed: usize,
    pub thresholds: AdaptiveThresholdTable,
    pub current_stats: ExtendedProcessedStats,
    pub baselines: BTreeMap<Metric, PersonalBaseline>,
    pub tilt_analysis: TiltAnalysis,
    pub flow_state: FlowStateIndicators,
    pub performance_state: PerformanceState,
    pub correlation_analysis: CorrelationAnalysis,
    pub patterns: PatternAnalysis,
    pub predictive_warnings: PredictiveWarnings,
    /// Data-quality caveats
    pub warnings: Vec<String>,
}

/// Named slice of the result a consumer can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultComponent {
    TiltDetection,
    PerformanceState,
    CorrelationAnalysis,
    PatternRecognition,
    All,
}

impl FromStr for ResultComponent {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tilt_detection" => Ok(ResultComponent::TiltDetection),
            "performance_state" => Ok(ResultComponent::PerformanceState),
            "correlation_analysis" => Ok(ResultComponent::CorrelationAnalysis),
            "pattern_recognition" => Ok(ResultComponent::PatternRecognition),
            "all" => Ok(ResultComponent::All),
            _ => bail!(
                "Invalid component: {}. Must be 'tilt_detection', 'performance_state', 'correlation_analysis', 'pattern_recognition' or 'all'",
                s
            ),
        }
    }
}

impl fmt::Display for ResultComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultComponent::TiltDetection => write!(f, "tilt_detection"),
            ResultComponent::PerformanceState => write!(f, "performance_state"),
            ResultComponent::CorrelationAnalysis => write!(f, "correlation_analysis"),
            ResultComponent::PatternRecognition => write!(f, "pattern_recognition"),
            ResultComponent::All => write!(f, "all"),
        }
    }
}

/// Borrowed, serializable projection of a result.
#[derive(Debug, Serialize)]
#[serde(untagged, rename_all_fields = "camelCase")]
pub enum AnalysisView<'a> {
    TiltDetection {
        player_id: &'a str,
        generated_at: DateTime<Utc>,
        tilt_analysis: &'a TiltAnalysis,
        flow_state: &'a FlowStateIndicators,
        predictive_warnings: &'a PredictiveWarnings,
        warnings: &'a [String],
    },
    PerformanceState {
        player_id: &'a str,
        generated_at: DateTime<Utc>,
        performance_state: &'a PerformanceState,
        current_stats: &'a ExtendedProcessedStats,
        warnings: &'a [String],
    },
    CorrelationAnalysis {
        player_id: &'a str,
        generated_at: DateTime<Utc>,
        correlation_analysis: &'a CorrelationAnalysis,
        warnings: &'a [String],
    },
    PatternRecognition {
        player_id: &'a str,
        generated_at: DateTime<Utc>,
        patterns: &'a PatternAnalysis,
        warnings: &'a [String],
    },
    All(&'a EnhancedAnalysisResult),
}

impl EnhancedAnalysisResult {
    pub fn view(&self, component: ResultComponent) -> AnalysisView<'_> {
        match component {
            ResultComponent::TiltDetection => AnalysisView::TiltDetection {
                player_id: &self.player_id,
                generated_at: self.generated_at,
                tilt_analysis: &self.tilt_analysis,
                flow_state: &self.flow_state,
                predictive_warnings: &self.predictive_warnings,
                warnings: &self.warnings,
            },
            ResultComponent::PerformanceState => AnalysisView::PerformanceState {
                player_id: &self.player_id,
                generated_at: self.generated_at,
                performance_state: &self.performance_state,
                current_stats: &self.current_stats,
                warnings: &self.warnings,
            },
            ResultComponent::CorrelationAnalysis => AnalysisView::CorrelationAnalysis {
                player_id: &self.player_id,
                generated_at: self.generated_at,
                correlation_analysis: &self.correlation_analysis,
                warnings: &self.warnings,
            },
            ResultComponent::PatternRecognition => AnalysisView::PatternRecognition {
                player_id: &self.player_id,
                generated_at: self.generated_at,
                patterns: &self.patterns,
                warnings: &self.warnings,
            },
            ResultComponent::All => AnalysisView::All(self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_parsing() {
        assert_eq!(
            "tilt_detection".parse::<ResultComponent>().unwrap(),
            ResultComponent::TiltDetection
        );
        assert_eq!("ALL".parse::<ResultComponent>().unwrap(), ResultComponent::All);
        assert!("everything".parse::<ResultComponent>().is_err());
    }

    #[test]
    fn test_component_display_round_trips() {
        for c in [
            ResultComponent::TiltDetection,
            ResultComponent::PerformanceState,
            ResultComponent::CorrelationAnalysis,
            ResultComponent::PatternRecognition,
            ResultComponent::All,
        ] {
            assert_eq!(c.to_string().parse::<ResultComponent>().unwrap(), c);
        }
    }
}
