use crate::application::analysis_result::EnhancedAnalysisResult;
use crate::domain::config::{AnalysisConfig, AnalysisConfigError};
use crate::domain::correlation::CorrelationAnalyzer;
use crate::domain::errors::AnalysisError;
use crate::domain::metrics::Metric;
use crate::domain::patterns::PatternRecognizer;
use crate::domain::performance::{BaselineTracker, ExtendedProcessedStats, PersonalBaseline};
use crate::domain::state::{
    ClassificationInput, FlowDetector, PerformanceStateClassifier, TiltDetector,
};
use crate::domain::thresholds::AdaptiveThresholdTable;
use crate::domain::types::{ConfidenceLevel, MatchMetricVector, metric_values};
use crate::domain::warnings::{PredictiveWarningSystem, WarningInput};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Turns a chronological match window into an [`EnhancedAnalysisResult`].
///
/// Stateless: holds only the analysis policy, so one engine can serve
/// concurrent requests for different players.
#[derive(Debug, Clone, Default)]
pub struct EnhancedAnalysisEngine {
    config: AnalysisConfig,
}

impl EnhancedAnalysisEngine {
    /// Create an engine, rejecting an inconsistent policy.
    pub fn new(config: AnalysisConfig) -> Result<Self, AnalysisConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyze a player's match history (oldest first).
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::InsufficientData` when fewer than
    /// `min_matches` matches are supplied.
    pub fn analyze(
        &self,
        history: &[MatchMetricVector],
        player_id: &str,
        premier_rating: Option<u32>,
    ) -> Result<EnhancedAnalysisResult, AnalysisError> {
        let cfg = &self.config;
        if history.len() < cfg.min_matches {
            return Err(AnalysisError::InsufficientData {
                observed: history.len(),
                required: cfg.min_matches,
            });
        }

        let mut warnings = Vec::new();
        let window = if history.len() > cfg.max_matches {
            warn!(
                "Player {}: truncating {} matches to the most recent {}",
                player_id,
                history.len(),
                cfg.max_matches
            );
            warnings.push(format!(
                "Window truncated from {} to the most recent {} matches",
                history.len(),
                cfg.max_matches
            ));
            &history[history.len() - cfg.max_matches..]
        } else {
            history
        };
        // Length checked above
        let latest = &window[window.len() - 1];

        info!(
            "Analyzing player {} over {} matches (premier rating: {:?})",
            player_id,
            window.len(),
            premier_rating
        );

        let thresholds = AdaptiveThresholdTable::for_premier_rating(premier_rating);
        if premier_rating.is_none() {
            warnings.push(format!(
                "No premier rating supplied; using the {} tier thresholds",
                thresholds.tier
            ));
        }

        let tracker = BaselineTracker::new(cfg);
        let baselines = tracker.compute_all(window);
        let reference = tracker.compute_all(tracker.reference_window(window));
        warnings.extend(baseline_warnings(&baselines, window));

        let tilt = TiltDetector::new(cfg).detect(window, &reference, &thresholds);
        let flow = FlowDetector::new(cfg).detect(window, &reference, &thresholds);
        let performance_state =
            PerformanceStateClassifier::new(cfg).classify(&ClassificationInput {
                tilt: &tilt,
                flow: &flow,
                latest,
                reference: &reference,
            });

        let correlation = CorrelationAnalyzer::new(cfg).analyze(window);
        for metric in &correlation.insufficient_metrics {
            warnings.push(format!(
                "Correlation for {} skipped: fewer than {} paired samples",
                metric.as_str(),
                cfg.correlation_min_samples
            ));
        }

        let rating_baseline = baselines
            .get(&Metric::Rating)
            .cloned()
            .unwrap_or_else(|| PersonalBaseline::empty(Metric::Rating));
        let patterns =
            PatternRecognizer::new(cfg.std_dev_floor_fraction).analyze(window, &rating_baseline);

        let predictive_warnings = PredictiveWarningSystem::new(cfg).evaluate(&WarningInput {
            matches: window,
            tilt: &tilt,
            state: &performance_state,
            correlation: &correlation,
            thresholds: &thresholds,
        });

        let current_stats = ExtendedProcessedStats::build(
            latest,
            window.len(),
            &baselines,
            cfg.std_dev_floor_fraction,
        );

        debug!(
            "Player {}: state {} (confidence {:.2}), {} alerts",
            player_id,
            performance_state.state,
            performance_state.confidence,
            predictive_warnings.alerts.len()
        );

        Ok(EnhancedAnalysisResult {
            player_id: player_id.to_string(),
            generated_at: latest.timestamp,
            matches_analyzed: window.len(),
            thresholds,
            current_stats,
            baselines,
            tilt_analysis: tilt,
            flow_state: flow,
            performance_state,
            correlation_analysis: correlation,
            patterns,
            predictive_warnings,
            warnings,
        })
    }
}

/// Analyze with the default policy.
pub fn analyze(
    history: &[MatchMetricVector],
    player_id: &str,
    premier_rating: Option<u32>,
) -> Result<EnhancedAnalysisResult, AnalysisError> {
    EnhancedAnalysisEngine::default().analyze(history, player_id, premier_rating)
}

fn baseline_warnings(
    baselines: &BTreeMap<Metric, PersonalBaseline>,
    window: &[MatchMetricVector],
) -> Vec<String> {
    let mut out = Vec::new();
    for (metric, b) in baselines {
        let present = metric_values(window, *metric).len();
        if present < window.len() {
            out.push(format!(
                "{} missing in {} of {} matches",
                metric.as_str(),
                window.len() - present,
                window.len()
            ));
        }
        if present > 0 && !b.has_data() {
            out.push(format!(
                "{} baseline discarded: values exceed the numeric range",
                metric.as_str()
            ));
        }
        if b.has_data() && b.confidence_level == ConfidenceLevel::Low {
            out.push(format!(
                "{} baseline has low confidence ({} samples)",
                metric.as_str(),
                b.sample_size
            ));
        }
    }
    out
}
