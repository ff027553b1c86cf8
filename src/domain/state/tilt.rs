use crate::domain::config::AnalysisConfig;
use crate::domain::metrics::{Direction, Metric};
use crate::domain::performance::baseline::PersonalBaseline;
use crate::domain::thresholds::AdaptiveThresholdTable;
use crate::domain::types::{MatchMetricVector, Severity};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Slack on σ-band comparisons so a breach of exactly 2σ is not lost to rounding.
const SIGMA_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TiltIndicatorType {
    ReactionTime,
    PreaimDegradation,
    RatingCascade,
    ConsistencyLoss,
    UtilityDecline,
}

impl TiltIndicatorType {
    pub const MONITORED: [TiltIndicatorType; 5] = [
        TiltIndicatorType::RatingCascade,
        TiltIndicatorType::ReactionTime,
        TiltIndicatorType::PreaimDegradation,
        TiltIndicatorType::ConsistencyLoss,
        TiltIndicatorType::UtilityDecline,
    ];

    pub fn metric(&self) -> Metric {
        match self {
            TiltIndicatorType::ReactionTime => Metric::ReactionTime,
            TiltIndicatorType::PreaimDegradation => Metric::Preaim,
            TiltIndicatorType::RatingCascade => Metric::Rating,
            // KAST is the round-to-round consistency measure
            TiltIndicatorType::ConsistencyLoss => Metric::Kast,
            TiltIndicatorType::UtilityDecline => Metric::UtilityEfficiency,
        }
    }
}

impl fmt::Display for TiltIndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TiltIndicatorType::ReactionTime => "reaction_time",
            TiltIndicatorType::PreaimDegradation => "preaim_degradation",
            TiltIndicatorType::RatingCascade => "rating_cascade",
            TiltIndicatorType::ConsistencyLoss => "consistency_loss",
            TiltIndicatorType::UtilityDecline => "utility_decline",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TiltIndicator {
    #[serde(rename = "type")]
    pub indicator_type: TiltIndicatorType,
    pub severity: Severity,
    pub value: f64,
    /// Baseline degradation bound the value breached
    pub threshold: f64,
    /// How far past the baseline, in σ (positive = worse)
    pub breach_sigma: f64,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TiltAnalysis {
    pub active: bool,
    pub severity: Severity,
    pub triggers: Vec<String>,
    pub cascade_length: usize,
    pub recovery_prediction: String,
    pub recommended_action: String,
    pub indicators: Vec<TiltIndicator>,
}

/// Scans a chronological window for degradation cascades.
pub struct TiltDetector {
    tilt_sigma: f64,
    high_sigma: f64,
    min_cascade: usize,
    long_cascade: usize,
    floor_fraction: f64,
}

impl TiltDetector {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            tilt_sigma: config.tilt_sigma,
            high_sigma: config.high_severity_sigma,
            min_cascade: config.min_cascade_length,
            long_cascade: config.long_cascade_length,
            floor_fraction: config.std_dev_floor_fraction,
        }
    }

    /// Value a metric must be worse than to count as degraded.
    pub fn degradation_bound(&self, baseline: &PersonalBaseline) -> f64 {
        let band = self.tilt_sigma * baseline.effective_std_dev(self.floor_fraction);
        match baseline.metric.direction() {
            Direction::HigherIsBetter => baseline.value - band,
            Direction::LowerIsBetter => baseline.value + band,
        }
    }

    fn severity_for(&self, breach_sigma: f64) -> Severity {
        if breach_sigma >= self.high_sigma - SIGMA_TOLERANCE {
            Severity::High
        } else if breach_sigma >= self.tilt_sigma - SIGMA_TOLERANCE {
            Severity::Moderate
        } else {
            Severity::Low
        }
    }

    pub fn detect(
        &self,
        matches: &[MatchMetricVector],
        reference: &BTreeMap<Metric, PersonalBaseline>,
        thresholds: &AdaptiveThresholdTable,
    ) -> TiltAnalysis {
        let indicators: Vec<TiltIndicator> = match matches.last() {
            Some(latest) => TiltIndicatorType::MONITORED
                .iter()
                .filter_map(|&kind| self.indicator(kind, latest, reference, thresholds))
                .collect(),
            None => Vec::new(),
        };

        let rating_baseline = reference.get(&Metric::Rating).filter(|b| b.has_data());
        let cascade_length = rating_baseline
            .map(|b| self.cascade_length(matches, b))
            .unwrap_or(0);
        let active = cascade_length >= self.min_cascade;

        let mut severity = indicators
            .iter()
            .map(|i| i.severity)
            .max()
            .unwrap_or(Severity::Low);
        if active {
            // The cascade itself carries the latest rating's breach severity
            let latest_rating = matches.iter().rev().find_map(|m| m.get(Metric::Rating));
            if let (Some(b), Some(r)) = (rating_baseline, latest_rating) {
                let breach = -b.improvement_sigma(r, self.floor_fraction);
                severity = severity.max(self.severity_for(breach));
            }
        }

        let mut triggers: Vec<String> = indicators
            .iter()
            .map(|i| i.indicator_type.to_string())
            .collect();
        if active && !triggers.iter().any(|t| t == "rating_cascade") {
            triggers.push("rating_cascade".to_string());
        }

        let (recovery_prediction, recommended_action) =
            self.guidance(active, severity, cascade_length);

        TiltAnalysis {
            active,
            severity,
            triggers,
            cascade_length,
            recovery_prediction,
            recommended_action,
            indicators,
        }
    }

    fn indicator(
        &self,
        kind: TiltIndicatorType,
        latest: &MatchMetricVector,
        reference: &BTreeMap<Metric, PersonalBaseline>,
        thresholds: &AdaptiveThresholdTable,
    ) -> Option<TiltIndicator> {
        let metric = kind.metric();
        let value = latest.get(metric)?;
        let baseline = reference.get(&metric).filter(|b| b.has_data())?;

        let bound = self.degradation_bound(baseline);
        if !(metric.is_worse(value, bound) && thresholds.below_solid(metric, value)) {
            return None;
        }

        let breach_sigma = -baseline.improvement_sigma(value, self.floor_fraction);
        let severity = self.severity_for(breach_sigma);
        Some(TiltIndicator {
            indicator_type: kind,
            severity,
            value,
            threshold: bound,
            breach_sigma,
            description: format!(
                "{} {:.2} is {:.1}σ worse than baseline {:.2} and below the {} tier solid level",
                metric.label(),
                value,
                breach_sigma,
                baseline.value,
                thresholds.tier
            ),
        })
    }

    /// Trailing consecutive matches with rating past the degradation bound.
    /// Matches without a rating are skipped, not counted.
    pub fn cascade_length(&self, matches: &[MatchMetricVector], rating: &PersonalBaseline) -> usize {
        let bound = self.degradation_bound(rating);
        matches
            .iter()
            .rev()
            .filter_map(|m| m.get(Metric::Rating))
            .take_while(|&r| Metric::Rating.is_worse(r, bound))
            .count()
    }

    fn guidance(&self, active: bool, severity: Severity, cascade: usize) -> (String, String) {
        if !active {
            return match severity {
                Severity::Low => (
                    "No recovery needed; performance is within the normal range".to_string(),
                    "Continue the current routine".to_string(),
                ),
                _ => (
                    "Single-match dip; usually corrects on the next match".to_string(),
                    "Review the last match's deaths before queuing again".to_string(),
                ),
            };
        }

        match severity {
            Severity::High if cascade >= self.long_cascade => (
                format!(
                    "{} straight matches below baseline; expect one to two sessions before returning to baseline",
                    cascade
                ),
                "Take a break of at least 30 minutes before queuing again".to_string(),
            ),
            Severity::High => (
                "Sharp drop over consecutive matches; recovery likely after rest".to_string(),
                "Stop queuing for this session and review the last matches".to_string(),
            ),
            Severity::Moderate => (
                "Moderate slide; a short reset usually restores baseline within one to two matches"
                    .to_string(),
                "Do a 10-minute warm-up reset (aim map and deathmatch) before the next match"
                    .to_string(),
            ),
            Severity::Low => (
                "Mild slide; likely to self-correct".to_string(),
                "Focus on fundamentals and keep comms positive".to_string(),
            ),
        }
    }
}
