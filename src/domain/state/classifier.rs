use crate::domain::config::AnalysisConfig;
use crate::domain::metrics::Metric;
use crate::domain::performance::baseline::{BaselineTracker, PersonalBaseline};
use crate::domain::state::flow::FlowStateIndicators;
use crate::domain::state::tilt::TiltAnalysis;
use crate::domain::types::{MatchMetricVector, Severity};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Mechanically linked metric pairs checked for opposite-direction divergence.
const MECHANICAL_PAIRS: [(Metric, Metric); 4] = [
    (Metric::ReactionTime, Metric::Preaim),
    (Metric::HeadshotPct, Metric::SprayAccuracy),
    (Metric::Preaim, Metric::HeadshotPct),
    (Metric::ReactionTime, Metric::SprayAccuracy),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceStateKind {
    MechanicalInconsistency,
    TiltCascade,
    FlowState,
    BaselineNormal,
}

impl fmt::Display for PerformanceStateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PerformanceStateKind::MechanicalInconsistency => write!(f, "mechanical_inconsistency"),
            PerformanceStateKind::TiltCascade => write!(f, "tilt_cascade"),
            PerformanceStateKind::FlowState => write!(f, "flow_state"),
            PerformanceStateKind::BaselineNormal => write!(f, "baseline_normal"),
        }
    }
}

/// Exactly one state per evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceState {
    pub state: PerformanceStateKind,
    pub confidence: f64,
    pub evidence: Vec<String>,
    pub baseline_deviation: BTreeMap<Metric, String>,
}

/// Inputs every precedence rule may look at.
pub struct ClassificationInput<'a> {
    pub tilt: &'a TiltAnalysis,
    pub flow: &'a FlowStateIndicators,
    pub latest: &'a MatchMetricVector,
    pub reference: &'a BTreeMap<Metric, PersonalBaseline>,
}

/// Resolves detector output into a single performance state.
pub struct PerformanceStateClassifier {
    tracker: BaselineTracker,
    divergence_sigma: f64,
    floor_fraction: f64,
}

impl PerformanceStateClassifier {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            tracker: BaselineTracker::new(config),
            divergence_sigma: config.mechanical_divergence_sigma,
            floor_fraction: config.std_dev_floor_fraction,
        }
    }

    /// First matching rule wins: tilt, flow, mechanical inconsistency, normal.
    pub fn classify(&self, input: &ClassificationInput<'_>) -> PerformanceState {
        let (state, confidence, evidence) = self
            .tilt_rule(input)
            .or_else(|| self.flow_rule(input))
            .or_else(|| self.mechanical_rule(input))
            .unwrap_or_else(|| self.normal_rule(input));

        PerformanceState {
            state,
            confidence: confidence.clamp(0.0, 1.0),
            evidence,
            baseline_deviation: self.deviation_summary(input),
        }
    }

    fn sample_weight(&self, input: &ClassificationInput<'_>, metric: Metric) -> f64 {
        let n = input.reference.get(&metric).map_or(0, |b| b.sample_size);
        0.5 + 0.5 * self.tracker.sample_confidence(n)
    }

    fn tilt_rule(
        &self,
        input: &ClassificationInput<'_>,
    ) -> Option<(PerformanceStateKind, f64, Vec<String>)> {
        let tilt = input.tilt;
        if !(tilt.active && tilt.severity == Severity::High) {
            return None;
        }

        let mut evidence = vec![format!(
            "{} consecutive matches below rating baseline",
            tilt.cascade_length
        )];
        evidence.extend(tilt.indicators.iter().map(|i| i.description.clone()));

        let breach = input
            .reference
            .get(&Metric::Rating)
            .zip(input.latest.get(Metric::Rating))
            .map(|(b, r)| -b.improvement_sigma(r, self.floor_fraction))
            .unwrap_or(0.0)
            .max(0.0);
        let strength = (0.5 + 0.05 * breach + 0.05 * tilt.cascade_length as f64).min(1.0);
        let confidence = strength * self.sample_weight(input, Metric::Rating);
        Some((PerformanceStateKind::TiltCascade, confidence, evidence))
    }

    fn flow_rule(
        &self,
        input: &ClassificationInput<'_>,
    ) -> Option<(PerformanceStateKind, f64, Vec<String>)> {
        let flow = input.flow;
        if !flow.recent_occurrence {
            return None;
        }

        let mut evidence = vec![format!("Rating {}", flow.performance_boost)];
        if !flow.triggers.is_empty() {
            evidence.push(format!("Above excellent level: {}", flow.triggers.join(", ")));
        }
        if flow.streak_length > 1 {
            evidence.push(format!("{} straight standout matches", flow.streak_length));
        }

        let strength = (0.5 + 0.1 * flow.peak_deviation.max(0.0) + 0.05 * flow.streak_length as f64)
            .min(1.0);
        let confidence = strength * self.sample_weight(input, Metric::Rating);
        Some((PerformanceStateKind::FlowState, confidence, evidence))
    }

    fn mechanical_rule(
        &self,
        input: &ClassificationInput<'_>,
    ) -> Option<(PerformanceStateKind, f64, Vec<String>)> {
        let mut best: Option<(f64, String, Metric)> = None;

        for (a, b) in MECHANICAL_PAIRS {
            let (Some(za), Some(zb)) = (self.improvement(input, a), self.improvement(input, b))
            else {
                continue;
            };
            if za * zb >= 0.0 || za.abs() < self.divergence_sigma || zb.abs() < self.divergence_sigma
            {
                continue;
            }
            let spread = (za - zb).abs();
            if best.as_ref().is_none_or(|(s, _, _)| spread > *s) {
                let evidence = format!(
                    "{} {:+.1}σ vs {} {:+.1}σ relative to baseline",
                    a.label(),
                    za,
                    b.label(),
                    zb
                );
                best = Some((spread, evidence, a));
            }
        }

        best.map(|(spread, evidence, metric)| {
            let strength = (0.4 + 0.1 * spread).min(0.95);
            let confidence = strength * self.sample_weight(input, metric);
            (
                PerformanceStateKind::MechanicalInconsistency,
                confidence,
                vec![evidence],
            )
        })
    }

    fn normal_rule(&self, input: &ClassificationInput<'_>) -> (PerformanceStateKind, f64, Vec<String>) {
        let deviations: Vec<f64> = Metric::ALL
            .iter()
            .filter_map(|&m| self.improvement(input, m))
            .collect();
        let mean_abs = if deviations.is_empty() {
            0.0
        } else {
            deviations.iter().map(|z| z.abs()).sum::<f64>() / deviations.len() as f64
        };

        let evidence = vec![format!(
            "{} metrics within {:.1}σ of baseline on average",
            deviations.len(),
            mean_abs
        )];
        let strength = (1.0 - mean_abs / 3.0).clamp(0.2, 1.0);
        let confidence = strength * self.sample_weight(input, Metric::Rating);
        (PerformanceStateKind::BaselineNormal, confidence, evidence)
    }

    /// Latest match's improvement over the reference baseline, in σ.
    fn improvement(&self, input: &ClassificationInput<'_>, metric: Metric) -> Option<f64> {
        let baseline = input.reference.get(&metric).filter(|b| b.sample_size >= 2)?;
        let value = input.latest.get(metric)?;
        Some(baseline.improvement_sigma(value, self.floor_fraction))
    }

    fn deviation_summary(&self, input: &ClassificationInput<'_>) -> BTreeMap<Metric, String> {
        input
            .reference
            .iter()
            .filter(|(_, b)| b.has_data())
            .filter_map(|(&metric, b)| {
                let value = input.latest.get(metric)?;
                let z = b.deviation(value, self.floor_fraction);
                let text = if z.abs() < 0.5 {
                    format!("within baseline ({:.2} vs {:.2})", value, b.value)
                } else {
                    format!(
                        "{:+.1}σ {} baseline ({:.2} vs {:.2})",
                        z,
                        if z > 0.0 { "above" } else { "below" },
                        value,
                        b.value
                    )
                };
                Some((metric, text))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::state::flow::FlowStateIndicators;
    use chrono::{Duration, TimeZone, Utc};

    fn quiet_tilt() -> TiltAnalysis {
        TiltAnalysis {
            active: false,
            severity: Severity::Low,
            triggers: Vec::new(),
            cascade_length: 0,
            recovery_prediction: String::new(),
            recommended_action: String::new(),
            indicators: Vec::new(),
        }
    }

    fn history() -> Vec<MatchMetricVector> {
        let start = Utc.with_ymd_and_hms(2025, 7, 1, 20, 0, 0).unwrap();
        (0..8)
            .map(|i| {
                let jitter = if i % 2 == 0 { 1.0 } else { -1.0 };
                MatchMetricVector::empty(start + Duration::hours(i), "de_vertigo")
                    .with(Metric::Rating, Some(1.05 + 0.02 * jitter))
                    .with(Metric::ReactionTime, Some(550.0 + 15.0 * jitter))
                    .with(Metric::Preaim, Some(9.0 + 0.4 * jitter))
            })
            .collect()
    }

    fn classify(latest: MatchMetricVector, tilt: &TiltAnalysis) -> PerformanceState {
        let config = AnalysisConfig::default();
        let tracker = BaselineTracker::new(&config);
        let reference = tracker.compute_all(&history());
        let flow = FlowStateIndicators::none();
        PerformanceStateClassifier::new(&config).classify(&ClassificationInput {
            tilt,
            flow: &flow,
            latest: &latest,
            reference: &reference,
        })
    }

    #[test]
    fn test_diverging_reaction_and_preaim_is_mechanical() {
        let ts = Utc.with_ymd_and_hms(2025, 7, 2, 20, 0, 0).unwrap();
        // Reaction time much faster, preaim much worse
        let latest = MatchMetricVector::empty(ts, "de_vertigo")
            .with(Metric::Rating, Some(1.05))
            .with(Metric::ReactionTime, Some(480.0))
            .with(Metric::Preaim, Some(12.0));

        let state = classify(latest, &quiet_tilt());
        assert_eq!(state.state, PerformanceStateKind::MechanicalInconsistency);
        assert!(state.evidence[0].contains("Reaction time"));
        assert!(state.confidence > 0.0 && state.confidence <= 1.0);
    }

    #[test]
    fn test_high_tilt_takes_precedence() {
        let ts = Utc.with_ymd_and_hms(2025, 7, 2, 20, 0, 0).unwrap();
        let latest = MatchMetricVector::empty(ts, "de_vertigo")
            .with(Metric::Rating, Some(0.5))
            .with(Metric::ReactionTime, Some(480.0))
            .with(Metric::Preaim, Some(12.0));
        let tilt = TiltAnalysis {
            active: true,
            severity: Severity::High,
            cascade_length: 3,
            ..quiet_tilt()
        };

        let state = classify(latest, &tilt);
        assert_eq!(state.state, PerformanceStateKind::TiltCascade);
        assert!(state.evidence[0].starts_with("3 consecutive"));
    }

    #[test]
    fn test_moderate_tilt_does_not_classify_as_cascade() {
        let ts = Utc.with_ymd_and_hms(2025, 7, 2, 20, 0, 0).unwrap();
        let latest = MatchMetricVector::empty(ts, "de_vertigo").with(Metric::Rating, Some(1.05));
        let tilt = TiltAnalysis {
            active: true,
            severity: Severity::Moderate,
            cascade_length: 2,
            ..quiet_tilt()
        };

        let state = classify(latest, &tilt);
        assert_eq!(state.state, PerformanceStateKind::BaselineNormal);
        assert_eq!(
            state.baseline_deviation[&Metric::Rating],
            "within baseline (1.05 vs 1.05)"
        );
    }
}
