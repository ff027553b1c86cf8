use crate::domain::config::AnalysisConfig;
use crate::domain::metrics::{Direction, Metric};
use crate::domain::performance::baseline::PersonalBaseline;
use crate::domain::thresholds::AdaptiveThresholdTable;
use crate::domain::types::MatchMetricVector;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowStateIndicators {
    /// Timestamp of the most recent qualifying match
    pub last_occurrence: Option<DateTime<Utc>>,
    /// Metrics above the tier's excellent bar in that match
    pub triggers: Vec<String>,
    pub performance_boost: String,
    /// Qualifying matches / window size
    pub frequency: f64,
    pub qualifying_matches: usize,
    /// Trailing consecutive qualifying matches
    pub streak_length: usize,
    /// A qualifying match falls inside the recent window
    pub recent_occurrence: bool,
    /// Rating deviation of the most recent qualifying match, in σ
    pub peak_deviation: f64,
}

impl FlowStateIndicators {
    pub fn none() -> Self {
        Self {
            last_occurrence: None,
            triggers: Vec::new(),
            performance_boost: "none".to_string(),
            frequency: 0.0,
            qualifying_matches: 0,
            streak_length: 0,
            recent_occurrence: false,
            peak_deviation: 0.0,
        }
    }
}

/// Mirror of the tilt detector for sustained positive deviation.
pub struct FlowDetector {
    flow_sigma: f64,
    recent_window: usize,
    floor_fraction: f64,
}

impl FlowDetector {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            flow_sigma: config.flow_sigma,
            recent_window: config.recent_window,
            floor_fraction: config.std_dev_floor_fraction,
        }
    }

    pub fn elevation_bound(&self, baseline: &PersonalBaseline) -> f64 {
        let band = self.flow_sigma * baseline.effective_std_dev(self.floor_fraction);
        match baseline.metric.direction() {
            Direction::HigherIsBetter => baseline.value + band,
            Direction::LowerIsBetter => baseline.value - band,
        }
    }

    fn qualifies(
        &self,
        m: &MatchMetricVector,
        rating: &PersonalBaseline,
        thresholds: &AdaptiveThresholdTable,
    ) -> bool {
        m.get(Metric::Rating).is_some_and(|r| {
            Metric::Rating.is_better(r, self.elevation_bound(rating))
                && thresholds.exceeds_excellent(Metric::Rating, r)
        })
    }

    pub fn detect(
        &self,
        matches: &[MatchMetricVector],
        reference: &BTreeMap<Metric, PersonalBaseline>,
        thresholds: &AdaptiveThresholdTable,
    ) -> FlowStateIndicators {
        let Some(rating) = reference.get(&Metric::Rating).filter(|b| b.has_data()) else {
            return FlowStateIndicators::none();
        };
        if matches.is_empty() {
            return FlowStateIndicators::none();
        }

        let qualifying: Vec<usize> = matches
            .iter()
            .enumerate()
            .filter(|(_, m)| self.qualifies(m, rating, thresholds))
            .map(|(i, _)| i)
            .collect();

        let Some(&last_idx) = qualifying.last() else {
            return FlowStateIndicators::none();
        };
        let last = &matches[last_idx];

        let streak_length = matches
            .iter()
            .rev()
            .filter(|m| m.get(Metric::Rating).is_some())
            .take_while(|m| self.qualifies(m, rating, thresholds))
            .count();

        let triggers = Metric::ALL
            .iter()
            .filter(|&&metric| {
                last.get(metric)
                    .is_some_and(|v| thresholds.exceeds_excellent(metric, v))
            })
            .map(|metric| metric.as_str().to_string())
            .collect();

        let last_rating = last.get(Metric::Rating).unwrap_or(rating.value);
        let peak_deviation = rating.deviation(last_rating, self.floor_fraction);
        let boost_pct = if rating.value.abs() > f64::EPSILON {
            (last_rating - rating.value) / rating.value * 100.0
        } else {
            0.0
        };

        FlowStateIndicators {
            last_occurrence: Some(last.timestamp),
            triggers,
            performance_boost: format!(
                "{:+.1}% rating over baseline ({:+.1}σ)",
                boost_pct, peak_deviation
            ),
            frequency: qualifying.len() as f64 / matches.len() as f64,
            qualifying_matches: qualifying.len(),
            streak_length,
            recent_occurrence: last_idx + self.recent_window >= matches.len(),
            peak_deviation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::performance::baseline::BaselineTracker;
    use chrono::{Duration, TimeZone};

    fn window(ratings: &[f64]) -> Vec<MatchMetricVector> {
        let start = Utc.with_ymd_and_hms(2025, 6, 1, 14, 0, 0).unwrap();
        ratings
            .iter()
            .enumerate()
            .map(|(i, &r)| {
                MatchMetricVector::empty(start + Duration::hours(i as i64), "de_overpass")
                    .with(Metric::Rating, Some(r))
                    .with(Metric::Adr, Some(if r > 1.3 { 105.0 } else { 78.0 }))
            })
            .collect()
    }

    fn run(ratings: &[f64]) -> (Vec<MatchMetricVector>, FlowStateIndicators) {
        let config = AnalysisConfig::default();
        let tracker = BaselineTracker::new(&config);
        let matches = window(ratings);
        let reference = tracker.compute_all(tracker.reference_window(&matches));
        let table = AdaptiveThresholdTable::for_premier_rating(None);
        let flow = FlowDetector::new(&config).detect(&matches, &reference, &table);
        (matches, flow)
    }

    #[test]
    fn test_recent_hot_streak_is_flow() {
        let (matches, flow) = run(&[1.00, 1.05, 0.98, 1.02, 1.00, 1.03, 0.99, 1.45, 1.50, 1.40]);
        assert!(flow.recent_occurrence);
        assert_eq!(flow.streak_length, 3);
        assert_eq!(flow.qualifying_matches, 3);
        assert!((flow.frequency - 0.3).abs() < 1e-12);
        assert_eq!(flow.last_occurrence, Some(matches[9].timestamp));
        assert!(flow.triggers.contains(&"rating".to_string()));
        assert!(flow.triggers.contains(&"adr".to_string()));
        assert!(flow.performance_boost.starts_with('+'));
    }

    #[test]
    fn test_old_peak_is_not_recent() {
        let (_, flow) = run(&[1.00, 1.50, 0.98, 1.02, 1.00, 1.03, 0.99, 1.01, 1.00, 1.02]);
        assert_eq!(flow.qualifying_matches, 1);
        assert!(!flow.recent_occurrence);
        assert_eq!(flow.streak_length, 0);
    }

    #[test]
    fn test_average_play_has_no_flow() {
        let (_, flow) = run(&[1.00, 1.05, 0.98, 1.02, 1.00, 1.03, 0.99, 1.01, 1.00, 1.02]);
        assert_eq!(flow, FlowStateIndicators::none());
    }
}
