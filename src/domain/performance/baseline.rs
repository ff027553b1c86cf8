use crate::domain::config::AnalysisConfig;
use crate::domain::metrics::Metric;
use crate::domain::performance::stats::Stats;
use crate::domain::types::{ConfidenceLevel, MatchMetricVector};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::warn;

/// A player's statistical summary of one metric over the supplied window.
///
/// Invariant: `confidence_interval.0 <= value <= confidence_interval.1`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalBaseline {
    pub metric: Metric,
    pub value: f64,
    pub confidence_interval: (f64, f64),
    pub sample_size: usize,
    pub variance: f64,
    pub std_dev: f64,
    pub confidence_level: ConfidenceLevel,
    pub last_updated: Option<DateTime<Utc>>,
}

impl PersonalBaseline {
    /// Baseline for a metric no match in the window carried.
    pub fn empty(metric: Metric) -> Self {
        Self {
            metric,
            value: 0.0,
            confidence_interval: (0.0, 0.0),
            sample_size: 0,
            variance: 0.0,
            std_dev: 0.0,
            confidence_level: ConfidenceLevel::Low,
            last_updated: None,
        }
    }

    pub fn has_data(&self) -> bool {
        self.sample_size > 0
    }

    /// Std-dev used for z-scores, floored at a fraction of |mean|.
    pub fn effective_std_dev(&self, floor_fraction: f64) -> f64 {
        self.std_dev.max(self.value.abs() * floor_fraction)
    }

    /// Signed deviation of `value` in σ units, positive above the baseline.
    pub fn deviation(&self, value: f64, floor_fraction: f64) -> f64 {
        Stats::z_score(value, self.value, self.effective_std_dev(floor_fraction))
    }

    /// Deviation oriented so that positive always means better play.
    pub fn improvement_sigma(&self, value: f64, floor_fraction: f64) -> f64 {
        let z = self.deviation(value, floor_fraction);
        self.metric.expected_correlation_sign() * z
    }
}

/// Computes personal baselines from a chronological match window.
#[derive(Debug, Clone)]
pub struct BaselineTracker {
    ci_z: f64,
    medium_min: usize,
    high_min: usize,
    recent_window: usize,
    min_reference: usize,
}

impl BaselineTracker {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            ci_z: config.ci_z,
            medium_min: config.confidence_medium_min,
            high_min: config.confidence_high_min,
            recent_window: config.recent_window,
            min_reference: config.min_matches,
        }
    }

    pub fn confidence_level(&self, sample_size: usize) -> ConfidenceLevel {
        if sample_size >= self.high_min {
            ConfidenceLevel::High
        } else if sample_size >= self.medium_min {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        }
    }

    /// Share of the high-confidence sample size reached, in 0..=1.
    pub fn sample_confidence(&self, sample_size: usize) -> f64 {
        (sample_size as f64 / self.high_min.max(1) as f64).min(1.0)
    }

    pub fn compute(&self, matches: &[MatchMetricVector], metric: Metric) -> PersonalBaseline {
        let mut values = Vec::with_capacity(matches.len());
        let mut last_updated = None;
        for m in matches {
            if let Some(v) = m.get(metric) {
                values.push(v);
                last_updated = Some(m.timestamp);
            }
        }

        if values.is_empty() {
            return PersonalBaseline::empty(metric);
        }

        let n = values.len();
        let (Some(value), Some(variance)) = (Stats::mean(&values), Stats::sample_variance(&values))
        else {
            warn!(
                "Discarding {} baseline: {} values overflow the numeric range",
                metric.as_str(),
                n
            );
            return PersonalBaseline::empty(metric);
        };
        let std_dev = variance.sqrt();

        let confidence_interval = if n >= 2 {
            let half = self.ci_z * (variance / n as f64).sqrt();
            if half.is_finite() {
                clamp_interval(metric, value, value - half, value + half)
            } else {
                (value, value)
            }
        } else {
            (value, value)
        };

        PersonalBaseline {
            metric,
            value,
            confidence_interval,
            sample_size: n,
            variance,
            std_dev,
            confidence_level: self.confidence_level(n),
            last_updated,
        }
    }

    pub fn compute_all(&self, matches: &[MatchMetricVector]) -> BTreeMap<Metric, PersonalBaseline> {
        Metric::ALL
            .iter()
            .map(|&metric| (metric, self.compute(matches, metric)))
            .collect()
    }

    /// Window detectors measure recent matches against.
    ///
    /// Excludes the trailing recent window when enough earlier matches remain,
    /// so an ongoing slump does not drag its own reference down.
    pub fn reference_window<'a>(&self, matches: &'a [MatchMetricVector]) -> &'a [MatchMetricVector] {
        let earlier = matches.len().saturating_sub(self.recent_window);
        if earlier >= self.min_reference {
            &matches[..earlier]
        } else {
            matches
        }
    }
}

/// Keeps an interval inside the metric's domain: never negative, and at most
/// 100 for percentages. The mean always stays inside.
fn clamp_interval(metric: Metric, value: f64, lo: f64, hi: f64) -> (f64, f64) {
    let lo = lo.max(0.0).min(value);
    let hi = if metric.is_percentage() {
        hi.min(100.0).max(value)
    } else {
        hi
    };
    (lo, hi)
}
