use crate::domain::metrics::Metric;
use crate::domain::performance::baseline::PersonalBaseline;
use crate::domain::types::{ConfidenceLevel, MatchMetricVector};
use serde::Serialize;
use std::collections::BTreeMap;

/// Headline stats of a single match.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedStats {
    pub rating: Option<f64>,
    pub kd_ratio: Option<f64>,
    pub adr: Option<f64>,
    pub kast: Option<f64>,
    pub headshot_pct: Option<f64>,
    pub games_played: usize,
}

/// The most recent match's stats put in the context of the player's baselines.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendedProcessedStats {
    #[serde(flatten)]
    pub stats: ProcessedStats,
    pub personal_baseline: BTreeMap<Metric, PersonalBaseline>,
    /// Signed, in baseline standard deviations
    pub deviation_from_baseline: BTreeMap<Metric, f64>,
    pub confidence_level: ConfidenceLevel,
}

impl ExtendedProcessedStats {
    pub fn build(
        latest: &MatchMetricVector,
        games_played: usize,
        baselines: &BTreeMap<Metric, PersonalBaseline>,
        std_dev_floor_fraction: f64,
    ) -> Self {
        let stats = ProcessedStats {
            rating: latest.get(Metric::Rating),
            kd_ratio: latest.get(Metric::KillDeath),
            adr: latest.get(Metric::Adr),
            kast: latest.get(Metric::Kast),
            headshot_pct: latest.get(Metric::HeadshotPct),
            games_played,
        };

        let deviation_from_baseline = baselines
            .iter()
            .filter(|(_, b)| b.has_data())
            .filter_map(|(&metric, b)| {
                latest
                    .get(metric)
                    .map(|v| (metric, b.deviation(v, std_dev_floor_fraction)))
            })
            .collect();

        let confidence_level = baselines
            .get(&Metric::Rating)
            .map(|b| b.confidence_level)
            .unwrap_or(ConfidenceLevel::Low);

        Self {
            stats,
            personal_baseline: baselines.clone(),
            deviation_from_baseline,
            confidence_level,
        }
    }
}
