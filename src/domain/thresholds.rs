use crate::domain::metrics::{Direction, Metric};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Skill tier bucket derived from a premier rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillTier {
    /// 0 - 4 999
    Developing,
    /// 5 000 - 9 999
    Intermediate,
    /// 10 000 - 14 999, also used when no rating is known
    Advanced,
    /// 15 000 - 19 999
    Expert,
    /// 20 000 and above
    Elite,
}

impl SkillTier {
    pub fn from_premier_rating(rating: Option<u32>) -> Self {
        match rating {
            None => SkillTier::Advanced,
            Some(0..=4_999) => SkillTier::Developing,
            Some(5_000..=9_999) => SkillTier::Intermediate,
            Some(10_000..=14_999) => SkillTier::Advanced,
            Some(15_000..=19_999) => SkillTier::Expert,
            Some(_) => SkillTier::Elite,
        }
    }

    /// Multiplier applied to the mid-tier reference table.
    fn scale(&self) -> f64 {
        match self {
            SkillTier::Developing => 0.85,
            SkillTier::Intermediate => 0.93,
            SkillTier::Advanced => 1.0,
            SkillTier::Expert => 1.07,
            SkillTier::Elite => 1.14,
        }
    }
}

impl fmt::Display for SkillTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkillTier::Developing => write!(f, "Developing"),
            SkillTier::Intermediate => write!(f, "Intermediate"),
            SkillTier::Advanced => write!(f, "Advanced"),
            SkillTier::Expert => write!(f, "Expert"),
            SkillTier::Elite => write!(f, "Elite"),
        }
    }
}

/// Tier-relative bars for one metric. For lower-is-better metrics the values
/// descend from `solid` to `excellent`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricThresholds {
    pub solid: f64,
    pub strong: f64,
    pub excellent: f64,
}

/// Mid-tier (Advanced) reference values: (solid, strong, excellent).
fn reference_thresholds(metric: Metric) -> (f64, f64, f64) {
    match metric {
        Metric::Rating => (0.95, 1.05, 1.15),
        Metric::KillDeath => (0.95, 1.10, 1.30),
        Metric::Adr => (70.0, 80.0, 90.0),
        Metric::Kast => (66.0, 71.0, 76.0),
        Metric::HeadshotPct => (38.0, 45.0, 52.0),
        Metric::Preaim => (11.0, 8.5, 6.5),
        Metric::ReactionTime => (620.0, 540.0, 470.0),
        Metric::SprayAccuracy => (35.0, 42.0, 50.0),
        Metric::UtilityEfficiency => (0.35, 0.50, 0.65),
    }
}

/// Per-call threshold table for one player's tier.
///
/// Built once per analysis and passed by reference into every detector, so
/// concurrent analyses for different players never share thresholds.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdaptiveThresholdTable {
    pub tier: SkillTier,
    pub premier_rating: Option<u32>,
    pub thresholds: BTreeMap<Metric, MetricThresholds>,
}

impl AdaptiveThresholdTable {
    pub fn for_premier_rating(premier_rating: Option<u32>) -> Self {
        let tier = SkillTier::from_premier_rating(premier_rating);
        let scale = tier.scale();
        let thresholds = Metric::ALL
            .iter()
            .map(|&metric| {
                let (solid, strong, excellent) = reference_thresholds(metric);
                let adjust = |v: f64| match metric.direction() {
                    Direction::HigherIsBetter => v * scale,
                    Direction::LowerIsBetter => v / scale,
                };
                let mut t = MetricThresholds {
                    solid: adjust(solid),
                    strong: adjust(strong),
                    excellent: adjust(excellent),
                };
                if metric.is_percentage() {
                    t.solid = t.solid.min(100.0);
                    t.strong = t.strong.min(100.0);
                    t.excellent = t.excellent.min(100.0);
                }
                (metric, t)
            })
            .collect();

        Self {
            tier,
            premier_rating,
            thresholds,
        }
    }

    pub fn get(&self, metric: Metric) -> Option<&MetricThresholds> {
        self.thresholds.get(&metric)
    }

    /// Value is worse than the tier's "solid" bar.
    pub fn below_solid(&self, metric: Metric, value: f64) -> bool {
        self.get(metric)
            .is_some_and(|t| metric.is_worse(value, t.solid))
    }

    /// Value is better than the tier's "excellent" bar.
    pub fn exceeds_excellent(&self, metric: Metric, value: f64) -> bool {
        self.get(metric)
            .is_some_and(|t| metric.is_better(value, t.excellent))
    }
}
