use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a larger value of a metric means better play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    HigherIsBetter,
    LowerIsBetter,
}

/// The fixed per-match metric vector.
///
/// Ordering of the variants is the ordering used for every map keyed by
/// metric in the analysis output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Rating,
    KillDeath,
    Adr,
    Kast,
    HeadshotPct,
    Preaim,
    ReactionTime,
    SprayAccuracy,
    UtilityEfficiency,
}

impl Metric {
    pub const ALL: [Metric; 9] = [
        Metric::Rating,
        Metric::KillDeath,
        Metric::Adr,
        Metric::Kast,
        Metric::HeadshotPct,
        Metric::Preaim,
        Metric::ReactionTime,
        Metric::SprayAccuracy,
        Metric::UtilityEfficiency,
    ];

    /// Metrics correlated against rating.
    pub const CORRELATION_CANDIDATES: [Metric; 8] = [
        Metric::KillDeath,
        Metric::Adr,
        Metric::Kast,
        Metric::HeadshotPct,
        Metric::Preaim,
        Metric::ReactionTime,
        Metric::SprayAccuracy,
        Metric::UtilityEfficiency,
    ];

    pub fn direction(&self) -> Direction {
        match self {
            // Preaim is measured in degrees off target, reaction time in ms
            Metric::Preaim | Metric::ReactionTime => Direction::LowerIsBetter,
            _ => Direction::HigherIsBetter,
        }
    }

    /// Sign a metric is expected to have when correlated with rating.
    pub fn expected_correlation_sign(&self) -> f64 {
        match self.direction() {
            Direction::HigherIsBetter => 1.0,
            Direction::LowerIsBetter => -1.0,
        }
    }

    /// Signed distance from `reference` oriented so that positive is always better.
    pub fn improvement(&self, value: f64, reference: f64) -> f64 {
        match self.direction() {
            Direction::HigherIsBetter => value - reference,
            Direction::LowerIsBetter => reference - value,
        }
    }

    /// True when `value` is strictly worse than `reference`.
    pub fn is_worse(&self, value: f64, reference: f64) -> bool {
        self.improvement(value, reference) < 0.0
    }

    /// True when `value` is strictly better than `reference`.
    pub fn is_better(&self, value: f64, reference: f64) -> bool {
        self.improvement(value, reference) > 0.0
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Rating => "rating",
            Metric::KillDeath => "kd_ratio",
            Metric::Adr => "adr",
            Metric::Kast => "kast",
            Metric::HeadshotPct => "headshot_pct",
            Metric::Preaim => "preaim",
            Metric::ReactionTime => "reaction_time",
            Metric::SprayAccuracy => "spray_accuracy",
            Metric::UtilityEfficiency => "utility_efficiency",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Metric::Rating => "Rating",
            Metric::KillDeath => "K/D",
            Metric::Adr => "ADR",
            Metric::Kast => "KAST",
            Metric::HeadshotPct => "Headshot %",
            Metric::Preaim => "Preaim",
            Metric::ReactionTime => "Reaction time",
            Metric::SprayAccuracy => "Spray accuracy",
            Metric::UtilityEfficiency => "Utility efficiency",
        }
    }

    /// Percentage metrics must fall within 0..=100.
    pub fn is_percentage(&self) -> bool {
        matches!(
            self,
            Metric::Kast | Metric::HeadshotPct | Metric::SprayAccuracy
        )
    }

    /// Largest value a single match can plausibly report.
    pub fn upper_bound(&self) -> f64 {
        match self {
            Metric::Rating => 5.0,
            Metric::KillDeath => 100.0,
            Metric::Adr => 500.0,
            Metric::Kast | Metric::HeadshotPct | Metric::SprayAccuracy => 100.0,
            // degrees of crosshair correction
            Metric::Preaim => 180.0,
            Metric::ReactionTime => 5_000.0,
            Metric::UtilityEfficiency => 50.0,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
