use crate::domain::metrics::Metric;
use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Bucketed hour of day a match finished in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl TimeOfDay {
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            6..=11 => TimeOfDay::Morning,
            12..=17 => TimeOfDay::Afternoon,
            18..=22 => TimeOfDay::Evening,
            _ => TimeOfDay::Night,
        }
    }

    pub fn from_timestamp(ts: &DateTime<Utc>) -> Self {
        Self::from_hour(ts.hour())
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeOfDay::Morning => write!(f, "morning"),
            TimeOfDay::Afternoon => write!(f, "afternoon"),
            TimeOfDay::Evening => write!(f, "evening"),
            TimeOfDay::Night => write!(f, "night"),
        }
    }
}

/// Three-level severity shared by tilt indicators and alerts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Moderate,
    High,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Low => write!(f, "low"),
            Severity::Moderate => write!(f, "moderate"),
            Severity::High => write!(f, "high"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Significance {
    Low,
    Moderate,
    High,
}

/// How far a baseline can be trusted, driven by its sample size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
}

/// One match for one player, normalized into the fixed metric vector.
///
/// Produced once by the metric extractor and never mutated afterwards. A
/// `None` metric means the telemetry for that match did not include it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchMetricVector {
    pub match_id: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub map: String,
    pub session_position: u32,
    pub time_of_day: TimeOfDay,
    pub rating: Option<f64>,
    pub kd_ratio: Option<f64>,
    pub adr: Option<f64>,
    pub kast: Option<f64>,
    pub headshot_pct: Option<f64>,
    pub preaim: Option<f64>,
    pub reaction_time_ms: Option<f64>,
    pub spray_accuracy: Option<f64>,
    pub utility_efficiency: Option<f64>,
}

impl MatchMetricVector {
    /// A vector with no metrics filled in.
    pub fn empty(timestamp: DateTime<Utc>, map: impl Into<String>) -> Self {
        Self {
            match_id: None,
            timestamp,
            map: map.into(),
            session_position: 1,
            time_of_day: TimeOfDay::from_timestamp(&timestamp),
            rating: None,
            kd_ratio: None,
            adr: None,
            kast: None,
            headshot_pct: None,
            preaim: None,
            reaction_time_ms: None,
            spray_accuracy: None,
            utility_efficiency: None,
        }
    }

    pub fn get(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Rating => self.rating,
            Metric::KillDeath => self.kd_ratio,
            Metric::Adr => self.adr,
            Metric::Kast => self.kast,
            Metric::HeadshotPct => self.headshot_pct,
            Metric::Preaim => self.preaim,
            Metric::ReactionTime => self.reaction_time_ms,
            Metric::SprayAccuracy => self.spray_accuracy,
            Metric::UtilityEfficiency => self.utility_efficiency,
        }
        .filter(|v| v.is_finite())
    }

    /// Builder-style setter, used by the extractor and by tests.
    pub fn with(mut self, metric: Metric, value: Option<f64>) -> Self {
        let slot = match metric {
            Metric::Rating => &mut self.rating,
            Metric::KillDeath => &mut self.kd_ratio,
            Metric::Adr => &mut self.adr,
            Metric::Kast => &mut self.kast,
            Metric::HeadshotPct => &mut self.headshot_pct,
            Metric::Preaim => &mut self.preaim,
            Metric::ReactionTime => &mut self.reaction_time_ms,
            Metric::SprayAccuracy => &mut self.spray_accuracy,
            Metric::UtilityEfficiency => &mut self.utility_efficiency,
        };
        *slot = value;
        self
    }
}

/// A match as delivered by the history provider, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMatchRecord {
    pub match_id: Option<String>,
    pub finished_at: DateTime<Utc>,
    pub map: Option<String>,
    pub session_position: Option<u32>,
    pub rating: Option<f64>,
    pub kills: Option<u32>,
    pub deaths: Option<u32>,
    pub kd_ratio: Option<f64>,
    pub adr: Option<f64>,
    pub kast: Option<f64>,
    pub headshot_pct: Option<f64>,
    pub preaim: Option<f64>,
    pub reaction_time_ms: Option<f64>,
    pub spray_accuracy: Option<f64>,
    pub utility_damage: Option<f64>,
    pub enemies_flashed: Option<f64>,
    pub utility_thrown: Option<f64>,
    pub utility_efficiency: Option<f64>,
}

/// Values of `metric` across the window, in order, skipping matches without it.
pub fn metric_values(matches: &[MatchMetricVector], metric: Metric) -> Vec<f64> {
    matches.iter().filter_map(|m| m.get(metric)).collect()
}
