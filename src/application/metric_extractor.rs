use crate::domain::config::AnalysisConfig;
use crate::domain::metrics::Metric;
use crate::domain::types::{MatchMetricVector, RawMatchRecord, TimeOfDay};
use chrono::Duration;
use tracing::{debug, warn};

/// Flash assists are weighted like this much utility damage.
const FLASH_DAMAGE_EQUIVALENT: f64 = 10.0;

const DEFAULT_SESSION_GAP_MINUTES: i64 = 90;

/// Normalizes raw match records into metric vectors.
pub struct MetricExtractor {
    session_gap: Duration,
}

impl MetricExtractor {
    /// Gaps outside the range `Duration` can hold, or non-positive ones,
    /// fall back to the default gap.
    pub fn new(config: &AnalysisConfig) -> Self {
        let session_gap = Duration::try_minutes(config.session_gap_minutes)
            .filter(|gap| *gap > Duration::zero())
            .unwrap_or_else(|| {
                warn!(
                    "Session gap of {} minutes is out of range, using {}",
                    config.session_gap_minutes, DEFAULT_SESSION_GAP_MINUTES
                );
                Duration::minutes(DEFAULT_SESSION_GAP_MINUTES)
            });
        Self { session_gap }
    }

    /// Normalize one record. Session position defaults to 1 when absent.
    pub fn extract(&self, record: &RawMatchRecord) -> MatchMetricVector {
        let kd = record.kd_ratio.or_else(|| {
            let kills = record.kills? as f64;
            let deaths = record.deaths? as f64;
            Some(kills / deaths.max(1.0))
        });

        let utility = record.utility_efficiency.or_else(|| {
            let thrown = record.utility_thrown.filter(|t| *t > 0.0)?;
            if record.utility_damage.is_none() && record.enemies_flashed.is_none() {
                return None;
            }
            let damage = record.utility_damage.unwrap_or(0.0);
            let flashed = record.enemies_flashed.unwrap_or(0.0);
            Some((damage + FLASH_DAMAGE_EQUIVALENT * flashed) / thrown / 100.0)
        });

        let ts = record.finished_at;
        let mut vector = MatchMetricVector {
            match_id: record.match_id.clone(),
            timestamp: ts,
            map: record
                .map
                .clone()
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| "unknown".to_string()),
            session_position: record.session_position.unwrap_or(1).max(1),
            time_of_day: TimeOfDay::from_timestamp(&ts),
            ..MatchMetricVector::empty(ts, "")
        };

        for (metric, value) in [
            (Metric::Rating, record.rating),
            (Metric::KillDeath, kd),
            (Metric::Adr, record.adr),
            (Metric::Kast, record.kast),
            (Metric::HeadshotPct, record.headshot_pct),
            (Metric::Preaim, record.preaim),
            (Metric::ReactionTime, record.reaction_time_ms),
            (Metric::SprayAccuracy, record.spray_accuracy),
            (Metric::UtilityEfficiency, utility),
        ] {
            vector = vector.with(metric, sanitize(metric, value, record.match_id.as_deref()));
        }
        vector
    }

    /// Normalize a whole history into chronological order and derive session
    /// positions for records that do not carry one.
    pub fn extract_all(&self, records: &[RawMatchRecord]) -> Vec<MatchMetricVector> {
        let mut ordered: Vec<&RawMatchRecord> = records.iter().collect();
        ordered.sort_by_key(|r| r.finished_at);

        let mut out: Vec<MatchMetricVector> = Vec::with_capacity(ordered.len());
        for record in ordered {
            let mut vector = self.extract(record);
            if record.session_position.is_none() {
                vector.session_position = match out.last() {
                    Some(prev) if vector.timestamp - prev.timestamp <= self.session_gap => {
                        prev.session_position + 1
                    }
                    _ => 1,
                };
            }
            out.push(vector);
        }
        out
    }
}

fn sanitize(metric: Metric, value: Option<f64>, match_id: Option<&str>) -> Option<f64> {
    let v = value?;
    let valid = v.is_finite() && (0.0..=metric.upper_bound()).contains(&v);
    if !valid {
        debug!(
            "Dropping {} value {} for match {}",
            metric.as_str(),
            v,
            match_id.unwrap_or("<unknown>")
        );
        return None;
    }
    Some(v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn record(minute_offset: i64) -> RawMatchRecord {
        RawMatchRecord {
            finished_at: Utc.with_ymd_and_hms(2025, 4, 10, 20, 0, 0).unwrap()
                + Duration::minutes(minute_offset),
            map: Some("de_mirage".to_string()),
            rating: Some(1.1),
            ..Default::default()
        }
    }

    #[test]
    fn test_kd_derived_with_zero_deaths_guard() {
        let extractor = MetricExtractor::new(&AnalysisConfig::default());
        let r = RawMatchRecord {
            kills: Some(18),
            deaths: Some(0),
            ..record(0)
        };
        assert_eq!(extractor.extract(&r).kd_ratio, Some(18.0));

        let r = RawMatchRecord {
            kills: Some(20),
            deaths: Some(16),
            ..record(0)
        };
        assert_eq!(extractor.extract(&r).kd_ratio, Some(1.25));
    }

    #[test]
    fn test_utility_efficiency_derivation() {
        let extractor = MetricExtractor::new(&AnalysisConfig::default());
        let r = RawMatchRecord {
            utility_damage: Some(120.0),
            enemies_flashed: Some(6.0),
            utility_thrown: Some(4.0),
            ..record(0)
        };
        let v = extractor.extract(&r).utility_efficiency.unwrap();
        assert!((v - 0.45).abs() < 1e-12);

        let no_throws = RawMatchRecord {
            utility_damage: Some(120.0),
            utility_thrown: Some(0.0),
            ..record(0)
        };
        assert_eq!(extractor.extract(&no_throws).utility_efficiency, None);
    }

    #[test]
    fn test_invalid_values_become_missing() {
        let extractor = MetricExtractor::new(&AnalysisConfig::default());
        let r = RawMatchRecord {
            headshot_pct: Some(140.0),
            adr: Some(f64::INFINITY),
            reaction_time_ms: Some(-5.0),
            kast: Some(72.0),
            ..record(0)
        };
        let v = extractor.extract(&r);
        assert_eq!(v.headshot_pct, None);
        assert_eq!(v.adr, None);
        assert_eq!(v.reaction_time_ms, None);
        assert_eq!(v.kast, Some(72.0));
    }

    #[test]
    fn test_implausible_magnitudes_become_missing() {
        let extractor = MetricExtractor::new(&AnalysisConfig::default());
        let r = RawMatchRecord {
            adr: Some(1e308),
            rating: Some(42.0),
            kd_ratio: Some(1.4),
            ..record(0)
        };
        let v = extractor.extract(&r);
        assert_eq!(v.adr, None);
        assert_eq!(v.rating, None);
        assert_eq!(v.kd_ratio, Some(1.4));
    }

    #[test]
    fn test_oversized_session_gap_does_not_panic() {
        let config = AnalysisConfig {
            session_gap_minutes: i64::MAX,
            ..Default::default()
        };
        let extractor = MetricExtractor::new(&config);
        let positions: Vec<u32> = extractor
            .extract_all(&[record(0), record(30), record(400)])
            .iter()
            .map(|v| v.session_position)
            .collect();
        assert_eq!(positions, vec![1, 2, 1]);
    }

    #[test]
    fn test_extract_all_sorts_and_derives_sessions() {
        let extractor = MetricExtractor::new(&AnalysisConfig::default());
        // Out of order; 45 min gaps inside a session, then a 5 hour break
        let records = vec![record(90), record(0), record(45), record(390), record(430)];
        let vectors = extractor.extract_all(&records);

        let positions: Vec<u32> = vectors.iter().map(|v| v.session_position).collect();
        assert_eq!(positions, vec![1, 2, 3, 1, 2]);
        assert!(vectors.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }

    #[test]
    fn test_explicit_session_position_wins() {
        let extractor = MetricExtractor::new(&AnalysisConfig::default());
        let records = vec![
            RawMatchRecord {
                session_position: Some(4),
                ..record(0)
            },
            record(30),
        ];
        let vectors = extractor.extract_all(&records);
        assert_eq!(vectors[0].session_position, 4);
        assert_eq!(vectors[1].session_position, 5);
    }

    #[test]
    fn test_missing_map_is_labelled_unknown() {
        let extractor = MetricExtractor::new(&AnalysisConfig::default());
        let r = RawMatchRecord {
            map: None,
            ..record(0)
        };
        assert_eq!(extractor.extract(&r).map, "unknown");
    }
}
