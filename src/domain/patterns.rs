use crate::domain::metrics::Metric;
use crate::domain::performance::baseline::PersonalBaseline;
use crate::domain::types::MatchMetricVector;
use serde::Serialize;
use std::collections::BTreeMap;

/// Rating summary for one group of matches (one map, one time slot, ...).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternBucket {
    pub label: String,
    pub matches: usize,
    pub mean_rating: f64,
    /// Signed, in rating baseline σ
    pub deviation: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternAnalysis {
    pub by_map: Vec<PatternBucket>,
    pub by_time_of_day: Vec<PatternBucket>,
    pub by_session_position: Vec<PatternBucket>,
    pub strongest_map: Option<String>,
    pub weakest_map: Option<String>,
    /// First session position whose mean rating sits a full σ under position 1
    pub fatigue_onset: Option<u32>,
}

const MIN_BUCKET_MATCHES: usize = 2;

pub struct PatternRecognizer {
    floor_fraction: f64,
}

impl PatternRecognizer {
    pub fn new(floor_fraction: f64) -> Self {
        Self { floor_fraction }
    }

    pub fn analyze(&self, matches: &[MatchMetricVector], rating: &PersonalBaseline) -> PatternAnalysis {
        let by_map = self.buckets(matches, rating, |m| m.map.clone());
        let by_time_of_day = self.buckets(matches, rating, |m| m.time_of_day);
        let by_session_position = self.buckets(matches, rating, |m| m.session_position);

        let ranked_maps: Vec<&PatternBucket> = by_map
            .iter()
            .map(|(_, b)| b)
            .filter(|b| b.matches >= MIN_BUCKET_MATCHES)
            .collect();
        let strongest_map = ranked_maps
            .iter()
            .max_by(|a, b| a.mean_rating.total_cmp(&b.mean_rating))
            .map(|b| b.label.clone());
        let weakest_map = ranked_maps
            .iter()
            .min_by(|a, b| a.mean_rating.total_cmp(&b.mean_rating))
            .map(|b| b.label.clone());

        PatternAnalysis {
            fatigue_onset: self.fatigue_onset(matches, rating),
            by_map: by_map.into_iter().map(|(_, b)| b).collect(),
            by_time_of_day: by_time_of_day.into_iter().map(|(_, b)| b).collect(),
            by_session_position: by_session_position.into_iter().map(|(_, b)| b).collect(),
            strongest_map,
            weakest_map,
        }
        .with_distinct_extremes()
    }

    fn buckets<K, F>(
        &self,
        matches: &[MatchMetricVector],
        rating: &PersonalBaseline,
        key: F,
    ) -> Vec<(K, PatternBucket)>
    where
        K: Ord + ToString,
        F: Fn(&MatchMetricVector) -> K,
    {
        let mut groups: BTreeMap<K, Vec<f64>> = BTreeMap::new();
        for m in matches {
            if let Some(r) = m.get(Metric::Rating) {
                groups.entry(key(m)).or_default().push(r);
            }
        }

        groups
            .into_iter()
            .map(|(k, ratings)| {
                let mean_rating = ratings.iter().sum::<f64>() / ratings.len() as f64;
                let bucket = PatternBucket {
                    label: k.to_string(),
                    matches: ratings.len(),
                    mean_rating,
                    deviation: rating.deviation(mean_rating, self.floor_fraction),
                };
                (k, bucket)
            })
            .collect()
    }

    fn fatigue_onset(&self, matches: &[MatchMetricVector], rating: &PersonalBaseline) -> Option<u32> {
        let positions = self.buckets(matches, rating, |m| m.session_position);
        let (_, first) = positions.iter().find(|(p, _)| *p == 1)?;
        let sigma = rating.effective_std_dev(self.floor_fraction);
        if sigma <= 0.0 {
            return None;
        }

        positions
            .iter()
            .filter(|(p, b)| *p >= 2 && b.matches >= MIN_BUCKET_MATCHES)
            .find(|(_, b)| first.mean_rating - b.mean_rating > sigma)
            .map(|(p, _)| *p)
    }
}

impl PatternAnalysis {
    /// A single qualifying map is neither strongest nor weakest.
    fn with_distinct_extremes(mut self) -> Self {
        if self.strongest_map == self.weakest_map {
            self.strongest_map = None;
            self.weakest_map = None;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config::AnalysisConfig;
    use crate::domain::performance::baseline::BaselineTracker;
    use chrono::{Duration, TimeZone, Utc};

    fn m(i: i64, map: &str, position: u32, rating: f64) -> MatchMetricVector {
        let start = Utc.with_ymd_and_hms(2025, 9, 1, 19, 0, 0).unwrap();
        let mut v = MatchMetricVector::empty(start + Duration::hours(i), map)
            .with(Metric::Rating, Some(rating));
        v.session_position = position;
        v
    }

    #[test]
    fn test_map_extremes_and_fatigue() {
        let matches = vec![
            m(0, "de_mirage", 1, 1.25),
            m(1, "de_nuke", 2, 1.05),
            m(2, "de_mirage", 3, 0.80),
            m(3, "de_mirage", 1, 1.30),
            m(4, "de_nuke", 2, 1.00),
            m(5, "de_nuke", 3, 0.75),
            m(6, "de_anubis", 1, 1.10),
        ];
        let tracker = BaselineTracker::new(&AnalysisConfig::default());
        let rating = tracker.compute(&matches, Metric::Rating);
        let patterns = PatternRecognizer::new(0.02).analyze(&matches, &rating);

        assert_eq!(patterns.by_map.len(), 3);
        assert_eq!(patterns.by_map[0].label, "de_anubis");
        assert_eq!(patterns.strongest_map.as_deref(), Some("de_mirage"));
        assert_eq!(patterns.weakest_map.as_deref(), Some("de_nuke"));
        assert_eq!(patterns.by_session_position.len(), 3);
        assert_eq!(patterns.fatigue_onset, Some(3));
        // 19:00-22:00 evening, 23:00-01:00 night
        assert_eq!(patterns.by_time_of_day.len(), 2);
    }

    #[test]
    fn test_single_map_has_no_extremes() {
        let matches = vec![
            m(0, "de_inferno", 1, 1.0),
            m(1, "de_inferno", 2, 1.1),
        ];
        let tracker = BaselineTracker::new(&AnalysisConfig::default());
        let rating = tracker.compute(&matches, Metric::Rating);
        let patterns = PatternRecognizer::new(0.02).analyze(&matches, &rating);

        assert_eq!(patterns.strongest_map, None);
        assert_eq!(patterns.weakest_map, None);
        assert_eq!(patterns.fatigue_onset, None);
    }
}
