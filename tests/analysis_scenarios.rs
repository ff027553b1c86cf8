use chrono::{DateTime, Duration, TimeZone, Utc};
use tiltwatch::application::{EnhancedAnalysisEngine, analyze};
use tiltwatch::domain::errors::AnalysisError;
use tiltwatch::domain::metrics::Metric;
use tiltwatch::domain::state::PerformanceStateKind;
use tiltwatch::domain::types::{MatchMetricVector, Severity, Significance};

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 14, 17, 0, 0).unwrap()
}

fn ratings(values: &[f64]) -> Vec<MatchMetricVector> {
    values
        .iter()
        .enumerate()
        .map(|(i, &r)| {
            MatchMetricVector::empty(start() + Duration::minutes(50 * i as i64), "de_ancient")
                .with(Metric::Rating, Some(r))
        })
        .collect()
}

#[test]
fn test_three_matches_is_insufficient_data() {
    let err = analyze(&ratings(&[1.0, 1.1, 0.9]), "p1", Some(12_000)).unwrap_err();
    assert_eq!(
        err,
        AnalysisError::InsufficientData {
            observed: 3,
            required: 5
        }
    );
    assert!(err.is_retryable_with_more_data());
}

#[test]
fn test_collapse_after_stable_run_is_tilt_cascade() {
    let history = ratings(&[1.08, 1.12, 1.10, 1.09, 1.11, 1.10, 1.10, 0.70, 0.65, 0.60]);
    let result = analyze(&history, "p1", Some(12_000)).unwrap();

    let tilt = &result.tilt_analysis;
    assert!(tilt.active);
    assert_eq!(tilt.cascade_length, 3);
    assert_eq!(tilt.severity, Severity::High);
    assert!(tilt.triggers.iter().any(|t| t == "rating_cascade"));
    assert!(!tilt.recommended_action.is_empty());

    assert_eq!(result.performance_state.state, PerformanceStateKind::TiltCascade);
    assert!((0.0..=1.0).contains(&result.performance_state.confidence));
}

#[test]
fn test_collapse_of_exactly_two_sigma_is_tilt_cascade() {
    let history = ratings(&[0.9, 1.1, 0.9, 1.1, 0.9, 1.1, 1.0, 0.8, 0.8, 0.8]);
    let result = analyze(&history, "p1", Some(12_000)).unwrap();

    assert!(result.tilt_analysis.active);
    assert_eq!(result.tilt_analysis.cascade_length, 3);
    assert_eq!(result.tilt_analysis.severity, Severity::High);
    assert_eq!(result.performance_state.state, PerformanceStateKind::TiltCascade);
}

#[test]
fn test_linear_adr_is_primary_driver() {
    let history: Vec<MatchMetricVector> = (0..10)
        .map(|i| {
            let x = i as f64;
            MatchMetricVector::empty(start() + Duration::hours(i), "de_dust2")
                .with(Metric::Rating, Some(0.80 + 0.05 * x))
                .with(Metric::Adr, Some(60.0 + 5.0 * x))
        })
        .collect();
    let result = analyze(&history, "p1", Some(12_000)).unwrap();
    let corr = &result.correlation_analysis;

    let adr = &corr.correlations[&Metric::Adr];
    assert!((adr.coefficient - 1.0).abs() < 1e-9);
    assert_eq!(adr.significance, Significance::High);
    assert!(adr.p_value < 0.01);

    let top = &corr.primary_performance_drivers[0];
    assert_eq!(top.metric, Metric::Adr);
    assert_eq!(top.significance, Significance::High);
    assert!(corr.surprising_findings.iter().all(|f| f.metric != Metric::Adr));
}

#[test]
fn test_partially_missing_metric_uses_available_samples() {
    let history: Vec<MatchMetricVector> = (0..10)
        .map(|i| {
            let hs = if i % 5 < 2 { None } else { Some(40.0 + i as f64) };
            MatchMetricVector::empty(start() + Duration::hours(i), "de_overpass")
                .with(Metric::Rating, Some(1.0 + 0.02 * (i % 3) as f64))
                .with(Metric::HeadshotPct, hs)
        })
        .collect();
    let result = analyze(&history, "p1", None).unwrap();

    let hs = &result.baselines[&Metric::HeadshotPct];
    assert_eq!(hs.sample_size, 6);
    assert!(hs.value.is_finite() && hs.variance.is_finite());
    assert!(
        result
            .warnings
            .iter()
            .any(|w| w == "headshot_pct missing in 4 of 10 matches")
    );

    assert!(
        result
            .current_stats
            .deviation_from_baseline
            .values()
            .all(|d| d.is_finite())
    );
    let json = serde_json::to_string(&result).unwrap();
    assert!(!json.contains("NaN"));
}

#[test]
fn test_strong_recent_run_is_flow_state() {
    let history = ratings(&[1.00, 1.02, 0.98, 1.01, 0.99, 1.00, 1.00, 1.45, 1.50, 1.40]);
    let result = analyze(&history, "p1", Some(12_000)).unwrap();
    assert!(result.flow_state.recent_occurrence);
    assert!(!result.tilt_analysis.active);
    assert_eq!(result.performance_state.state, PerformanceStateKind::FlowState);
}

#[test]
fn test_custom_policy_changes_minimum_window() {
    let engine = EnhancedAnalysisEngine::new(tiltwatch::config::AnalysisConfig {
        min_matches: 8,
        ..Default::default()
    })
    .unwrap();
    let err = engine
        .analyze(&ratings(&[1.0; 7]), "p1", None)
        .unwrap_err();
    assert_eq!(
        err,
        AnalysisError::InsufficientData {
            observed: 7,
            required: 8
        }
    );
}
