use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tiltwatch::application::{AnalysisService, ResultComponent};
use tiltwatch::config::AnalysisConfig;
use tiltwatch::domain::errors::AnalysisError;
use tiltwatch::domain::state::PerformanceStateKind;
use tiltwatch::infrastructure::{JsonFileProvider, PlayerHistoryFile};

async fn export(name: &str, ratings: &[f64]) -> PathBuf {
    let matches: Vec<_> = ratings
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let map = if i % 2 == 0 { "de_mirage" } else { "de_vertigo" };
            json!({
                "matchId": format!("m{}", i),
                "finishedAt": format!("2025-08-0{}T{:02}:30:00Z", 1 + i / 12, 8 + i % 12),
                "map": map,
                "rating": r,
                "kills": 18,
                "deaths": 16,
                "adr": 70.0 + 10.0 * r,
                "utilityDamage": 40.0,
                "enemiesFlashed": 2.0,
                "utilityThrown": 5.0
            })
        })
        .collect();
    let body = json!({
        "playerId": "steam:7",
        "premierRating": 15_400,
        "matches": matches,
    });
    let path = std::env::temp_dir().join(format!(
        "tiltwatch-it-{}-{}.json",
        name,
        std::process::id()
    ));
    tokio::fs::write(&path, body.to_string()).await.unwrap();
    path
}

async fn service(path: &PathBuf) -> AnalysisService {
    let provider = Arc::new(JsonFileProvider::load(path).await.unwrap());
    AnalysisService::new(provider.clone(), provider, AnalysisConfig::default()).unwrap()
}

#[tokio::test]
async fn test_file_history_end_to_end() {
    let path = export(
        "tilt",
        &[1.25, 1.30, 1.28, 1.27, 1.29, 1.26, 1.28, 0.75, 0.70, 0.62],
    )
    .await;
    let result = service(&path).await.analyze_player("steam:7", 10).await.unwrap();

    assert_eq!(result.matches_analyzed, 10);
    assert_eq!(result.performance_state.state, PerformanceStateKind::TiltCascade);
    assert_eq!(result.thresholds.premier_rating, Some(15_400));
    assert!(result.current_stats.stats.kd_ratio.is_some());
    assert_eq!(result.patterns.by_map.len(), 2);

    let view = serde_json::to_value(result.view(ResultComponent::PerformanceState)).unwrap();
    assert_eq!(view["performanceState"]["state"], "tilt_cascade");

    tokio::fs::remove_file(&path).await.ok();
}

#[tokio::test]
async fn test_short_file_history_is_insufficient() {
    let path = export("short", &[1.0, 1.1, 0.9]).await;
    let err = service(&path)
        .await
        .analyze_player("steam:7", 10)
        .await
        .unwrap_err();
    assert_eq!(
        err.downcast_ref::<AnalysisError>(),
        Some(&AnalysisError::InsufficientData {
            observed: 3,
            required: 5
        })
    );
    tokio::fs::remove_file(&path).await.ok();
}

#[test]
fn test_export_format_round_trips() {
    let file: PlayerHistoryFile = serde_json::from_value(json!({
        "playerId": "x",
        "matches": [{"finishedAt": "2025-01-01T00:00:00Z"}]
    }))
    .unwrap();
    assert_eq!(file.premier_rating, None);
    assert_eq!(file.matches.len(), 1);
    assert!(serde_json::to_value(&file).unwrap()["matches"].is_array());
}
