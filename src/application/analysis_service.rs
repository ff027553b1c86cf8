use crate::application::analysis_result::EnhancedAnalysisResult;
use crate::application::engine::EnhancedAnalysisEngine;
use crate::application::metric_extractor::MetricExtractor;
use crate::domain::config::AnalysisConfig;
use crate::domain::errors::AnalysisError;
use crate::domain::ports::{MatchHistoryProvider, PlayerProfileProvider};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};

/// Fetches a player's history through the ports and runs the engine on it.
pub struct AnalysisService {
    history: Arc<dyn MatchHistoryProvider>,
    profiles: Arc<dyn PlayerProfileProvider>,
    extractor: MetricExtractor,
    engine: EnhancedAnalysisEngine,
}

impl AnalysisService {
    pub fn new(
        history: Arc<dyn MatchHistoryProvider>,
        profiles: Arc<dyn PlayerProfileProvider>,
        config: AnalysisConfig,
    ) -> Result<Self> {
        let engine = EnhancedAnalysisEngine::new(config).context("Invalid analysis config")?;
        let extractor = MetricExtractor::new(engine.config());
        Ok(Self {
            history,
            profiles,
            extractor,
            engine,
        })
    }

    pub fn config(&self) -> &AnalysisConfig {
        self.engine.config()
    }

    /// Analyze the `count` most recent matches of `player_id`.
    ///
    /// `count` must lie within the configured window bounds. Errors from the
    /// engine stay downcastable to [`AnalysisError`].
    pub async fn analyze_player(
        &self,
        player_id: &str,
        count: usize,
    ) -> Result<EnhancedAnalysisResult> {
        let cfg = self.engine.config();
        if !(cfg.min_matches..=cfg.max_matches).contains(&count) {
            return Err(AnalysisError::InvalidRequest {
                reason: format!(
                    "requested {} matches, must be between {} and {}",
                    count, cfg.min_matches, cfg.max_matches
                ),
            }
            .into());
        }

        let records = self
            .history
            .recent_matches(player_id, count)
            .await
            .context(format!("Failed to fetch match history for {}", player_id))?;
        let premier_rating = self
            .profiles
            .premier_rating(player_id)
            .await
            .context(format!("Failed to fetch profile for {}", player_id))?;

        if records.len() > count {
            warn!(
                "Provider returned {} matches for {}, {} requested",
                records.len(),
                player_id,
                count
            );
        }

        let mut vectors = self.extractor.extract_all(&records);
        if vectors.len() > count {
            vectors.drain(..vectors.len() - count);
        }
        info!(
            "Fetched {} matches for {} (premier rating: {:?})",
            vectors.len(),
            player_id,
            premier_rating
        );

        let result = self.engine.analyze(&vectors, player_id, premier_rating)?;
        Ok(result)
    }
}
