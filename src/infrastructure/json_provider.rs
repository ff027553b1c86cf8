//! File-backed provider for offline analysis.
//!
//! Reads a single player's export:
//! `{ "playerId": "...", "premierRating": 14200, "matches": [ ... ] }`

use crate::domain::ports::{MatchHistoryProvider, PlayerProfileProvider};
use crate::domain::types::RawMatchRecord;
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerHistoryFile {
    pub player_id: String,
    #[serde(default)]
    pub premier_rating: Option<u32>,
    pub matches: Vec<RawMatchRecord>,
}

/// Serves one player's history loaded from a JSON export.
#[derive(Debug, Clone)]
pub struct JsonFileProvider {
    path: PathBuf,
    data: PlayerHistoryFile,
}

impl JsonFileProvider {
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let content = tokio::fs::read_to_string(&path)
            .await
            .context(format!("Failed to read history file: {}", path.display()))?;
        let data: PlayerHistoryFile = serde_json::from_str(&content)
            .context(format!("Failed to parse history file: {}", path.display()))?;
        info!(
            "Loaded {} matches for {} from {}",
            data.matches.len(),
            data.player_id,
            path.display()
        );
        Ok(Self { path, data })
    }

    pub fn player_id(&self) -> &str {
        &self.data.player_id
    }

    pub fn match_count(&self) -> usize {
        self.data.matches.len()
    }

    fn check_player(&self, player_id: &str) -> Result<()> {
        if player_id != self.data.player_id {
            bail!(
                "{} holds history for {}, not {}",
                self.path.display(),
                self.data.player_id,
                player_id
            );
        }
        Ok(())
    }
}

#[async_trait]
impl MatchHistoryProvider for JsonFileProvider {
    async fn recent_matches(&self, player_id: &str, count: usize) -> Result<Vec<RawMatchRecord>> {
        self.check_player(player_id)?;
        let mut matches = self.data.matches.clone();
        matches.sort_by_key(|m| m.finished_at);
        let skip = matches.len().saturating_sub(count);
        Ok(matches.split_off(skip))
    }
}

#[async_trait]
impl PlayerProfileProvider for JsonFileProvider {
    async fn premier_rating(&self, player_id: &str) -> Result<Option<u32>> {
        self.check_player(player_id)?;
        Ok(self.data.premier_rating)
    }
}
