use crate::domain::ports::{MatchHistoryProvider, PlayerProfileProvider};
use crate::domain::types::RawMatchRecord;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Clone, Default)]
struct PlayerEntry {
    premier_rating: Option<u32>,
    matches: Vec<RawMatchRecord>,
}

/// In-memory player store implementing both provider ports.
#[derive(Clone, Default)]
pub struct InMemoryPlayerStore {
    players: Arc<RwLock<HashMap<String, PlayerEntry>>>,
}

impl InMemoryPlayerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace everything known about `player_id`.
    pub async fn insert(
        &self,
        player_id: &str,
        premier_rating: Option<u32>,
        matches: Vec<RawMatchRecord>,
    ) {
        let mut players = self.players.write().await;
        players.insert(
            player_id.to_string(),
            PlayerEntry {
                premier_rating,
                matches,
            },
        );
    }

    pub async fn push_match(&self, player_id: &str, record: RawMatchRecord) {
        let mut players = self.players.write().await;
        players
            .entry(player_id.to_string())
            .or_default()
            .matches
            .push(record);
    }
}

#[async_trait]
impl MatchHistoryProvider for InMemoryPlayerStore {
    async fn recent_matches(&self, player_id: &str, count: usize) -> Result<Vec<RawMatchRecord>> {
        let players = self.players.read().await;
        let entry = players
            .get(player_id)
            .ok_or_else(|| anyhow!("Unknown player: {}", player_id))?;

        let mut matches = entry.matches.clone();
        matches.sort_by_key(|m| m.finished_at);
        let skip = matches.len().saturating_sub(count);
        debug!(
            "InMemoryPlayerStore: serving {} of {} matches for {}",
            matches.len() - skip,
            matches.len(),
            player_id
        );
        Ok(matches.split_off(skip))
    }
}

#[async_trait]
impl PlayerProfileProvider for InMemoryPlayerStore {
    async fn premier_rating(&self, player_id: &str) -> Result<Option<u32>> {
        let players = self.players.read().await;
        Ok(players.get(player_id).and_then(|p| p.premier_rating))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn record(hour: i64) -> RawMatchRecord {
        RawMatchRecord {
            finished_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap() + Duration::hours(hour),
            rating: Some(1.0),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_returns_latest_matches_in_order() {
        let store = InMemoryPlayerStore::new();
        store.insert("p1", Some(11_000), vec![record(3), record(1), record(2)]).await;
        store.push_match("p1", record(4)).await;

        let matches = store.recent_matches("p1", 2).await.unwrap();
        let hours: Vec<_> = matches.iter().map(|m| m.finished_at).collect();
        assert_eq!(hours, vec![record(3).finished_at, record(4).finished_at]);
        assert_eq!(store.premier_rating("p1").await.unwrap(), Some(11_000));
    }

    #[tokio::test]
    async fn test_unknown_player() {
        let store = InMemoryPlayerStore::new();
        assert!(store.recent_matches("nobody", 10).await.is_err());
        assert_eq!(store.premier_rating("nobody").await.unwrap(), None);
    }
}
