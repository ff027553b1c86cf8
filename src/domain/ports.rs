use crate::domain::types::RawMatchRecord;
use anyhow::Result;
use async_trait::async_trait;

/// Source of a player's recent match telemetry.
#[async_trait]
pub trait MatchHistoryProvider: Send + Sync {
    /// Up to `count` most recent matches. Order is not guaranteed; the
    /// extractor sorts them.
    async fn recent_matches(&self, player_id: &str, count: usize) -> Result<Vec<RawMatchRecord>>;
}

#[async_trait]
pub trait PlayerProfileProvider: Send + Sync {
    /// Current premier rating, if the player has one.
    async fn premier_rating(&self, player_id: &str) -> Result<Option<u32>>;
}
