//! The leaderboard store seam and its in-process implementation.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, instrument};

use super::{LeaderboardEntry, LeaderboardError, Standings};

/// A store that keeps one best entry per `(name, mode)`.
///
/// Implementations must never overwrite an existing entry with a lower or
/// equal score.
#[async_trait::async_trait]
pub trait LeaderboardSync: Send + Sync {
    /// All entries, highest score first.
    async fn fetch_all(&self) -> Result<Vec<LeaderboardEntry>, LeaderboardError>;

    /// Stores `entry` if it beats the existing score for its identity.
    ///
    /// Returns the entry as persisted, which is the older one when the
    /// candidate did not improve on it.
    async fn upsert(&self, entry: LeaderboardEntry) -> Result<LeaderboardEntry, LeaderboardError>;
}

#[async_trait::async_trait]
impl<T: LeaderboardSync + ?Sized> LeaderboardSync for Arc<T> {
    async fn fetch_all(&self) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
        (**self).fetch_all().await
    }

    async fn upsert(&self, entry: LeaderboardEntry) -> Result<LeaderboardEntry, LeaderboardError> {
        (**self).upsert(entry).await
    }
}

/// Leaderboard kept in memory for the life of the process.
#[derive(Debug, Default)]
pub struct MemoryLeaderboard {
    standings: RwLock<Standings>,
}

impl MemoryLeaderboard {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding `entries`.
    pub fn with_entries(entries: impl IntoIterator<Item = LeaderboardEntry>) -> Self {
        Self {
            standings: RwLock::new(Standings::new(entries)),
        }
    }
}

#[async_trait::async_trait]
impl LeaderboardSync for MemoryLeaderboard {
    #[instrument(skip(self))]
    async fn fetch_all(&self) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
        Ok(self.standings.read().await.entries().to_vec())
    }

    #[instrument(skip(self, entry), fields(name = %entry.name(), mode = %entry.mode()))]
    async fn upsert(&self, entry: LeaderboardEntry) -> Result<LeaderboardEntry, LeaderboardError> {
        let mut standings = self.standings.write().await;
        let (name, mode) = (entry.name().clone(), *entry.mode());
        let outcome = standings.apply(entry);
        info!(?outcome, "Memory leaderboard upsert");
        standings
            .get(&name, mode)
            .cloned()
            .ok_or_else(|| LeaderboardError::new("Entry missing after upsert"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::challenge::GameMode;

    #[tokio::test]
    async fn test_upsert_keeps_higher_score() {
        let store = MemoryLeaderboard::new();
        let first = LeaderboardEntry::new("Ada".into(), GameMode::Ai, 3, 1, 1, 230, 20_000);
        let worse = LeaderboardEntry::new("Ada".into(), GameMode::Ai, 1, 3, 1, -80, 20_000);

        assert_eq!(store.upsert(first.clone()).await.expect("Upsert"), first);
        assert_eq!(store.upsert(worse).await.expect("Upsert"), first);
        assert_eq!(store.fetch_all().await.expect("Fetch"), vec![first]);
    }
}
