//! Offline fallback for a leaderboard store.

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use super::{LeaderboardEntry, LeaderboardError, LeaderboardSync, Standings};

/// Wraps a store with a JSON file holding the last good standings.
///
/// Reads fall back to the file when the inner store fails. Failed writes
/// are still recorded in the file so the player sees their score offline,
/// but the failure is returned to the caller.
#[derive(Debug)]
pub struct CachedLeaderboard<S> {
    inner: S,
    path: PathBuf,
}

impl<S: LeaderboardSync> CachedLeaderboard<S> {
    /// Caches `inner` at `path`.
    pub fn new(inner: S, path: impl Into<PathBuf>) -> Self {
        Self {
            inner,
            path: path.into(),
        }
    }

    /// Cache file location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the cached standings.
    ///
    /// # Errors
    ///
    /// Returns [`LeaderboardError`] if the file is missing or malformed.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub async fn load(&self) -> Result<Standings, LeaderboardError> {
        let bytes = tokio::fs::read(&self.path).await?;
        let entries: Vec<LeaderboardEntry> = serde_json::from_slice(&bytes)?;
        debug!(count = entries.len(), "Cache loaded");
        Ok(Standings::new(entries))
    }

    async fn store(&self, standings: &Standings) -> Result<(), LeaderboardError> {
        let json = serde_json::to_vec_pretty(standings.entries())?;
        tokio::fs::write(&self.path, json).await?;
        debug!(count = standings.len(), path = %self.path.display(), "Cache written");
        Ok(())
    }

    async fn merge(&self, entry: LeaderboardEntry) {
        let mut standings = self.load().await.unwrap_or_default();
        standings.apply(entry);
        if let Err(e) = self.store(&standings).await {
            warn!(error = %e, "Failed to update leaderboard cache");
        }
    }
}

#[async_trait::async_trait]
impl<S: LeaderboardSync> LeaderboardSync for CachedLeaderboard<S> {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn fetch_all(&self) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
        match self.inner.fetch_all().await {
            Ok(entries) => {
                if let Err(e) = self.store(&Standings::new(entries.clone())).await {
                    warn!(error = %e, "Failed to write leaderboard cache");
                }
                Ok(entries)
            }
            Err(e) => {
                warn!(error = %e, "Leaderboard store unavailable, reading cache");
                match self.load().await {
                    Ok(cached) => {
                        info!(count = cached.len(), "Serving cached leaderboard");
                        Ok(cached.entries().to_vec())
                    }
                    Err(cache_err) => {
                        debug!(error = %cache_err, "No usable cache");
                        Err(e)
                    }
                }
            }
        }
    }

    #[instrument(skip(self, entry), fields(name = %entry.name(), mode = %entry.mode()))]
    async fn upsert(&self, entry: LeaderboardEntry) -> Result<LeaderboardEntry, LeaderboardError> {
        match self.inner.upsert(entry.clone()).await {
            Ok(stored) => {
                self.merge(stored.clone()).await;
                Ok(stored)
            }
            Err(e) => {
                warn!(error = %e, "Upsert failed, recording entry in cache");
                self.merge(entry).await;
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::challenge::GameMode;

    /// Store that always fails.
    struct Offline;

    #[async_trait::async_trait]
    impl LeaderboardSync for Offline {
        async fn fetch_all(&self) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
            Err(LeaderboardError::new("offline"))
        }

        async fn upsert(&self, _entry: LeaderboardEntry) -> Result<LeaderboardEntry, LeaderboardError> {
            Err(LeaderboardError::new("offline"))
        }
    }

    fn entry(name: &str, score: i64) -> LeaderboardEntry {
        LeaderboardEntry::new(name.to_string(), GameMode::Ai, 1, 1, 1, score, 1000)
    }

    #[tokio::test]
    async fn test_fetch_refreshes_cache_and_serves_it_offline() {
        let dir = tempfile::tempdir().expect("Temp dir");
        let path = dir.path().join("cache.json");

        let online = CachedLeaderboard::new(
            crate::leaderboard::MemoryLeaderboard::with_entries([entry("Ada", 120)]),
            &path,
        );
        assert_eq!(online.fetch_all().await.expect("Fetch").len(), 1);

        let offline = CachedLeaderboard::new(Offline, &path);
        let cached = offline.fetch_all().await.expect("Cached");
        assert_eq!(cached, vec![entry("Ada", 120)]);
    }

    #[tokio::test]
    async fn test_failed_upsert_is_cached_but_reported() {
        let dir = tempfile::tempdir().expect("Temp dir");
        let store = CachedLeaderboard::new(Offline, dir.path().join("cache.json"));

        assert!(store.upsert(entry("Bob", 50)).await.is_err());
        let cached = store.load().await.expect("Cache written");
        assert_eq!(cached.get("Bob", GameMode::Ai).map(|e| *e.score()), Some(50));
    }

    #[tokio::test]
    async fn test_no_cache_surfaces_store_error() {
        let dir = tempfile::tempdir().expect("Temp dir");
        let store = CachedLeaderboard::new(Offline, dir.path().join("missing.json"));
        assert!(store.fetch_all().await.is_err());
    }
}
