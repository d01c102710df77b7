//! SQLite-backed leaderboard store.

use tracing::instrument;

use super::{LeaderboardEntry, LeaderboardError, LeaderboardSync};
use crate::db::LeaderboardRepository;

/// [`LeaderboardSync`] over a local SQLite file.
///
/// Diesel calls block, so each operation runs on tokio's blocking pool.
#[derive(Debug, Clone)]
pub struct SqliteLeaderboard {
    repo: LeaderboardRepository,
}

impl SqliteLeaderboard {
    /// Opens the database at `db_path`, creating the schema if needed.
    ///
    /// # Errors
    ///
    /// Returns [`LeaderboardError`] if the database cannot be opened or
    /// migrated.
    #[instrument(skip(db_path), fields(db_path = %db_path.as_ref()))]
    pub fn open(db_path: impl AsRef<str>) -> Result<Self, LeaderboardError> {
        let repo = LeaderboardRepository::new(db_path.as_ref().to_string())?;
        repo.run_migrations()?;
        Ok(Self { repo })
    }

    /// The underlying repository.
    pub fn repository(&self) -> &LeaderboardRepository {
        &self.repo
    }
}

#[async_trait::async_trait]
impl LeaderboardSync for SqliteLeaderboard {
    #[instrument(skip(self))]
    async fn fetch_all(&self) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
        let repo = self.repo.clone();
        tokio::task::spawn_blocking(move || repo.list()).await?
    }

    #[instrument(skip(self, entry), fields(name = %entry.name(), mode = %entry.mode()))]
    async fn upsert(&self, entry: LeaderboardEntry) -> Result<LeaderboardEntry, LeaderboardError> {
        let repo = self.repo.clone();
        tokio::task::spawn_blocking(move || repo.upsert_if_better(&entry)).await?
    }
}
