//! Database models for leaderboard rows.

use std::str::FromStr;

use chrono::NaiveDateTime;
use derive_getters::Getters;
use derive_new::new;
use diesel::prelude::*;
use tracing::instrument;

use crate::challenge::GameMode;
use crate::db::schema;
use crate::leaderboard::{LeaderboardEntry, LeaderboardError};

/// Leaderboard row as stored.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Getters)]
#[diesel(table_name = schema::leaderboard)]
pub struct LeaderboardRow {
    id: i32,
    name: String,
    mode: String,
    wins: i32,
    losses: i32,
    ties: i32,
    score: i64,
    best_time_ms: i64,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

impl LeaderboardRow {
    /// Converts the row into the canonical entry.
    ///
    /// # Errors
    ///
    /// Returns [`LeaderboardError`] if the mode tag is unknown or a counter
    /// is negative.
    #[instrument(skip(self), fields(id = self.id, name = %self.name))]
    pub fn to_entry(&self) -> Result<LeaderboardEntry, LeaderboardError> {
        let mode = GameMode::from_str(&self.mode)
            .map_err(|_| LeaderboardError::new(format!("Invalid mode: '{}'", self.mode)))?;
        Ok(LeaderboardEntry::new(
            self.name.clone(),
            mode,
            to_u32(self.wins, "wins")?,
            to_u32(self.losses, "losses")?,
            to_u32(self.ties, "ties")?,
            self.score,
            u64::try_from(self.best_time_ms)
                .map_err(|_| LeaderboardError::new("Negative best_time_ms"))?,
        ))
    }
}

/// Insertable leaderboard row.
#[derive(Debug, Clone, Insertable, AsChangeset, new, Getters)]
#[diesel(table_name = schema::leaderboard)]
pub struct NewLeaderboardRow {
    name: String,
    mode: String,
    wins: i32,
    losses: i32,
    ties: i32,
    score: i64,
    best_time_ms: i64,
}

impl NewLeaderboardRow {
    /// Converts a canonical entry into a row.
    ///
    /// # Errors
    ///
    /// Returns [`LeaderboardError`] if a value does not fit its column.
    #[instrument(skip(entry), fields(name = %entry.name()))]
    pub fn from_entry(entry: &LeaderboardEntry) -> Result<Self, LeaderboardError> {
        Ok(Self::new(
            entry.name().clone(),
            entry.mode().to_string(),
            to_i32(*entry.wins(), "wins")?,
            to_i32(*entry.losses(), "losses")?,
            to_i32(*entry.ties(), "ties")?,
            *entry.score(),
            i64::try_from(*entry.best_time_ms())
                .map_err(|_| LeaderboardError::new("best_time_ms out of range"))?,
        ))
    }
}

fn to_u32(value: i32, column: &str) -> Result<u32, LeaderboardError> {
    u32::try_from(value).map_err(|_| LeaderboardError::new(format!("Negative {}: {}", column, value)))
}

fn to_i32(value: u32, column: &str) -> Result<i32, LeaderboardError> {
    i32::try_from(value)
        .map_err(|_| LeaderboardError::new(format!("{} out of range: {}", column, value)))
}
