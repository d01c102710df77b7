//! SQLite persistence for leaderboard entries.

mod models;
mod repository;
mod schema;

pub use models::{LeaderboardRow, NewLeaderboardRow};
pub use repository::LeaderboardRepository;
