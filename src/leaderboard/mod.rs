//! Leaderboard entries, standings and the stores that persist them.
//!
//! [`LeaderboardSync`] is the seam the runtime talks to. Every store keeps
//! update-if-better semantics: a lower or equal score never replaces a
//! stored one.

mod cache;
mod entry;
mod error;
mod remote;
mod sqlite;
mod standings;
mod sync;

pub use cache::CachedLeaderboard;
pub use entry::LeaderboardEntry;
pub use error::LeaderboardError;
pub use remote::{DEFAULT_TIMEOUT, RestLeaderboard};
pub use sqlite::SqliteLeaderboard;
pub use standings::{ApplyOutcome, Standings};
pub use sync::{LeaderboardSync, MemoryLeaderboard};
