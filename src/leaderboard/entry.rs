//! The canonical leaderboard record.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::challenge::{ChallengeSummary, GameMode};

/// One player's best challenge in one mode.
///
/// `(name, mode)` identifies an entry. The wire and file form names the
/// time field `best_time`, in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Getters, derive_new::new)]
pub struct LeaderboardEntry {
    name: String,
    mode: GameMode,
    wins: u32,
    losses: u32,
    ties: u32,
    score: i64,
    #[serde(rename = "best_time")]
    best_time_ms: u64,
}

impl LeaderboardEntry {
    /// Builds the entry for a completed challenge.
    ///
    /// The best time is the challenge's total elapsed time.
    #[instrument(skip(name, summary), fields(score = summary.score()))]
    pub fn from_challenge(name: impl Into<String>, summary: &ChallengeSummary) -> Self {
        let tally = summary.tally();
        Self {
            name: name.into(),
            mode: *summary.mode(),
            wins: tally.wins,
            losses: tally.losses,
            ties: tally.ties,
            score: *summary.score(),
            best_time_ms: summary.elapsed_seconds().saturating_mul(1000),
        }
    }

    /// Whether `other` names the same player and mode.
    pub fn same_identity(&self, other: &LeaderboardEntry) -> bool {
        self.name == other.name && self.mode == other.mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::challenge::Tally;

    #[test]
    fn test_from_challenge_copies_tally_and_time() {
        let tally = Tally {
            wins: 2,
            ties: 1,
            losses: 2,
        };
        let summary = ChallengeSummary::new(GameMode::Ai, tally, 42, 85, Some(900));
        let entry = LeaderboardEntry::from_challenge("Ada", &summary);
        assert_eq!(entry.name(), "Ada");
        assert_eq!(*entry.wins(), 2);
        assert_eq!(*entry.ties(), 1);
        assert_eq!(*entry.losses(), 2);
        assert_eq!(*entry.score(), 85);
        assert_eq!(*entry.best_time_ms(), 42_000);
    }

    #[test]
    fn test_json_uses_canonical_field_names() {
        let entry = LeaderboardEntry::new("Ada".into(), GameMode::Friend, 1, 2, 2, -10, 5000);
        let json = serde_json::to_value(&entry).expect("Serialize");
        assert_eq!(json["best_time"], 5000);
        assert_eq!(json["mode"], "friend");
        assert!(json.get("best_time_ms").is_none());
    }
}
