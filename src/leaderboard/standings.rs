//! In-memory leaderboard snapshot.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::LeaderboardEntry;
use crate::challenge::GameMode;

/// What [`Standings::apply`] did with a candidate entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// No entry existed for the identity.
    Inserted,
    /// The candidate scored strictly higher and replaced the old entry.
    Improved,
    /// The existing entry scored the same or higher and was kept.
    Kept,
}

/// Entries ordered by score descending, then best time ascending, then name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standings {
    entries: Vec<LeaderboardEntry>,
}

impl Standings {
    /// Builds standings from unordered entries.
    ///
    /// Duplicate identities keep only their best score.
    pub fn new(entries: impl IntoIterator<Item = LeaderboardEntry>) -> Self {
        let mut standings = Self::default();
        for entry in entries {
            standings.apply(entry);
        }
        standings
    }

    /// Entries in rank order.
    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries for one mode, in rank order.
    pub fn for_mode(&self, mode: GameMode) -> impl Iterator<Item = &LeaderboardEntry> {
        self.entries.iter().filter(move |e| *e.mode() == mode)
    }

    /// The entry for `(name, mode)`.
    pub fn get(&self, name: &str, mode: GameMode) -> Option<&LeaderboardEntry> {
        self.entries
            .iter()
            .find(|e| e.name() == name && *e.mode() == mode)
    }

    /// 1-based rank of `(name, mode)` among entries of that mode.
    pub fn rank_of(&self, name: &str, mode: GameMode) -> Option<usize> {
        self.for_mode(mode)
            .position(|e| e.name() == name)
            .map(|i| i + 1)
    }

    /// Merges `entry` with update-if-better semantics.
    ///
    /// An existing entry is only replaced by a strictly higher score.
    #[instrument(skip(self, entry), fields(name = %entry.name(), mode = %entry.mode(), score = entry.score()))]
    pub fn apply(&mut self, entry: LeaderboardEntry) -> ApplyOutcome {
        let outcome = match self.entries.iter().position(|e| e.same_identity(&entry)) {
            None => {
                self.entries.push(entry);
                ApplyOutcome::Inserted
            }
            Some(i) if entry.score() > self.entries[i].score() => {
                self.entries[i] = entry;
                ApplyOutcome::Improved
            }
            Some(_) => ApplyOutcome::Kept,
        };
        self.sort();
        debug!(?outcome, "Standings updated");
        outcome
    }

    fn sort(&mut self) {
        self.entries.sort_by(|a, b| {
            b.score()
                .cmp(a.score())
                .then_with(|| a.best_time_ms().cmp(b.best_time_ms()))
                .then_with(|| a.name().cmp(b.name()))
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, mode: GameMode, score: i64, time: u64) -> LeaderboardEntry {
        LeaderboardEntry::new(name.to_string(), mode, 0, 0, 0, score, time)
    }

    #[test]
    fn test_orders_by_score_then_time_then_name() {
        let standings = Standings::new([
            entry("Cy", GameMode::Ai, 100, 9000),
            entry("Bo", GameMode::Ai, 300, 9000),
            entry("Al", GameMode::Ai, 100, 5000),
            entry("Ab", GameMode::Ai, 100, 5000),
        ]);
        let names: Vec<_> = standings.entries().iter().map(|e| e.name().as_str()).collect();
        assert_eq!(names, ["Bo", "Ab", "Al", "Cy"]);
    }

    #[test]
    fn test_apply_only_replaces_strictly_better_score() {
        let mut standings = Standings::new([entry("Ada", GameMode::Ai, 200, 30_000)]);
        assert_eq!(
            standings.apply(entry("Ada", GameMode::Ai, 200, 10_000)),
            ApplyOutcome::Kept
        );
        assert_eq!(
            standings.apply(entry("Ada", GameMode::Ai, 150, 10_000)),
            ApplyOutcome::Kept
        );
        assert_eq!(standings.get("Ada", GameMode::Ai).map(|e| *e.best_time_ms()), Some(30_000));

        assert_eq!(
            standings.apply(entry("Ada", GameMode::Ai, 250, 40_000)),
            ApplyOutcome::Improved
        );
        assert_eq!(standings.get("Ada", GameMode::Ai).map(|e| *e.score()), Some(250));
        assert_eq!(standings.len(), 1);
    }

    #[test]
    fn test_modes_are_separate_identities() {
        let mut standings = Standings::default();
        standings.apply(entry("Ada", GameMode::Ai, 100, 0));
        assert_eq!(
            standings.apply(entry("Ada", GameMode::Friend, 50, 0)),
            ApplyOutcome::Inserted
        );
        assert_eq!(standings.len(), 2);
    }

    #[test]
    fn test_rank_is_per_mode() {
        let standings = Standings::new([
            entry("Ada", GameMode::Ai, 300, 0),
            entry("Bob", GameMode::Friend, 400, 0),
            entry("Cat", GameMode::Ai, 200, 0),
        ]);
        assert_eq!(standings.rank_of("Ada", GameMode::Ai), Some(1));
        assert_eq!(standings.rank_of("Cat", GameMode::Ai), Some(2));
        assert_eq!(standings.rank_of("Bob", GameMode::Friend), Some(1));
        assert_eq!(standings.rank_of("Bob", GameMode::Ai), None);
    }
}
