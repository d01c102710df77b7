//! Win/tie/loss bookkeeping.

use serde::{Deserialize, Serialize};

/// A finished round seen from one player's side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
pub enum PlayerOutcome {
    /// The player won.
    Win,
    /// Nobody won.
    Tie,
    /// The other side won.
    Loss,
}

/// Running counts for a challenge or a casual streak.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tally {
    /// Rounds won.
    pub wins: u32,
    /// Rounds tied.
    pub ties: u32,
    /// Rounds lost.
    pub losses: u32,
}

impl Tally {
    /// Counts one outcome.
    pub fn record(&mut self, outcome: PlayerOutcome) {
        match outcome {
            PlayerOutcome::Win => self.wins += 1,
            PlayerOutcome::Tie => self.ties += 1,
            PlayerOutcome::Loss => self.losses += 1,
        }
    }

    /// Rounds counted so far.
    pub fn total(&self) -> u32 {
        self.wins + self.ties + self.losses
    }
}

impl std::fmt::Display for Tally {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}W {}T {}L", self.wins, self.ties, self.losses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_counts_each_outcome() {
        let mut tally = Tally::default();
        tally.record(PlayerOutcome::Win);
        tally.record(PlayerOutcome::Win);
        tally.record(PlayerOutcome::Loss);
        tally.record(PlayerOutcome::Tie);
        assert_eq!(
            tally,
            Tally {
                wins: 2,
                ties: 1,
                losses: 1
            }
        );
        assert_eq!(tally.total(), 4);
        assert_eq!(tally.to_string(), "2W 1T 1L");
    }
}
