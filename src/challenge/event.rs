//! What a session reports to its presentation layer.

use serde::{Deserialize, Serialize};

use super::round::RoundResult;
use super::tally::{PlayerOutcome, Tally};
use super::{GameMode, Phase};
use crate::games::tictactoe::{Board, Mark, WinningLine};

/// Final figures of a completed challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct ChallengeSummary {
    mode: GameMode,
    tally: Tally,
    elapsed_seconds: u64,
    score: i64,
    best_round_ms: Option<u64>,
}

impl ChallengeSummary {
    /// Bundles the figures of a finished challenge.
    pub fn new(
        mode: GameMode,
        tally: Tally,
        elapsed_seconds: u64,
        score: i64,
        best_round_ms: Option<u64>,
    ) -> Self {
        Self {
            mode,
            tally,
            elapsed_seconds,
            score,
            best_round_ms,
        }
    }
}

/// A state transition, queued until [`drain_events`](super::ChallengeSession::drain_events).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The session moved between phases.
    PhaseChanged {
        /// Phase before.
        from: Phase,
        /// Phase after.
        to: Phase,
    },
    /// A round ended.
    RoundFinished {
        /// 1-based round number; zero for casual play.
        round: u32,
        /// How it ended.
        result: RoundResult,
        /// The result from the human's side.
        outcome: PlayerOutcome,
    },
    /// The countdown dropped to `remaining`.
    CountdownTick {
        /// Ticks left.
        remaining: u32,
    },
    /// The session clock reached `elapsed_seconds`.
    ClockTick {
        /// Seconds since the challenge started.
        elapsed_seconds: u64,
    },
    /// The challenge was scored. Carries the persistence request.
    ChallengeComplete(ChallengeSummary),
}

/// Read-only view handed to the presentation layer after every transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Current board.
    pub board: Board,
    /// Session phase.
    pub phase: Phase,
    /// Opponent mode.
    pub mode: GameMode,
    /// Mark on turn, if the round is live.
    pub turn: Option<Mark>,
    /// Whether the opponent's move is pending.
    pub opponent_thinking: bool,
    /// Challenge tally.
    pub tally: Tally,
    /// Casual-play tally.
    pub casual_tally: Tally,
    /// 1-based round number, zero when idle.
    pub round_index: u32,
    /// Rounds per challenge.
    pub total_rounds: u32,
    /// Visible countdown value.
    pub countdown: Option<u32>,
    /// Seconds on the session clock.
    pub elapsed_seconds: u64,
    /// The most recent round result.
    pub last_outcome: Option<RoundResult>,
    /// Winning triple on the current board.
    pub winning_line: Option<WinningLine>,
    /// Fastest finished round.
    pub best_round_ms: Option<u64>,
    /// Score, once the challenge is complete.
    pub final_score: Option<i64>,
}
