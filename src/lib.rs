//! Strictly Challenge - a five-round tic-tac-toe challenge
//!
//! Play five rounds against a beatable heuristic opponent (or a friend on
//! the same keyboard), get a score from wins, ties, losses and time, and
//! land on a leaderboard.
//!
//! # Architecture
//!
//! - **Games**: the tic-tac-toe board engine and heuristic opponent
//! - **Challenge**: round controller, session state machine, timers, score
//! - **Leaderboard**: canonical entries, standings and the stores behind them
//! - **Runtime**: tokio driver that feeds commands and time to a session
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use strictly_challenge::{ChallengeSession, Phase, SessionSettings};
//!
//! let mut session = ChallengeSession::new(SessionSettings::default().with_seed(7));
//! session.start_challenge();
//! session.submit_move(4).expect("Center is free");
//! session.advance(Duration::from_millis(600));
//! assert_eq!(session.round().board().move_count(), 2);
//! assert_eq!(session.phase(), Phase::InRound);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod challenge;
mod config;
mod db;
mod games;
mod invite;
mod leaderboard;
mod runtime;

// Crate-level exports - Board engine and opponent
pub use games::tictactoe::{
    Board, DEFAULT_RANDOMNESS, HeuristicOpponent, Mark, Move, MoveError, NoMoveAvailable, Outcome,
    Position, Square, WinningLine, evaluate, find_winning_move, select_move,
};

// Crate-level exports - Challenge
pub use challenge::{
    ChallengeSession, ChallengeSummary, GameMode, Phase, PlayerOutcome, RoundController,
    RoundResult, RoundState, RoundStep, RoundWinner, SessionEvent, SessionSettings, Snapshot,
    Tally, TimerKind, TimerSchedule, TimerToken, challenge_score, format_round_time, format_timer,
};

// Crate-level exports - Leaderboard
pub use leaderboard::{
    ApplyOutcome, CachedLeaderboard, DEFAULT_TIMEOUT, LeaderboardEntry, LeaderboardError,
    LeaderboardSync, MemoryLeaderboard, RestLeaderboard, SqliteLeaderboard, Standings,
};

// Crate-level exports - Database
pub use db::{LeaderboardRepository, LeaderboardRow, NewLeaderboardRow};

// Crate-level exports - Configuration
pub use config::{
    ChallengeConfig, ConfigError, LEADERBOARD_API_KEY_VAR, LEADERBOARD_URL_VAR, LeaderboardBackend,
    LeaderboardConfig, MAX_NAME_LEN, normalize_name,
};

// Crate-level exports - Invites
pub use invite::{ChallengeInvite, DEFAULT_INVITE_BASE, DEFAULT_TARGET, InviteError};

// Crate-level exports - Runtime
pub use runtime::{ChallengeDriver, ChallengeHandle, Command, DriverStopped, ViewState};
