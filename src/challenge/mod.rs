//! The five-round challenge built on top of the tic-tac-toe engine.
//!
//! [`RoundController`] plays one round, [`ChallengeSession`] sequences
//! rounds, countdowns and scoring on a virtual clock driven by
//! [`TimerSchedule`].

mod event;
mod mode;
mod round;
mod score;
mod session;
mod tally;
mod timer;

pub use event::{ChallengeSummary, SessionEvent, Snapshot};
pub use mode::GameMode;
pub use round::{RoundController, RoundResult, RoundState, RoundStep, RoundWinner};
pub use score::{challenge_score, format_round_time, format_timer};
pub use session::{ChallengeSession, Phase, SessionSettings};
pub use tally::{PlayerOutcome, Tally};
pub use timer::{TimerKind, TimerSchedule, TimerToken};
