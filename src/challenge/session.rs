//! Challenge session state machine.
//!
//! ```text
//! Idle -> InRound -> CountdownToNextRound -> InRound -> ... -> CountdownToScoring -> Complete
//!  ^                                                                                     |
//!  +------------------------------------ new_game ---------------------------------------+
//! ```
//!
//! The session is a plain value driven by discrete inputs: player commands
//! and [`ChallengeSession::advance`], which moves its virtual clock and
//! fires due timers. Nothing here sleeps or spawns.

use std::time::Duration;

use tracing::{debug, error, info, instrument, warn};

use super::event::{ChallengeSummary, SessionEvent, Snapshot};
use super::round::{RoundController, RoundResult, RoundStep};
use super::score::challenge_score;
use super::tally::Tally;
use super::timer::{TimerKind, TimerSchedule, TimerToken};
use super::GameMode;
use crate::config::ConfigError;
use crate::games::tictactoe::{DEFAULT_RANDOMNESS, HeuristicOpponent, Mark, MoveError};

const TICK: Duration = Duration::from_secs(1);

/// Session phase.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    serde::Serialize,
    serde::Deserialize,
    strum::Display,
)]
pub enum Phase {
    /// No challenge running; the board is open for casual play.
    Idle,
    /// A challenge round is being played.
    InRound,
    /// Counting down to the next challenge round.
    CountdownToNextRound,
    /// Counting down to final scoring.
    CountdownToScoring,
    /// Challenge scored.
    Complete,
}

impl Phase {
    /// Whether a challenge is running (clock ticking).
    pub fn in_challenge(self) -> bool {
        matches!(
            self,
            Phase::InRound | Phase::CountdownToNextRound | Phase::CountdownToScoring
        )
    }
}

/// Tuning for a session.
#[derive(Debug, Clone, PartialEq, derive_getters::Getters, derive_setters::Setters)]
#[setters(prefix = "with_")]
pub struct SessionSettings {
    /// Rounds per challenge.
    total_rounds: u32,
    /// Countdown length in one-second ticks.
    countdown_ticks: u32,
    /// Delay before the opponent moves.
    opponent_delay: Duration,
    /// Probability of the opponent's random override.
    randomness: f64,
    /// Seed for a reproducible opponent.
    #[setters(strip_option)]
    seed: Option<u64>,
    /// Starting mode.
    mode: GameMode,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            total_rounds: 5,
            countdown_ticks: 4,
            opponent_delay: Duration::from_millis(600),
            randomness: DEFAULT_RANDOMNESS,
            seed: None,
            mode: GameMode::Ai,
        }
    }
}

impl SessionSettings {
    /// Rejects settings a session cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.total_rounds == 0 {
            return Err(ConfigError::new("total_rounds must be at least 1".to_string()));
        }
        if self.countdown_ticks == 0 {
            return Err(ConfigError::new("countdown_ticks must be at least 1".to_string()));
        }
        if !(0.0..=1.0).contains(&self.randomness) {
            return Err(ConfigError::new(format!(
                "randomness must be within 0.0..=1.0, got {}",
                self.randomness
            )));
        }
        Ok(())
    }

    /// The nearest runnable settings: at least one round and one tick,
    /// randomness clamped, NaN randomness treated as zero.
    fn sanitized(self) -> Self {
        let randomness = if self.randomness.is_finite() {
            self.randomness.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            total_rounds: self.total_rounds.max(1),
            countdown_ticks: self.countdown_ticks.max(1),
            randomness,
            ..self
        }
    }
}

/// One player's challenge session.
#[derive(Debug)]
pub struct ChallengeSession {
    settings: SessionSettings,
    phase: Phase,
    mode: GameMode,
    round: RoundController,
    round_index: u32,
    tally: Tally,
    casual_tally: Tally,
    elapsed_seconds: u64,
    countdown: Option<u32>,
    last_result: Option<RoundResult>,
    best_round_ms: Option<u64>,
    final_score: Option<i64>,
    timers: TimerSchedule,
    opponent: HeuristicOpponent,
    events: Vec<SessionEvent>,
}

impl ChallengeSession {
    /// Creates an idle session.
    ///
    /// Settings that fail [`SessionSettings::validate`] are adjusted to the
    /// nearest runnable values.
    #[instrument(skip_all, fields(mode = %settings.mode(), rounds = settings.total_rounds()))]
    pub fn new(settings: SessionSettings) -> Self {
        let settings = match settings.validate() {
            Ok(()) => settings,
            Err(e) => {
                warn!(error = %e, "Adjusting invalid session settings");
                settings.sanitized()
            }
        };
        let opponent = match settings.seed() {
            Some(seed) => HeuristicOpponent::seeded(*settings.randomness(), *seed),
            None => HeuristicOpponent::new(*settings.randomness()),
        };
        let mode = *settings.mode();
        debug!("Session created");
        Self {
            settings,
            phase: Phase::Idle,
            mode,
            round: RoundController::new(mode),
            round_index: 0,
            tally: Tally::default(),
            casual_tally: Tally::default(),
            elapsed_seconds: 0,
            countdown: None,
            last_result: None,
            best_round_ms: None,
            final_score: None,
            timers: TimerSchedule::new(),
            opponent,
            events: Vec::new(),
        }
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Current mode.
    pub fn mode(&self) -> GameMode {
        self.mode
    }

    /// Challenge tally.
    pub fn tally(&self) -> Tally {
        self.tally
    }

    /// Casual-play tally.
    pub fn casual_tally(&self) -> Tally {
        self.casual_tally
    }

    /// 1-based round number, zero before the first challenge.
    pub fn round_index(&self) -> u32 {
        self.round_index
    }

    /// Visible countdown value.
    pub fn countdown(&self) -> Option<u32> {
        self.countdown
    }

    /// Seconds on the session clock.
    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed_seconds
    }

    /// Score of the completed challenge.
    pub fn final_score(&self) -> Option<i64> {
        self.final_score
    }

    /// Fastest finished round in this challenge or casual streak.
    pub fn best_round_ms(&self) -> Option<u64> {
        self.best_round_ms
    }

    /// The current round.
    pub fn round(&self) -> &RoundController {
        &self.round
    }

    /// Session settings.
    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// The session's timers.
    pub fn timers(&self) -> &TimerSchedule {
        &self.timers
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.timers.now()
    }

    /// Time until the next timer fires, if any is armed.
    pub fn next_timer_in(&self) -> Option<Duration> {
        self.timers.next_due()
    }

    /// Takes the events queued since the last call.
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Starts a challenge from any phase.
    ///
    /// Zeroes the tally, round index and clock, starts the session clock and
    /// opens round one.
    #[instrument(skip(self), fields(phase = %self.phase))]
    pub fn start_challenge(&mut self) {
        info!("Starting challenge");
        self.begin_challenge();
    }

    /// Restarts the challenge straight into a fresh round one.
    ///
    /// Any pending countdown, clock tick or opponent move is cancelled and
    /// will not fire.
    #[instrument(skip(self), fields(phase = %self.phase))]
    pub fn reset_challenge(&mut self) {
        info!(round = self.round_index, "Resetting challenge");
        self.begin_challenge();
    }

    fn begin_challenge(&mut self) {
        self.timers.cancel_all();
        self.tally = Tally::default();
        self.round_index = 1;
        self.elapsed_seconds = 0;
        self.countdown = None;
        self.last_result = None;
        self.best_round_ms = None;
        self.final_score = None;
        self.round = RoundController::new(self.mode);
        self.timers.arm(TimerKind::SessionClock, TICK);
        self.set_phase(Phase::InRound);
    }

    /// Human move at `index`.
    ///
    /// Accepted while a challenge round is live, and while idle as casual
    /// play.
    ///
    /// # Errors
    ///
    /// Returns [`MoveError`] for illegal moves; the session is unchanged.
    /// Moves during a countdown or after completion get
    /// [`MoveError::RoundOver`].
    #[instrument(skip(self), fields(phase = %self.phase))]
    pub fn submit_move(&mut self, index: usize) -> Result<(), MoveError> {
        if !matches!(self.phase, Phase::Idle | Phase::InRound) {
            warn!("Move rejected outside a live round");
            return Err(MoveError::RoundOver);
        }
        let step = self.round.submit_move(index, self.now())?;
        self.handle_step(step);
        Ok(())
    }

    fn handle_step(&mut self, step: RoundStep) {
        match step {
            RoundStep::AwaitingHuman(mark) => debug!(%mark, "Awaiting human move"),
            RoundStep::AwaitingOpponent => {
                self.timers
                    .arm(TimerKind::OpponentMove, *self.settings.opponent_delay());
            }
            RoundStep::Finished(result) => match self.phase {
                Phase::Idle => self.on_casual_result(result),
                _ => self.on_round_result(result),
            },
        }
    }

    /// Counts a finished challenge round and starts the matching countdown.
    ///
    /// Results arriving outside [`Phase::InRound`] are ignored, so a
    /// completed challenge is never completed twice.
    #[instrument(skip(self), fields(phase = %self.phase, round = self.round_index))]
    pub fn on_round_result(&mut self, result: RoundResult) {
        if self.phase != Phase::InRound {
            warn!("Ignoring round result outside a live round");
            return;
        }
        self.timers.cancel(TimerKind::OpponentMove);
        let outcome = result.outcome_for(Mark::X);
        self.tally.record(outcome);
        self.note_result(result);
        info!(%outcome, tally = %self.tally, "Challenge round finished");
        self.events.push(SessionEvent::RoundFinished {
            round: self.round_index,
            result,
            outcome,
        });

        let next = if self.round_index < *self.settings.total_rounds() {
            Phase::CountdownToNextRound
        } else {
            Phase::CountdownToScoring
        };
        self.start_countdown();
        self.set_phase(next);
    }

    fn on_casual_result(&mut self, result: RoundResult) {
        self.timers.cancel(TimerKind::OpponentMove);
        let outcome = result.outcome_for(Mark::X);
        self.casual_tally.record(outcome);
        self.note_result(result);
        info!(%outcome, tally = %self.casual_tally, "Casual round finished");
        self.events.push(SessionEvent::RoundFinished {
            round: 0,
            result,
            outcome,
        });
        self.start_countdown();
    }

    fn note_result(&mut self, result: RoundResult) {
        self.last_result = Some(result);
        let ms = result.elapsed_ms();
        if self.best_round_ms.is_none_or(|best| ms < best) {
            self.best_round_ms = Some(ms);
        }
    }

    fn start_countdown(&mut self) {
        let ticks = *self.settings.countdown_ticks();
        self.countdown = Some(ticks);
        self.timers.arm(TimerKind::Countdown, TICK);
        debug!(ticks, "Countdown armed");
    }

    /// Ends the running countdown now.
    #[instrument(skip(self), fields(phase = %self.phase))]
    pub fn skip_countdown(&mut self) {
        if self.countdown.is_none() {
            debug!("No countdown to skip");
            return;
        }
        info!("Countdown skipped");
        self.finish_countdown();
    }

    fn finish_countdown(&mut self) {
        self.timers.cancel(TimerKind::Countdown);
        self.countdown = None;
        match self.phase {
            Phase::CountdownToNextRound => {
                self.round_index += 1;
                self.round = RoundController::new(self.mode);
                self.set_phase(Phase::InRound);
            }
            Phase::CountdownToScoring => self.finish_challenge(),
            Phase::Idle => {
                debug!("Clearing casual board");
                self.round = RoundController::new(self.mode);
            }
            Phase::InRound | Phase::Complete => {
                warn!(phase = %self.phase, "Countdown finished in unexpected phase");
            }
        }
    }

    fn finish_challenge(&mut self) {
        self.timers.cancel(TimerKind::SessionClock);
        let score = challenge_score(
            self.tally.wins,
            self.tally.ties,
            self.tally.losses,
            self.elapsed_seconds,
        );
        self.final_score = Some(score);
        self.set_phase(Phase::Complete);
        info!(
            score,
            tally = %self.tally,
            elapsed_seconds = self.elapsed_seconds,
            "Challenge complete"
        );
        self.events
            .push(SessionEvent::ChallengeComplete(ChallengeSummary::new(
                self.mode,
                self.tally,
                self.elapsed_seconds,
                score,
                self.best_round_ms,
            )));
    }

    /// Switches mode, abandoning any challenge and zeroing both tallies.
    ///
    /// No-op if `mode` is already active.
    #[instrument(skip(self), fields(current = %self.mode))]
    pub fn change_mode(&mut self, mode: GameMode) {
        if mode == self.mode {
            debug!("Mode unchanged");
            return;
        }
        info!(%mode, "Changing mode");
        self.timers.cancel_all();
        self.mode = mode;
        self.tally = Tally::default();
        self.casual_tally = Tally::default();
        self.round_index = 0;
        self.elapsed_seconds = 0;
        self.countdown = None;
        self.last_result = None;
        self.best_round_ms = None;
        self.final_score = None;
        self.round = RoundController::new(mode);
        self.set_phase(Phase::Idle);
    }

    /// Clears the board for a new casual game.
    ///
    /// A completed challenge returns to [`Phase::Idle`]; its tally and score
    /// stay visible until the next challenge starts. Ignored while a
    /// challenge is running.
    #[instrument(skip(self), fields(phase = %self.phase))]
    pub fn new_game(&mut self) {
        if self.phase.in_challenge() {
            warn!("New game ignored during a challenge");
            return;
        }
        self.timers.cancel(TimerKind::Countdown);
        self.timers.cancel(TimerKind::OpponentMove);
        self.countdown = None;
        self.round = RoundController::new(self.mode);
        self.set_phase(Phase::Idle);
        debug!("Board cleared");
    }

    /// Moves the virtual clock forward by `elapsed`, firing every timer that
    /// falls due in deadline order.
    #[instrument(skip(self), level = "trace")]
    pub fn advance(&mut self, elapsed: Duration) {
        let until = self.timers.now() + elapsed;
        while let Some(token) = self.timers.pop_due(until) {
            self.fire(token);
        }
        self.timers.settle(until);
    }

    /// Runs the callback for `token`.
    ///
    /// Stale tokens, superseded by a later arm or cancelled by a reset, are
    /// discarded.
    pub fn fire(&mut self, token: TimerToken) {
        if !self.timers.is_current(token) {
            warn!(kind = ?token.kind(), generation = token.generation(), "Discarding stale timer");
            return;
        }
        match token.kind() {
            TimerKind::SessionClock => self.clock_tick(),
            TimerKind::Countdown => self.countdown_tick(),
            TimerKind::OpponentMove => self.opponent_move(),
        }
    }

    fn clock_tick(&mut self) {
        if !self.phase.in_challenge() {
            return;
        }
        self.elapsed_seconds += 1;
        self.events.push(SessionEvent::ClockTick {
            elapsed_seconds: self.elapsed_seconds,
        });
        self.timers.arm(TimerKind::SessionClock, TICK);
    }

    fn countdown_tick(&mut self) {
        let Some(value) = self.countdown else {
            warn!("Countdown tick without a countdown");
            return;
        };
        let remaining = value.saturating_sub(1);
        debug!(remaining, "Countdown tick");
        self.events.push(SessionEvent::CountdownTick { remaining });
        if remaining == 0 {
            self.finish_countdown();
        } else {
            self.countdown = Some(remaining);
            self.timers.arm(TimerKind::Countdown, TICK);
        }
    }

    fn opponent_move(&mut self) {
        if !self.round.awaiting_opponent() {
            warn!("Opponent timer fired out of turn");
            return;
        }
        let human = *self.round.human();
        let position = match self.opponent.select(self.round.board(), human.opponent(), human) {
            Ok(position) => position,
            Err(e) => {
                error!(error = %e, "Opponent asked to move on a full board");
                return;
            }
        };
        match self.round.play_opponent(position, self.now()) {
            Ok(step) => self.handle_step(step),
            Err(e) => error!(error = %e, %position, "Opponent produced an illegal move"),
        }
    }

    /// Cancels every timer. Used on teardown.
    #[instrument(skip(self))]
    pub fn shutdown(&mut self) {
        self.timers.cancel_all();
        self.countdown = None;
    }

    /// Read-only view of the session.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            board: *self.round.board(),
            phase: self.phase,
            mode: self.mode,
            turn: self.round.turn(),
            opponent_thinking: self.timers.is_armed(TimerKind::OpponentMove),
            tally: self.tally,
            casual_tally: self.casual_tally,
            round_index: self.round_index,
            total_rounds: *self.settings.total_rounds(),
            countdown: self.countdown,
            elapsed_seconds: self.elapsed_seconds,
            last_outcome: self.last_result,
            winning_line: self.round.result().and_then(|r| r.winning_line()),
            best_round_ms: self.best_round_ms,
            final_score: self.final_score,
        }
    }

    fn set_phase(&mut self, to: Phase) {
        let from = self.phase;
        if from == to {
            return;
        }
        info!(%from, %to, "Phase transition");
        self.phase = to;
        self.events.push(SessionEvent::PhaseChanged { from, to });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::challenge::round::RoundWinner;
    use crate::games::tictactoe::{Position, WinningLine};

    fn settings() -> SessionSettings {
        SessionSettings::default().with_seed(7)
    }

    fn x_win(ms: u64) -> RoundResult {
        let line = WinningLine::new([Position::TopLeft, Position::TopCenter, Position::TopRight]);
        RoundResult::new(RoundWinner::Mark(Mark::X), Some(line), ms)
    }

    fn o_win(ms: u64) -> RoundResult {
        RoundResult::new(RoundWinner::Mark(Mark::O), None, ms)
    }

    fn tie(ms: u64) -> RoundResult {
        RoundResult::new(RoundWinner::Tie, None, ms)
    }

    #[test]
    fn test_start_challenge_enters_round_one() {
        let mut session = ChallengeSession::new(settings());
        session.start_challenge();
        assert_eq!(session.phase(), Phase::InRound);
        assert_eq!(session.round_index(), 1);
        assert!(session.timers().is_armed(TimerKind::SessionClock));
        assert_eq!(
            session.drain_events(),
            vec![SessionEvent::PhaseChanged {
                from: Phase::Idle,
                to: Phase::InRound
            }]
        );
    }

    #[test]
    fn test_round_result_starts_countdown_to_next_round() {
        let mut session = ChallengeSession::new(settings());
        session.start_challenge();
        session.on_round_result(x_win(1200));

        assert_eq!(session.phase(), Phase::CountdownToNextRound);
        assert_eq!(session.countdown(), Some(4));
        assert_eq!(session.tally().wins, 1);

        session.advance(Duration::from_secs(3));
        assert_eq!(session.countdown(), Some(1));
        session.advance(Duration::from_secs(1));
        assert_eq!(session.phase(), Phase::InRound);
        assert_eq!(session.round_index(), 2);
        assert_eq!(session.countdown(), None);
    }

    #[test]
    fn test_five_results_complete_exactly_once() {
        let mut session = ChallengeSession::new(settings());
        session.start_challenge();
        let results = [x_win(1000), tie(2000), o_win(1500), x_win(900), tie(3000)];
        for (i, result) in results.into_iter().enumerate() {
            assert_eq!(session.round_index(), i as u32 + 1);
            assert_eq!(session.tally().total(), i as u32);
            session.on_round_result(result);
            session.skip_countdown();
        }

        assert_eq!(session.phase(), Phase::Complete);
        assert_eq!(session.round_index(), 5);
        assert_eq!(session.tally().total(), 5);
        assert_eq!(session.best_round_ms(), Some(900));

        session.on_round_result(x_win(100));
        session.skip_countdown();
        assert_eq!(session.tally().total(), 5);

        let completions = session
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, SessionEvent::ChallengeComplete(_)))
            .count();
        assert_eq!(completions, 1);
    }

    #[test]
    fn test_score_uses_elapsed_clock() {
        let mut session = ChallengeSession::new(settings());
        session.start_challenge();
        session.advance(Duration::from_secs(30));
        assert_eq!(session.elapsed_seconds(), 30);

        for result in [x_win(0), x_win(0), tie(0), o_win(0), o_win(0)] {
            session.on_round_result(result);
            session.skip_countdown();
        }
        // 200 + 50 - 100 - 45
        assert_eq!(session.final_score(), Some(105));
        assert!(!session.timers().is_armed(TimerKind::SessionClock));

        session.advance(Duration::from_secs(10));
        assert_eq!(session.elapsed_seconds(), 30);
    }

    #[test]
    fn test_clock_keeps_running_through_countdown() {
        let mut session = ChallengeSession::new(settings());
        session.start_challenge();
        session.on_round_result(tie(0));
        session.advance(Duration::from_secs(4));
        assert_eq!(session.elapsed_seconds(), 4);
        assert_eq!(session.phase(), Phase::InRound);
    }

    #[test]
    fn test_reset_mid_countdown_cancels_ticks() {
        let mut session = ChallengeSession::new(settings());
        session.start_challenge();
        session.on_round_result(x_win(0));
        session.advance(Duration::from_millis(1500));
        let stale = session.timers().token(TimerKind::Countdown).expect("Countdown armed");

        session.reset_challenge();
        session.drain_events();
        assert_eq!(session.phase(), Phase::InRound);
        assert_eq!(session.round_index(), 1);
        assert_eq!(session.tally(), Tally::default());
        assert!(!session.timers().is_armed(TimerKind::Countdown));

        session.fire(stale);
        session.advance(Duration::from_secs(10));
        let ticks = session
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, SessionEvent::CountdownTick { .. }))
            .count();
        assert_eq!(ticks, 0);
        assert_eq!(session.countdown(), None);
        assert_eq!(session.round_index(), 1);
    }

    #[test]
    fn test_only_one_countdown_is_ever_live() {
        let mut session = ChallengeSession::new(settings());
        session.submit_move(4).expect("Casual move");
        session.change_mode(GameMode::Friend);
        for index in [0, 3, 1, 4, 2] {
            session.submit_move(index).expect("Legal");
        }
        assert_eq!(session.countdown(), Some(4));
        session.start_challenge();
        session.on_round_result(tie(0));
        assert_eq!(session.timers().pending(TimerKind::Countdown), 1);

        session.advance(Duration::from_secs(1));
        assert_eq!(session.countdown(), Some(3));
        assert_eq!(session.timers().pending(TimerKind::Countdown), 1);
    }

    #[test]
    fn test_opponent_moves_after_delay() {
        let mut session = ChallengeSession::new(settings());
        session.start_challenge();
        session.submit_move(0).expect("Legal");
        assert!(session.snapshot().opponent_thinking);
        assert_eq!(session.submit_move(1), Err(MoveError::NotYourTurn(Mark::X)));

        session.advance(Duration::from_millis(599));
        assert_eq!(session.round().board().move_count(), 1);
        session.advance(Duration::from_millis(1));
        assert_eq!(session.round().board().move_count(), 2);
        assert_eq!(session.round().turn(), Some(Mark::X));
    }

    #[test]
    fn test_reset_cancels_pending_opponent_move() {
        let mut session = ChallengeSession::new(settings());
        session.start_challenge();
        session.submit_move(0).expect("Legal");
        session.reset_challenge();
        session.advance(Duration::from_secs(1));
        assert_eq!(session.round().board().move_count(), 0);
    }

    #[test]
    fn test_moves_rejected_during_countdown() {
        let mut session = ChallengeSession::new(settings());
        session.start_challenge();
        session.on_round_result(tie(0));
        assert_eq!(session.submit_move(4), Err(MoveError::RoundOver));
    }

    #[test]
    fn test_casual_round_clears_after_countdown() {
        let mut session = ChallengeSession::new(settings().with_mode(GameMode::Friend));
        for index in [0, 3, 1, 4, 2] {
            session.submit_move(index).expect("Legal");
        }
        assert_eq!(session.phase(), Phase::Idle);
        assert_eq!(session.casual_tally().wins, 1);
        assert_eq!(session.tally(), Tally::default());
        assert!(session.snapshot().winning_line.is_some());

        session.advance(Duration::from_secs(4));
        assert_eq!(session.round().board().move_count(), 0);
        assert_eq!(session.countdown(), None);
    }

    #[test]
    fn test_change_mode_resets_to_idle() {
        let mut session = ChallengeSession::new(settings());
        session.start_challenge();
        session.on_round_result(x_win(0));
        session.change_mode(GameMode::Friend);

        assert_eq!(session.phase(), Phase::Idle);
        assert_eq!(session.mode(), GameMode::Friend);
        assert_eq!(session.tally(), Tally::default());
        assert_eq!(session.next_timer_in(), None);

        session.drain_events();
        session.change_mode(GameMode::Friend);
        assert!(session.drain_events().is_empty());
    }

    #[test]
    fn test_new_game_returns_complete_to_idle() {
        let mut session = ChallengeSession::new(settings());
        session.start_challenge();
        for _ in 0..5 {
            session.on_round_result(x_win(0));
            session.skip_countdown();
        }
        assert_eq!(session.phase(), Phase::Complete);
        session.new_game();
        assert_eq!(session.phase(), Phase::Idle);
        assert_eq!(session.final_score(), Some(500));
    }

    #[test]
    fn test_validate_rejects_unrunnable_settings() {
        assert!(SessionSettings::default().validate().is_ok());
        assert!(SessionSettings::default().with_total_rounds(0).validate().is_err());
        assert!(SessionSettings::default().with_countdown_ticks(0).validate().is_err());
        assert!(SessionSettings::default().with_randomness(f64::NAN).validate().is_err());
        assert!(SessionSettings::default().with_randomness(-0.1).validate().is_err());
    }

    #[test]
    fn test_zero_rounds_becomes_single_round() {
        let mut session = ChallengeSession::new(settings().with_total_rounds(0));
        assert_eq!(*session.settings().total_rounds(), 1);

        session.start_challenge();
        assert!(session.round_index() <= *session.settings().total_rounds());
        session.on_round_result(x_win(500));
        assert_eq!(session.phase(), Phase::CountdownToScoring);
    }

    #[test]
    fn test_nan_randomness_opponent_still_moves() {
        let mut session = ChallengeSession::new(settings().with_randomness(f64::NAN));
        assert_eq!(*session.settings().randomness(), 0.0);

        session.start_challenge();
        session.submit_move(0).expect("Legal");
        session.advance(Duration::from_millis(600));
        assert_eq!(session.round().board().move_count(), 2);
    }
}
