//! Single-round state machine.
//!
//! A round starts at `AwaitingMove(X)` on an empty board. Each legal move
//! passes through `Evaluating` and either hands the turn to the other mark
//! or ends in `RoundOver`. Rejected moves never change state.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use super::GameMode;
use super::tally::PlayerOutcome;
use crate::games::tictactoe::{Board, Mark, Move, MoveError, Outcome, Position, WinningLine, evaluate};

/// Who took a finished round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoundWinner {
    /// Three in a row for this mark.
    Mark(Mark),
    /// Full board, no line.
    Tie,
}

/// Immutable record of a finished round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_new::new)]
pub struct RoundResult {
    winner: RoundWinner,
    winning_line: Option<WinningLine>,
    elapsed_ms: u64,
}

impl RoundResult {
    /// Who took the round.
    pub fn winner(&self) -> RoundWinner {
        self.winner
    }

    /// The completed triple, if the round was won.
    pub fn winning_line(&self) -> Option<WinningLine> {
        self.winning_line
    }

    /// Milliseconds from the first move to the terminal board.
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    /// The result from `player`'s side.
    pub fn outcome_for(&self, player: Mark) -> PlayerOutcome {
        match self.winner {
            RoundWinner::Tie => PlayerOutcome::Tie,
            RoundWinner::Mark(mark) if mark == player => PlayerOutcome::Win,
            RoundWinner::Mark(_) => PlayerOutcome::Loss,
        }
    }
}

/// Round state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundState {
    /// Waiting for `Mark` to move.
    AwaitingMove(Mark),
    /// A move was just applied and the board is being scored.
    Evaluating,
    /// Terminal for this round.
    RoundOver(RoundResult),
}

/// What the caller should do after a move is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundStep {
    /// Wait for a human to place `Mark`.
    AwaitingHuman(Mark),
    /// Schedule the opponent's move.
    AwaitingOpponent,
    /// The round just ended.
    Finished(RoundResult),
}

/// Owns the board for one round.
#[derive(Debug, Clone, derive_getters::Getters)]
pub struct RoundController {
    board: Board,
    state: RoundState,
    mode: GameMode,
    human: Mark,
    #[getter(skip)]
    started_at: Option<Duration>,
    history: Vec<Move>,
}

impl RoundController {
    /// Fresh round: empty board, X to move. The human always plays X.
    pub fn new(mode: GameMode) -> Self {
        Self {
            board: Board::new(),
            state: RoundState::AwaitingMove(Mark::X),
            mode,
            human: Mark::X,
            started_at: None,
            history: Vec::new(),
        }
    }

    /// Mark whose turn it is, if the round is still live.
    pub fn turn(&self) -> Option<Mark> {
        match self.state {
            RoundState::AwaitingMove(mark) => Some(mark),
            _ => None,
        }
    }

    /// The finished result, once the round is over.
    pub fn result(&self) -> Option<RoundResult> {
        match self.state {
            RoundState::RoundOver(result) => Some(result),
            _ => None,
        }
    }

    /// Whether the heuristic opponent is expected to move next.
    pub fn awaiting_opponent(&self) -> bool {
        self.mode == GameMode::Ai && self.turn() == Some(self.human.opponent())
    }

    /// Human move at `index`, made at virtual time `now`.
    ///
    /// In AI mode only the human's mark may be placed this way; in friend
    /// mode whichever mark is on turn is placed.
    ///
    /// # Errors
    ///
    /// [`MoveError::RoundOver`] after the round ended,
    /// [`MoveError::NotYourTurn`] while the opponent is on turn, and the
    /// board's own out-of-bounds and occupied errors.
    #[instrument(skip(self), fields(mode = %self.mode))]
    pub fn submit_move(&mut self, index: usize, now: Duration) -> Result<RoundStep, MoveError> {
        let turn = self.live_turn()?;
        if self.awaiting_opponent() {
            warn!(%turn, "Rejected move during opponent's turn");
            return Err(MoveError::NotYourTurn(self.human));
        }
        self.place(index, turn, now)
    }

    /// Opponent move at `position`.
    ///
    /// # Errors
    ///
    /// [`MoveError::NotYourTurn`] unless the opponent is on turn in AI mode.
    #[instrument(skip(self))]
    pub fn play_opponent(&mut self, position: Position, now: Duration) -> Result<RoundStep, MoveError> {
        let opponent = self.human.opponent();
        self.live_turn()?;
        if !self.awaiting_opponent() {
            warn!("Opponent move out of turn");
            return Err(MoveError::NotYourTurn(opponent));
        }
        self.place(position.index(), opponent, now)
    }

    fn live_turn(&self) -> Result<Mark, MoveError> {
        match self.state {
            RoundState::AwaitingMove(mark) => Ok(mark),
            RoundState::Evaluating | RoundState::RoundOver(_) => {
                warn!("Rejected move after round end");
                Err(MoveError::RoundOver)
            }
        }
    }

    fn place(&mut self, index: usize, mark: Mark, now: Duration) -> Result<RoundStep, MoveError> {
        let next = self.board.apply_move(index, mark).inspect_err(|e| {
            warn!(error = %e, "Rejected move");
        })?;
        let position = Position::from_index(index).ok_or(MoveError::OutOfBounds(index))?;

        let started = *self.started_at.get_or_insert(now);
        self.board = next;
        self.history.push(Move::new(mark, position));
        self.state = RoundState::Evaluating;
        debug!(%mark, %position, board = %self.board.display(), "Move applied");

        let step = match evaluate(&self.board) {
            Outcome::InProgress => {
                let turn = mark.opponent();
                self.state = RoundState::AwaitingMove(turn);
                if self.awaiting_opponent() {
                    RoundStep::AwaitingOpponent
                } else {
                    RoundStep::AwaitingHuman(turn)
                }
            }
            Outcome::Win { mark, line } => {
                self.finish(RoundWinner::Mark(mark), Some(line), started, now)
            }
            Outcome::Tie => self.finish(RoundWinner::Tie, None, started, now),
        };
        Ok(step)
    }

    fn finish(
        &mut self,
        winner: RoundWinner,
        line: Option<WinningLine>,
        started: Duration,
        now: Duration,
    ) -> RoundStep {
        let elapsed_ms = u64::try_from(now.saturating_sub(started).as_millis()).unwrap_or(u64::MAX);
        let result = RoundResult::new(winner, line, elapsed_ms);
        self.state = RoundState::RoundOver(result);
        info!(?winner, elapsed_ms, moves = self.history.len(), "Round over");
        RoundStep::Finished(result)
    }
}
