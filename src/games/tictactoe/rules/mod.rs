//! Game rules for tic-tac-toe.
//!
//! Pure functions over a [`Board`]. Rules are kept apart from board
//! storage so the round controller and the opponent can share them.

pub mod draw;
pub mod win;

pub use draw::is_full;
pub use win::{LINES, WinningLine, winning_line};

use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::{Board, Mark};

/// Result of evaluating a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// Neither a win nor a full board.
    InProgress,
    /// A winning triple is complete.
    Win {
        /// The mark occupying the triple.
        mark: Mark,
        /// The completed triple.
        line: WinningLine,
    },
    /// Every square is taken and nobody won.
    Tie,
}

impl Outcome {
    /// True for `Win` and `Tie`.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Outcome::InProgress)
    }
}

/// Evaluates a board: win, tie, or still in progress.
///
/// Triples are checked in [`LINES`] order (rows, columns, diagonals).
#[instrument(skip(board))]
pub fn evaluate(board: &Board) -> Outcome {
    if let Some((mark, line)) = winning_line(board) {
        return Outcome::Win { mark, line };
    }
    if is_full(board) {
        return Outcome::Tie;
    }
    Outcome::InProgress
}
