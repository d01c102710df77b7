//! Win detection logic for tic-tac-toe.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::super::{Board, Mark, Position, Square};

/// The eight winning triples: rows, then columns, then diagonals.
pub const LINES: [[Position; 3]; 8] = [
    // Rows
    [Position::TopLeft, Position::TopCenter, Position::TopRight],
    [
        Position::MiddleLeft,
        Position::Center,
        Position::MiddleRight,
    ],
    [
        Position::BottomLeft,
        Position::BottomCenter,
        Position::BottomRight,
    ],
    // Columns
    [
        Position::TopLeft,
        Position::MiddleLeft,
        Position::BottomLeft,
    ],
    [
        Position::TopCenter,
        Position::Center,
        Position::BottomCenter,
    ],
    [
        Position::TopRight,
        Position::MiddleRight,
        Position::BottomRight,
    ],
    // Diagonals
    [Position::TopLeft, Position::Center, Position::BottomRight],
    [Position::TopRight, Position::Center, Position::BottomLeft],
];

/// The three positions of a completed triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WinningLine([Position; 3]);

impl WinningLine {
    /// Wraps a triple of positions.
    pub fn new(positions: [Position; 3]) -> Self {
        Self(positions)
    }

    /// The positions in the triple.
    pub fn positions(&self) -> [Position; 3] {
        self.0
    }

    /// The board indices in the triple.
    pub fn indices(&self) -> [usize; 3] {
        self.0.map(Position::index)
    }

    /// Whether `pos` is part of the triple.
    pub fn contains(&self, pos: Position) -> bool {
        self.0.contains(&pos)
    }
}

/// Finds the first completed triple and the mark that owns it.
#[instrument(skip(board))]
pub fn winning_line(board: &Board) -> Option<(Mark, WinningLine)> {
    for line @ [a, b, c] in LINES {
        let sq = board.get(a);
        if let Square::Occupied(mark) = sq
            && sq == board.get(b)
            && sq == board.get(c)
        {
            return Some((mark, WinningLine(line)));
        }
    }

    None
}
