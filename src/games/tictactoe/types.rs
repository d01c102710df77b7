//! Core domain types for tic-tac-toe.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::action::MoveError;
use super::position::Position;

/// A mark placed on the board.
///
/// X always opens a round; in AI mode the human plays X.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mark {
    /// Mark X (goes first).
    X,
    /// Mark O (goes second).
    O,
}

impl Mark {
    /// Returns the other mark.
    pub fn opponent(self) -> Self {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }

    /// Single-character symbol for display.
    pub fn symbol(self) -> &'static str {
        match self {
            Mark::X => "X",
            Mark::O => "O",
        }
    }
}

impl std::fmt::Display for Mark {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A square on the tic-tac-toe board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Square {
    /// Empty square.
    Empty,
    /// Square occupied by a mark.
    Occupied(Mark),
}

impl Square {
    /// Returns the mark on this square, if any.
    pub fn mark(self) -> Option<Mark> {
        match self {
            Square::Empty => None,
            Square::Occupied(mark) => Some(mark),
        }
    }
}

/// 3x3 tic-tac-toe board.
///
/// Boards are values: [`Board::apply_move`] returns a new board and leaves
/// the original untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Board {
    /// Squares in row-major order (0-8).
    squares: [Square; 9],
}

impl Board {
    /// Creates a new empty board.
    pub fn new() -> Self {
        Self {
            squares: [Square::Empty; 9],
        }
    }

    /// Builds a board from nine optional marks in row-major order.
    pub fn from_marks(marks: [Option<Mark>; 9]) -> Self {
        let squares = marks.map(|m| match m {
            Some(mark) => Square::Occupied(mark),
            None => Square::Empty,
        });
        Self { squares }
    }

    /// Gets the square at the given position.
    pub fn get(&self, pos: Position) -> Square {
        self.squares[pos.index()]
    }

    /// Checks if a square is empty.
    pub fn is_empty(&self, pos: Position) -> bool {
        self.get(pos) == Square::Empty
    }

    /// Returns all squares as a slice.
    pub fn squares(&self) -> &[Square; 9] {
        &self.squares
    }

    /// Number of marks played so far.
    pub fn move_count(&self) -> usize {
        self.squares.iter().filter(|s| **s != Square::Empty).count()
    }

    /// Places `mark` at `index`, returning the resulting board.
    ///
    /// # Errors
    ///
    /// Returns [`MoveError::OutOfBounds`] for an index outside 0-8 and
    /// [`MoveError::SquareOccupied`] when the square already holds a mark.
    #[instrument(skip(self))]
    pub fn apply_move(&self, index: usize, mark: Mark) -> Result<Board, MoveError> {
        let pos = Position::from_index(index).ok_or(MoveError::OutOfBounds(index))?;
        if !self.is_empty(pos) {
            return Err(MoveError::SquareOccupied(pos));
        }

        let mut next = *self;
        next.squares[pos.index()] = Square::Occupied(mark);
        Ok(next)
    }

    /// Formats the board as a human-readable string.
    ///
    /// Empty squares show their 1-based key number.
    pub fn display(&self) -> String {
        let mut result = String::new();
        for row in 0..3 {
            for col in 0..3 {
                let pos = row * 3 + col;
                let symbol = match self.squares[pos] {
                    Square::Empty => (pos + 1).to_string(),
                    Square::Occupied(mark) => mark.symbol().to_string(),
                };
                result.push_str(&symbol);
                if col < 2 {
                    result.push('|');
                }
            }
            if row < 2 {
                result.push_str("\n-+-+-\n");
            }
        }
        result
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_move_leaves_source_untouched() {
        let board = Board::new();
        let next = board.apply_move(4, Mark::X).expect("Legal move");
        assert!(board.is_empty(Position::Center));
        assert_eq!(next.get(Position::Center), Square::Occupied(Mark::X));
        assert_eq!(next.move_count(), 1);
    }

    #[test]
    fn test_apply_move_rejects_occupied() {
        let board = Board::new().apply_move(0, Mark::X).expect("Legal move");
        let result = board.apply_move(0, Mark::O);
        assert_eq!(result, Err(MoveError::SquareOccupied(Position::TopLeft)));
    }

    #[test]
    fn test_apply_move_rejects_out_of_bounds() {
        let result = Board::new().apply_move(9, Mark::X);
        assert_eq!(result, Err(MoveError::OutOfBounds(9)));
    }

    #[test]
    fn test_display() {
        let board = Board::new()
            .apply_move(0, Mark::X)
            .and_then(|b| b.apply_move(4, Mark::O))
            .expect("Legal moves");
        assert_eq!(board.display(), "X|2|3\n-+-+-\n4|O|6\n-+-+-\n7|8|9");
    }
}
