//! Draw detection logic for tic-tac-toe.

use super::super::{Board, Square};

/// Checks if the board is full (all squares occupied).
///
/// A full board with no winner is a tie.
pub fn is_full(board: &Board) -> bool {
    board.squares().iter().all(|s| *s != Square::Empty)
}

#[cfg(test)]
mod tests {
    use super::super::super::Mark;
    use super::super::win::winning_line;
    use super::*;

    fn is_draw(board: &Board) -> bool {
        is_full(board) && winning_line(board).is_none()
    }

    #[test]
    fn test_empty_board_not_full() {
        let board = Board::new();
        assert!(!is_full(&board));
    }

    #[test]
    fn test_partial_board_not_full() {
        let board = Board::new().apply_move(4, Mark::X).expect("Legal move");
        assert!(!is_full(&board));
    }

    #[test]
    fn test_full_board() {
        let board = Board::from_marks([Some(Mark::X); 9]);
        assert!(is_full(&board));
    }

    #[test]
    fn test_draw_detection() {
        let (x, o) = (Some(Mark::X), Some(Mark::O));
        // X O X / O X X / O X O
        let board = Board::from_marks([x, o, x, o, x, x, o, x, o]);
        assert!(is_draw(&board));
    }

    #[test]
    fn test_not_draw_if_winner() {
        let (x, o) = (Some(Mark::X), Some(Mark::O));
        let board = Board::from_marks([x, x, x, o, o, None, None, None, None]);
        assert!(!is_draw(&board));
    }
}
