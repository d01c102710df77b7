//! Heuristic AI opponent.
//!
//! Priority order: win, block, random override, center, corner, edge.
//! The random override makes the opponent beatable on purpose.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, instrument};

use super::rules::LINES;
use super::{Board, Mark, Position, Square};

/// Default probability of ignoring the positional heuristic.
pub const DEFAULT_RANDOMNESS: f64 = 0.3;

/// The selector was asked to move on a board with no empty square.
///
/// Callers only ask for a move while the round is in progress, so this
/// signals a sequencing bug rather than a recoverable condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("No move available: the board is full")]
pub struct NoMoveAvailable;

/// Returns the empty square that would complete a triple for `mark`.
///
/// A triple qualifies when it holds two of `mark` and one empty square.
/// Triples are scanned in [`LINES`] order and the first hit wins.
pub fn find_winning_move(board: &Board, mark: Mark) -> Option<Position> {
    LINES.iter().find_map(|line| {
        let owned = line
            .iter()
            .filter(|p| board.get(**p) == Square::Occupied(mark))
            .count();
        let mut empty = line.iter().copied().filter(|p| board.is_empty(*p));
        match (owned, empty.next(), empty.next()) {
            (2, Some(pos), None) => Some(pos),
            _ => None,
        }
    })
}

/// Picks the opponent's next square.
///
/// Winning and blocking moves are always taken. Otherwise, with
/// probability `randomness` the pick is uniform over all empty squares;
/// failing that it prefers the center, then a random corner, then a
/// random edge.
///
/// # Errors
///
/// Returns [`NoMoveAvailable`] if the board has no empty square.
#[instrument(skip(board, rng), fields(board = %board.display()))]
pub fn select_move<R: Rng + ?Sized>(
    board: &Board,
    opponent: Mark,
    player: Mark,
    randomness: f64,
    rng: &mut R,
) -> Result<Position, NoMoveAvailable> {
    let empty = Position::valid_moves(board);
    if empty.is_empty() {
        return Err(NoMoveAvailable);
    }

    if let Some(pos) = find_winning_move(board, opponent) {
        debug!(position = %pos, "Taking winning move");
        return Ok(pos);
    }

    if let Some(pos) = find_winning_move(board, player) {
        debug!(position = %pos, "Blocking player's winning move");
        return Ok(pos);
    }

    if rng.gen_bool(probability(randomness)) {
        let pos = *empty.choose(rng).ok_or(NoMoveAvailable)?;
        debug!(position = %pos, "Random override");
        return Ok(pos);
    }

    if board.is_empty(Position::Center) {
        return Ok(Position::Center);
    }

    for group in [Position::CORNERS, Position::EDGES] {
        let open: Vec<Position> = group.into_iter().filter(|p| board.is_empty(*p)).collect();
        if let Some(pos) = open.choose(rng) {
            return Ok(*pos);
        }
    }

    empty.choose(rng).copied().ok_or(NoMoveAvailable)
}

/// `randomness` as a usable probability. Non-finite values mean no override.
fn probability(randomness: f64) -> f64 {
    if randomness.is_finite() {
        randomness.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Stateful opponent that owns its random source.
#[derive(Debug, Clone)]
pub struct HeuristicOpponent {
    randomness: f64,
    rng: ChaCha8Rng,
}

impl HeuristicOpponent {
    /// Creates an opponent seeded from OS entropy.
    ///
    /// `randomness` is clamped to `0.0..=1.0`; NaN and infinities become 0.
    pub fn new(randomness: f64) -> Self {
        Self {
            randomness: probability(randomness),
            rng: ChaCha8Rng::from_entropy(),
        }
    }

    /// Creates an opponent with a reproducible random stream.
    pub fn seeded(randomness: f64, seed: u64) -> Self {
        Self {
            randomness: probability(randomness),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Probability of the random override.
    pub fn randomness(&self) -> f64 {
        self.randomness
    }

    /// Picks a move for `opponent` against `player`.
    ///
    /// # Errors
    ///
    /// Returns [`NoMoveAvailable`] if the board is full.
    pub fn select(
        &mut self,
        board: &Board,
        opponent: Mark,
        player: Mark,
    ) -> Result<Position, NoMoveAvailable> {
        select_move(board, opponent, player, self.randomness, &mut self.rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::tictactoe::rules::winning_line;

    const X: Option<Mark> = Some(Mark::X);
    const O: Option<Mark> = Some(Mark::O);
    const E: Option<Mark> = None;

    fn rng(seed: u64) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(seed)
    }

    #[test]
    fn test_blocks_player_when_no_win_of_its_own() {
        let board = Board::from_marks([X, X, E, O, E, E, E, E, E]);
        let pos = select_move(&board, Mark::O, Mark::X, 0.0, &mut rng(1)).expect("Move");
        assert_eq!(pos.index(), 2);
    }

    #[test]
    fn test_win_beats_block() {
        // O can win at 5, X threatens at 2.
        let board = Board::from_marks([X, X, E, O, O, E, E, E, X]);
        for seed in 0..20 {
            let pos = select_move(&board, Mark::O, Mark::X, 1.0, &mut rng(seed)).expect("Move");
            assert_eq!(pos, Position::MiddleRight);
        }
    }

    #[test]
    fn test_every_two_plus_empty_triple_is_completed() {
        for line in LINES {
            for gap in 0..3 {
                let mut marks = [None; 9];
                for (i, pos) in line.iter().enumerate() {
                    if i != gap {
                        marks[pos.index()] = Some(Mark::O);
                    }
                }
                let board = Board::from_marks(marks);
                for randomness in [0.0, 0.3, 1.0] {
                    let pos = select_move(&board, Mark::O, Mark::X, randomness, &mut rng(7))
                        .expect("Move");
                    assert_eq!(find_winning_move(&board, Mark::O), Some(pos));
                    let mut next = marks;
                    next[pos.index()] = Some(Mark::O);
                    assert_eq!(
                        winning_line(&Board::from_marks(next)).map(|(mark, _)| mark),
                        Some(Mark::O)
                    );
                }
            }
        }
    }

    #[test]
    fn test_takes_center_without_randomness() {
        let board = Board::from_marks([X, E, E, E, E, E, E, E, E]);
        let pos = select_move(&board, Mark::O, Mark::X, 0.0, &mut rng(3)).expect("Move");
        assert_eq!(pos, Position::Center);
    }

    #[test]
    fn test_prefers_corner_when_center_taken() {
        let board = Board::from_marks([E, E, E, E, X, E, E, E, E]);
        for seed in 0..20 {
            let pos = select_move(&board, Mark::O, Mark::X, 0.0, &mut rng(seed)).expect("Move");
            assert!(Position::CORNERS.contains(&pos));
        }
    }

    #[test]
    fn test_first_threat_in_line_order_is_blocked() {
        // X threatens both the bottom row (7) and the left column (3).
        let board = Board::from_marks([X, E, O, E, O, E, X, E, X]);
        let pos = select_move(&board, Mark::O, Mark::X, 0.0, &mut rng(5)).expect("Move");
        assert_eq!(pos, Position::BottomCenter);
    }

    #[test]
    fn test_random_override_stays_legal() {
        let board = Board::from_marks([X, E, E, E, E, E, E, E, E]);
        let mut saw_non_center = false;
        for seed in 0..50 {
            let pos = select_move(&board, Mark::O, Mark::X, 1.0, &mut rng(seed)).expect("Move");
            assert!(board.is_empty(pos));
            saw_non_center |= pos != Position::Center;
        }
        assert!(saw_non_center, "Full randomness should leave the center sometimes");
    }

    #[test]
    fn test_full_board_has_no_move() {
        let board = Board::from_marks([X, O, X, X, O, O, O, X, X]);
        let result = select_move(&board, Mark::O, Mark::X, 0.3, &mut rng(0));
        assert_eq!(result, Err(NoMoveAvailable));
    }

    #[test]
    fn test_seeded_opponent_is_reproducible() {
        let board = Board::from_marks([E, E, E, E, X, E, E, E, E]);
        let mut a = HeuristicOpponent::seeded(0.3, 99);
        let mut b = HeuristicOpponent::seeded(0.3, 99);
        for _ in 0..10 {
            assert_eq!(
                a.select(&board, Mark::O, Mark::X),
                b.select(&board, Mark::O, Mark::X)
            );
        }
    }

    #[test]
    fn test_non_finite_randomness_never_overrides() {
        let board = Board::new().apply_move(4, Mark::X).expect("Legal");
        for randomness in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let pos = select_move(&board, Mark::O, Mark::X, randomness, &mut rng(9)).expect("Move");
            assert!(Position::CORNERS.contains(&pos));
        }
        assert_eq!(HeuristicOpponent::seeded(f64::NAN, 1).randomness(), 0.0);
        assert_eq!(HeuristicOpponent::new(2.5).randomness(), 1.0);
    }
}
