//! Tic-tac-toe board engine and heuristic opponent.

mod action;
mod opponent;
mod position;
pub mod rules;
mod types;

pub use action::{Move, MoveError};
pub use opponent::{
    DEFAULT_RANDOMNESS, HeuristicOpponent, NoMoveAvailable, find_winning_move, select_move,
};
pub use position::Position;
pub use rules::{Outcome, WinningLine, evaluate};
pub use types::{Board, Mark, Square};
