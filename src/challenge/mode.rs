//! Who the human plays against.

use serde::{Deserialize, Serialize};

/// Opponent mode for a round or challenge.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum GameMode {
    /// Human (X) against the heuristic opponent (O).
    #[default]
    Ai,
    /// Two humans sharing the board.
    Friend,
}

impl GameMode {
    /// The other mode.
    pub fn toggled(self) -> Self {
        match self {
            GameMode::Ai => GameMode::Friend,
            GameMode::Friend => GameMode::Ai,
        }
    }
}
