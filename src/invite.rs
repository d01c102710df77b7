//! Shareable challenge links.

use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::challenge::{Phase, Snapshot, format_timer};

/// Target score when the challenger has not finished a challenge yet.
pub const DEFAULT_TARGET: i64 = 100;

/// Where invite links point unless told otherwise.
pub const DEFAULT_INVITE_BASE: &str = "http://localhost:3000/";

/// A challenge link could not be built or read.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum InviteError {
    /// The base or link is not a valid URL.
    #[display("Invalid URL '{}': {}", _0, _1)]
    InvalidUrl(String, String),

    /// The link carries no `challenge` parameter.
    #[display("Link has no challenge message")]
    MissingMessage,

    /// The `target` parameter is not an integer.
    #[display("Invalid target score '{}'", _0)]
    InvalidTarget(String),
}

impl std::error::Error for InviteError {}

/// A challenge message and the score to beat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct ChallengeInvite {
    message: String,
    target: i64,
}

impl ChallengeInvite {
    /// Wraps a message and target.
    pub fn new(message: impl Into<String>, target: i64) -> Self {
        Self {
            message: message.into(),
            target,
        }
    }

    /// Builds the invite for the session's current state.
    #[instrument(skip(snapshot), fields(phase = %snapshot.phase))]
    pub fn for_session(player_name: &str, snapshot: &Snapshot) -> Self {
        let rounds = snapshot.total_rounds;
        let tally = snapshot.tally;
        match (snapshot.phase, snapshot.final_score) {
            (Phase::Complete, Some(score)) => Self::new(
                format!(
                    "{} challenges you to beat their score of {} points in a {}-round Tic-Tac-Toe Challenge! ({} wins, {} ties, {} losses in {})",
                    player_name,
                    score,
                    rounds,
                    tally.wins,
                    tally.ties,
                    tally.losses,
                    format_timer(snapshot.elapsed_seconds)
                ),
                score,
            ),
            (phase, _) if phase.in_challenge() => Self::new(
                format!(
                    "{} challenges you to a {}-round Tic-Tac-Toe Challenge! They're currently at Round {} with {} wins, {} ties, and {} losses.",
                    player_name, rounds, snapshot.round_index, tally.wins, tally.ties, tally.losses
                ),
                DEFAULT_TARGET,
            ),
            _ => Self::new(
                format!(
                    "{} challenges you to a {}-round Tic-Tac-Toe Challenge! Can you beat the AI?",
                    player_name, rounds
                ),
                DEFAULT_TARGET,
            ),
        }
    }

    /// Link to `base` carrying the message and target as query parameters.
    ///
    /// # Errors
    ///
    /// Returns [`InviteError::InvalidUrl`] if `base` is not a URL.
    #[instrument(skip(self))]
    pub fn link(&self, base: &str) -> Result<String, InviteError> {
        let mut url = Url::parse(base)
            .map_err(|e| InviteError::InvalidUrl(base.to_string(), e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("challenge", &self.message)
            .append_pair("target", &self.target.to_string());
        Ok(url.into())
    }

    /// Reads an invite back out of a link. A missing target means
    /// [`DEFAULT_TARGET`].
    ///
    /// # Errors
    ///
    /// Returns [`InviteError`] if the link is malformed or has no message.
    #[instrument]
    pub fn from_link(link: &str) -> Result<Self, InviteError> {
        let url =
            Url::parse(link).map_err(|e| InviteError::InvalidUrl(link.to_string(), e.to_string()))?;
        let mut message = None;
        let mut target = DEFAULT_TARGET;
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "challenge" => message = Some(value.into_owned()),
                "target" => {
                    target = value
                        .parse()
                        .map_err(|_| InviteError::InvalidTarget(value.into_owned()))?;
                }
                other => debug!(param = other, "Ignoring query parameter"),
            }
        }
        let message = message.ok_or(InviteError::MissingMessage)?;
        Ok(Self { message, target })
    }

    /// Whether `score` meets the target.
    pub fn beats(&self, score: i64) -> bool {
        score >= self.target
    }
}
