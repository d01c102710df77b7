//! Challenge configuration.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::challenge::{GameMode, SessionSettings};
use crate::games::tictactoe::DEFAULT_RANDOMNESS;
use crate::leaderboard::{
    CachedLeaderboard, LeaderboardError, LeaderboardSync, MemoryLeaderboard, RestLeaderboard,
    SqliteLeaderboard,
};

/// Longest accepted player name, in characters.
pub const MAX_NAME_LEN: usize = 15;

/// Environment variable overriding the remote store URL.
pub const LEADERBOARD_URL_VAR: &str = "LEADERBOARD_URL";

/// Environment variable overriding the remote store key.
pub const LEADERBOARD_API_KEY_VAR: &str = "LEADERBOARD_API_KEY";

/// Where completed challenges are stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LeaderboardBackend {
    /// Local SQLite file.
    #[default]
    Sqlite,
    /// PostgREST-style HTTP store.
    Remote,
    /// In-process only; lost on exit.
    Memory,
}

/// Leaderboard store settings (`[leaderboard]` table).
#[derive(Debug, Clone, PartialEq, Getters, derive_setters::Setters, Serialize, Deserialize)]
#[serde(default)]
#[setters(prefix = "with_")]
pub struct LeaderboardConfig {
    /// Store kind.
    backend: LeaderboardBackend,

    /// SQLite database path.
    db_path: String,

    /// Base URL of the remote store.
    #[setters(strip_option, into)]
    url: Option<String>,

    /// Key sent as `apikey` and bearer token.
    #[setters(strip_option, into)]
    api_key: Option<String>,

    /// Optional JSON file holding the last good standings.
    #[setters(strip_option, into)]
    cache_path: Option<PathBuf>,

    /// Remote request timeout.
    timeout_ms: u64,
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self {
            backend: LeaderboardBackend::Sqlite,
            db_path: "strictly_challenge.db".to_string(),
            url: None,
            api_key: None,
            cache_path: None,
            timeout_ms: 5000,
        }
    }
}

impl LeaderboardConfig {
    /// Opens the configured store, wrapped in the file cache when one is set.
    ///
    /// # Errors
    ///
    /// Returns [`LeaderboardError`] if the store cannot be opened or the
    /// remote backend lacks a URL or key.
    #[instrument(skip(self), fields(backend = %self.backend))]
    pub fn open(&self) -> Result<Arc<dyn LeaderboardSync>, LeaderboardError> {
        let store: Arc<dyn LeaderboardSync> = match self.backend {
            LeaderboardBackend::Sqlite => Arc::new(SqliteLeaderboard::open(&self.db_path)?),
            LeaderboardBackend::Memory => Arc::new(MemoryLeaderboard::new()),
            LeaderboardBackend::Remote => {
                let url = self
                    .url
                    .as_deref()
                    .ok_or_else(|| LeaderboardError::new("Remote leaderboard needs a url"))?;
                let key = self
                    .api_key
                    .clone()
                    .ok_or_else(|| LeaderboardError::new("Remote leaderboard needs an api_key"))?;
                Arc::new(RestLeaderboard::new(
                    url,
                    key,
                    Duration::from_millis(self.timeout_ms),
                )?)
            }
        };

        Ok(match &self.cache_path {
            Some(path) => {
                debug!(path = %path.display(), "Leaderboard cache enabled");
                Arc::new(CachedLeaderboard::new(store, path))
            }
            None => store,
        })
    }
}

/// Challenge settings, loaded from TOML. Every field is optional.
#[derive(Debug, Clone, PartialEq, Getters, derive_setters::Setters, Serialize, Deserialize)]
#[serde(default)]
#[setters(prefix = "with_")]
pub struct ChallengeConfig {
    /// Name shown on the leaderboard.
    #[setters(into)]
    player_name: String,

    /// Label for the second human in friend mode.
    #[setters(into)]
    friend_name: String,

    /// Starting mode.
    mode: GameMode,

    /// Rounds per challenge.
    total_rounds: u32,

    /// Countdown length in seconds.
    countdown_ticks: u32,

    /// Delay before the opponent moves.
    opponent_delay_ms: u64,

    /// Probability the opponent plays a random square.
    randomness: f64,

    /// Seed for a reproducible opponent.
    #[setters(strip_option)]
    seed: Option<u64>,

    /// Leaderboard store.
    leaderboard: LeaderboardConfig,
}

impl Default for ChallengeConfig {
    fn default() -> Self {
        Self {
            player_name: "You".to_string(),
            friend_name: "Friend".to_string(),
            mode: GameMode::Ai,
            total_rounds: 5,
            countdown_ticks: 4,
            opponent_delay_ms: 600,
            randomness: DEFAULT_RANDOMNESS,
            seed: None,
            leaderboard: LeaderboardConfig::default(),
        }
    }
}

impl ChallengeConfig {
    /// Loads configuration from a TOML file. A missing file yields defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed, or
    /// holds invalid values.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            info!("Config file not found, using defaults");
            return Ok(Self::default());
        }

        debug!("Loading config from file");
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        let config = Self::from_toml(&content)?;
        info!(player = %config.player_name, mode = %config.mode, "Config loaded successfully");
        Ok(config)
    }

    /// Parses and validates TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] on a parse failure or invalid values.
    #[instrument(skip(content))]
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config.player_name = normalize_name(&config.player_name)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects out-of-range values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] naming the first bad field.
    #[instrument(skip(self))]
    pub fn validate(&self) -> Result<(), ConfigError> {
        normalize_name(&self.player_name)?;
        self.session_settings().validate()
    }

    /// Applies `LEADERBOARD_URL` and `LEADERBOARD_API_KEY` from the
    /// environment. A URL override also selects the remote backend.
    #[instrument(skip(self))]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(LEADERBOARD_URL_VAR) {
            info!("Remote leaderboard URL taken from environment");
            self.leaderboard.url = Some(url);
            self.leaderboard.backend = LeaderboardBackend::Remote;
        }
        if let Ok(key) = std::env::var(LEADERBOARD_API_KEY_VAR) {
            self.leaderboard.api_key = Some(key);
        }
        if self.leaderboard.backend == LeaderboardBackend::Remote && self.leaderboard.api_key.is_none() {
            warn!("Remote leaderboard selected without an api key");
        }
        self
    }

    /// Session tuning derived from this configuration.
    pub fn session_settings(&self) -> SessionSettings {
        let settings = SessionSettings::default()
            .with_total_rounds(self.total_rounds)
            .with_countdown_ticks(self.countdown_ticks)
            .with_opponent_delay(Duration::from_millis(self.opponent_delay_ms))
            .with_randomness(self.randomness)
            .with_mode(self.mode);
        match self.seed {
            Some(seed) => settings.with_seed(seed),
            None => settings,
        }
    }
}

/// Trims a player name and checks it is non-empty and at most
/// [`MAX_NAME_LEN`] characters. The trimmed form is the leaderboard identity.
///
/// # Errors
///
/// Returns [`ConfigError`] describing the problem.
pub fn normalize_name(name: &str) -> Result<String, ConfigError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::new("player_name must not be empty".to_string()));
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(ConfigError::new(format!(
            "player_name must be at most {} characters",
            MAX_NAME_LEN
        )));
    }
    Ok(trimmed.to_string())
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
