//! Command-line interface for strictly_challenge.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use strictly_challenge::{DEFAULT_INVITE_BASE, GameMode};

/// Strictly Challenge - five rounds of tic-tac-toe against the clock
#[derive(Parser, Debug)]
#[command(name = "strictly_challenge")]
#[command(about = "Five-round tic-tac-toe challenge with a leaderboard", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, global = true, default_value = "strictly_challenge.toml")]
    pub config: PathBuf,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play in the terminal
    Play {
        /// Opponent mode, overriding the config file
        #[arg(long, value_enum)]
        mode: Option<GameMode>,

        /// Leaderboard name, overriding the config file
        #[arg(long)]
        name: Option<String>,

        /// Rounds per challenge
        #[arg(long)]
        rounds: Option<u32>,

        /// Seed for a reproducible opponent
        #[arg(long)]
        seed: Option<u64>,

        /// Invite link to play against
        #[arg(long)]
        invite: Option<String>,

        /// Base URL for invite links you share
        #[arg(long, default_value = DEFAULT_INVITE_BASE)]
        invite_base: String,
    },

    /// Print the leaderboard
    Leaderboard {
        /// Mode to show; both when omitted
        #[arg(long, value_enum)]
        mode: Option<GameMode>,

        /// Rows per mode
        #[arg(long, default_value = "10")]
        limit: usize,
    },

    /// Print an invite link for a fresh challenge
    Invite {
        /// Name in the message, overriding the config file
        #[arg(long)]
        name: Option<String>,

        /// Score to beat
        #[arg(long)]
        target: Option<i64>,

        /// Base URL of the game
        #[arg(long, default_value = DEFAULT_INVITE_BASE)]
        base: String,
    },
}
