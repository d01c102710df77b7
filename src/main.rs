//! Strictly Challenge - Unified CLI
//!
//! Plays the challenge in the terminal and inspects the leaderboard.

#![warn(missing_docs)]

mod cli;
mod tui;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use strictly_challenge::{
    ChallengeConfig, ChallengeInvite, ChallengeSession, GameMode, LeaderboardSync, Standings,
    normalize_name,
};
use strum::IntoEnumIterator;
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = ChallengeConfig::from_file(&cli.config)?.with_env_overrides();

    match cli.command {
        Command::Play {
            mode,
            name,
            rounds,
            seed,
            invite,
            invite_base,
        } => {
            let mut config = config;
            if let Some(mode) = mode {
                config = config.with_mode(mode);
            }
            if let Some(name) = name {
                config = config.with_player_name(normalize_name(&name)?);
            }
            if let Some(rounds) = rounds {
                config = config.with_total_rounds(rounds);
            }
            if let Some(seed) = seed {
                config = config.with_seed(seed);
            }
            config.validate()?;
            let incoming = invite.as_deref().map(ChallengeInvite::from_link).transpose()?;
            tui::run_tui(config, incoming, invite_base).await
        }
        Command::Leaderboard { mode, limit } => {
            init_stdout_tracing();
            show_leaderboard(&config, mode, limit).await
        }
        Command::Invite { name, target, base } => {
            init_stdout_tracing();
            let name = normalize_name(name.as_deref().unwrap_or(config.player_name()))?;
            let session = ChallengeSession::new(config.session_settings());
            let invite = ChallengeInvite::for_session(&name, &session.snapshot());
            let invite = match target {
                Some(target) => ChallengeInvite::new(invite.message().clone(), target),
                None => invite,
            };
            println!("{}", invite.message());
            println!("{}", invite.link(&base)?);
            Ok(())
        }
    }
}

fn init_stdout_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

/// Prints the top `limit` entries for each requested mode.
#[instrument(skip(config))]
async fn show_leaderboard(config: &ChallengeConfig, mode: Option<GameMode>, limit: usize) -> Result<()> {
    let store = config.leaderboard().open()?;
    let standings = Standings::new(store.fetch_all().await?);
    info!(count = standings.len(), "Leaderboard fetched");

    let modes: Vec<GameMode> = match mode {
        Some(mode) => vec![mode],
        None => GameMode::iter().collect(),
    };
    for mode in modes {
        println!("== {} ==", mode);
        let mut empty = true;
        for (i, entry) in standings.for_mode(mode).take(limit).enumerate() {
            empty = false;
            println!(
                "{:>3}. {:<15} {:>6}  {}W {}T {}L  {}",
                i + 1,
                entry.name(),
                entry.score(),
                entry.wins(),
                entry.ties(),
                entry.losses(),
                strictly_challenge::format_timer(entry.best_time_ms() / 1000)
            );
        }
        if empty {
            println!("  (no entries)");
        }
    }
    Ok(())
}
