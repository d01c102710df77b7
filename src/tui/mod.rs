//! Terminal front end for the challenge.

mod app;
mod input;
mod ui;

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use strictly_challenge::{
    ChallengeConfig, ChallengeDriver, ChallengeHandle, ChallengeInvite, ChallengeSession, Command,
};
use tracing::{error, info, instrument};

use app::App;
use input::map_key;

/// File the TUI logs to, so tracing output stays off the screen.
const LOG_FILE: &str = "strictly_challenge.log";

/// Runs the challenge screen until the player quits.
pub async fn run_tui(
    config: ChallengeConfig,
    incoming: Option<ChallengeInvite>,
    invite_base: String,
) -> Result<()> {
    let log_file = std::fs::File::create(LOG_FILE)?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,strictly_challenge=debug")),
        )
        .with_writer(Arc::new(log_file))
        .with_ansi(false)
        .try_init();

    info!(player = %config.player_name(), mode = %config.mode(), "Starting challenge TUI");

    let store = config.leaderboard().open()?;
    let session = ChallengeSession::new(config.session_settings());
    let (driver, handle) = ChallengeDriver::new(
        session,
        store,
        config.player_name().clone(),
        config.friend_name().clone(),
    );
    let driver_task = tokio::spawn(driver.run());

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let app = App::new(handle.view(), incoming, invite_base);
    let result = event_loop(&mut terminal, &handle, app).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if handle.send(Command::Shutdown).is_err() {
        info!("Driver already stopped");
    }
    if let Err(e) = driver_task.await {
        error!(error = %e, "Driver task failed");
    }

    if let Err(ref e) = result {
        error!(error = %e, "TUI exited with error");
    }
    result
}

#[instrument(skip_all)]
async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    handle: &ChallengeHandle,
    mut app: App,
) -> Result<()> {
    while !app.should_quit {
        app.view = handle.view();
        terminal.draw(|frame| ui::draw(frame, &app))?;

        if event::poll(Duration::from_millis(50))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
            && let Some(action) = map_key(key, app.cursor, app.view.session.mode)
            && let Some(command) = app.apply(action)
        {
            handle.send(command)?;
        }

        tokio::task::yield_now().await;
    }
    info!("Player quit");
    Ok(())
}
