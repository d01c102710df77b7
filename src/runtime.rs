//! Runs a [`ChallengeSession`] on tokio.
//!
//! The driver owns the session. Commands arrive over an unbounded channel,
//! the virtual clock follows tokio's clock, and a fresh [`ViewState`] is
//! published on a watch channel after every wake-up. Leaderboard calls run
//! as spawned tasks and report back over a second channel, so the session
//! never waits on the store.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

use crate::challenge::{ChallengeSession, GameMode, SessionEvent, Snapshot};
use crate::leaderboard::{LeaderboardEntry, LeaderboardError, LeaderboardSync, Standings};

/// A presentation-side request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Place the human's mark at a board index.
    SubmitMove(usize),
    /// Start a new challenge.
    StartChallenge,
    /// Restart the running challenge.
    ResetChallenge,
    /// End the current countdown early.
    SkipCountdown,
    /// Switch between AI and friend play.
    ChangeMode(GameMode),
    /// Clear the board for a casual game.
    NewGame,
    /// Reload standings from the store.
    RefreshLeaderboard,
    /// Stop the driver.
    Shutdown,
}

/// Everything the presentation layer renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewState {
    /// Session snapshot.
    pub session: Snapshot,
    /// Last known standings.
    pub standings: Standings,
    /// The player's rank in the current mode.
    pub rank: Option<usize>,
    /// Transient message, e.g. a rejected move or an offline store.
    pub notice: Option<String>,
    /// Name for X.
    pub player_name: String,
    /// Name for O.
    pub opponent_name: String,
}

/// The driver has stopped and no longer accepts commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("Challenge driver has stopped")]
pub struct DriverStopped;

/// Presentation-side end of a running driver.
#[derive(Debug, Clone)]
pub struct ChallengeHandle {
    commands: mpsc::UnboundedSender<Command>,
    view: watch::Receiver<ViewState>,
}

impl ChallengeHandle {
    /// Queues a command.
    ///
    /// # Errors
    ///
    /// Returns [`DriverStopped`] once the driver has exited.
    pub fn send(&self, command: Command) -> Result<(), DriverStopped> {
        self.commands.send(command).map_err(|_| DriverStopped)
    }

    /// The latest published view.
    pub fn view(&self) -> ViewState {
        self.view.borrow().clone()
    }

    /// Waits for the next published view.
    ///
    /// # Errors
    ///
    /// Returns [`DriverStopped`] once the driver has exited.
    pub async fn changed(&mut self) -> Result<ViewState, DriverStopped> {
        self.view.changed().await.map_err(|_| DriverStopped)?;
        Ok(self.view.borrow_and_update().clone())
    }
}

/// Results of background store calls.
#[derive(Debug)]
enum StoreReply {
    Refreshed(Result<Vec<LeaderboardEntry>, LeaderboardError>),
    Saved {
        stored: LeaderboardEntry,
        standings: Option<Vec<LeaderboardEntry>>,
    },
    SaveFailed {
        entry: LeaderboardEntry,
        error: LeaderboardError,
    },
}

/// Owns a session and drives it from commands and timers.
pub struct ChallengeDriver {
    session: ChallengeSession,
    store: Arc<dyn LeaderboardSync>,
    player_name: String,
    friend_name: String,
    standings: Standings,
    notice: Option<String>,
    commands: mpsc::UnboundedReceiver<Command>,
    view: watch::Sender<ViewState>,
    replies_tx: mpsc::UnboundedSender<StoreReply>,
    replies: mpsc::UnboundedReceiver<StoreReply>,
    last_tick: Instant,
}

impl ChallengeDriver {
    /// Wraps `session` and returns the driver with its handle.
    #[instrument(skip(session, store), fields(player = %player_name))]
    pub fn new(
        session: ChallengeSession,
        store: Arc<dyn LeaderboardSync>,
        player_name: String,
        friend_name: String,
    ) -> (Self, ChallengeHandle) {
        // Leaderboard identities use the trimmed name.
        let player_name = player_name.trim().to_string();
        let (commands_tx, commands) = mpsc::unbounded_channel();
        let (replies_tx, replies) = mpsc::unbounded_channel();
        let standings = Standings::default();
        let initial = build_view(&session, &standings, None, &player_name, &friend_name);
        let (view, view_rx) = watch::channel(initial);
        let driver = Self {
            session,
            store,
            player_name,
            friend_name,
            standings,
            notice: None,
            commands,
            view,
            replies_tx,
            replies,
            last_tick: Instant::now(),
        };
        let handle = ChallengeHandle {
            commands: commands_tx,
            view: view_rx,
        };
        (driver, handle)
    }

    /// Runs until [`Command::Shutdown`] or every handle is dropped.
    #[instrument(skip(self), fields(player = %self.player_name))]
    pub async fn run(mut self) {
        info!("Challenge driver started");
        self.last_tick = Instant::now();
        self.refresh();

        loop {
            let next = self.session.next_timer_in();
            let deadline = self.last_tick + next.unwrap_or(Duration::from_secs(3600));

            tokio::select! {
                command = self.commands.recv() => {
                    self.sync_clock();
                    match command {
                        None | Some(Command::Shutdown) => break,
                        Some(command) => self.handle(command),
                    }
                }
                Some(reply) = self.replies.recv() => {
                    self.sync_clock();
                    self.apply_reply(reply);
                }
                _ = tokio::time::sleep_until(deadline), if next.is_some() => {
                    self.sync_clock();
                }
            }

            self.process_events();
            self.publish();
        }

        self.session.shutdown();
        info!("Challenge driver stopped");
    }

    fn sync_clock(&mut self) {
        let now = Instant::now();
        let elapsed = now.saturating_duration_since(self.last_tick);
        self.last_tick = now;
        self.session.advance(elapsed);
    }

    #[instrument(skip(self))]
    fn handle(&mut self, command: Command) {
        match command {
            Command::SubmitMove(index) => match self.session.submit_move(index) {
                Ok(()) => self.notice = None,
                Err(e) => self.notice = Some(e.to_string()),
            },
            Command::StartChallenge => {
                self.notice = None;
                self.session.start_challenge();
            }
            Command::ResetChallenge => {
                self.notice = None;
                self.session.reset_challenge();
            }
            Command::SkipCountdown => self.session.skip_countdown(),
            Command::ChangeMode(mode) => self.session.change_mode(mode),
            Command::NewGame => self.session.new_game(),
            Command::RefreshLeaderboard => self.refresh(),
            Command::Shutdown => {}
        }
    }

    fn process_events(&mut self) {
        for event in self.session.drain_events() {
            if let SessionEvent::ChallengeComplete(summary) = event {
                let entry = LeaderboardEntry::from_challenge(self.player_name.clone(), &summary);
                self.persist(entry);
            }
        }
    }

    fn refresh(&self) {
        let store = Arc::clone(&self.store);
        let replies = self.replies_tx.clone();
        tokio::spawn(async move {
            let result = store.fetch_all().await;
            let _ = replies.send(StoreReply::Refreshed(result));
        });
    }

    #[instrument(skip(self, entry), fields(score = entry.score()))]
    fn persist(&self, entry: LeaderboardEntry) {
        info!("Persisting challenge result");
        let store = Arc::clone(&self.store);
        let replies = self.replies_tx.clone();
        tokio::spawn(async move {
            let reply = match store.upsert(entry.clone()).await {
                Ok(stored) => StoreReply::Saved {
                    stored,
                    standings: store.fetch_all().await.ok(),
                },
                Err(error) => StoreReply::SaveFailed { entry, error },
            };
            let _ = replies.send(reply);
        });
    }

    fn apply_reply(&mut self, reply: StoreReply) {
        match reply {
            StoreReply::Refreshed(Ok(entries)) => {
                debug!(count = entries.len(), "Standings refreshed");
                self.standings = Standings::new(entries);
            }
            StoreReply::Refreshed(Err(e)) => {
                warn!(error = %e, "Leaderboard refresh failed, keeping last standings");
                self.notice = Some("Leaderboard unavailable".to_string());
            }
            StoreReply::Saved { stored, standings } => {
                info!(score = stored.score(), "Challenge result saved");
                match standings {
                    Some(entries) => self.standings = Standings::new(entries),
                    None => {
                        self.standings.apply(stored);
                    }
                }
            }
            StoreReply::SaveFailed { entry, error } => {
                warn!(error = %error, "Saving challenge result failed, keeping it locally");
                self.standings.apply(entry);
                self.notice = Some("Leaderboard unavailable: score kept locally".to_string());
            }
        }
    }

    fn publish(&self) {
        let view = build_view(
            &self.session,
            &self.standings,
            self.notice.clone(),
            &self.player_name,
            &self.friend_name,
        );
        self.view.send_replace(view);
    }
}

fn build_view(
    session: &ChallengeSession,
    standings: &Standings,
    notice: Option<String>,
    player_name: &str,
    friend_name: &str,
) -> ViewState {
    let opponent_name = match session.mode() {
        GameMode::Ai => "AI",
        GameMode::Friend => friend_name,
    };
    ViewState {
        session: session.snapshot(),
        standings: standings.clone(),
        rank: standings.rank_of(player_name, session.mode()),
        notice,
        player_name: player_name.to_string(),
        opponent_name: opponent_name.to_string(),
    }
}
