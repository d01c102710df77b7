//! Presentation state for the challenge screen.

use strictly_challenge::{
    ChallengeInvite, Command, Phase, Position, RoundWinner, ViewState, format_round_time,
};
use tracing::{debug, instrument, warn};

use super::input::Action;

/// What the screen shows and where the cursor sits.
#[derive(Debug, Clone)]
pub struct App {
    /// Latest view from the driver.
    pub view: ViewState,
    /// Highlighted square.
    pub cursor: Position,
    /// Invite the player accepted on the command line.
    pub incoming: Option<ChallengeInvite>,
    /// Link shown after pressing `i`.
    pub share: Option<String>,
    /// Base URL for shared links.
    pub invite_base: String,
    /// Set once the player asks to leave.
    pub should_quit: bool,
}

impl App {
    /// Starts with the cursor in the center.
    pub fn new(view: ViewState, incoming: Option<ChallengeInvite>, invite_base: String) -> Self {
        Self {
            view,
            cursor: Position::Center,
            incoming,
            share: None,
            invite_base,
            should_quit: false,
        }
    }

    /// Applies a key action, returning the command to send, if any.
    #[instrument(skip(self))]
    pub fn apply(&mut self, action: Action) -> Option<Command> {
        match action {
            Action::Send(command) => {
                self.share = None;
                Some(command)
            }
            Action::Cursor(position) => {
                self.cursor = position;
                None
            }
            Action::PlaceAtCursor => Some(Command::SubmitMove(self.cursor.index())),
            Action::Invite => {
                let invite = ChallengeInvite::for_session(&self.view.player_name, &self.view.session);
                match invite.link(&self.invite_base) {
                    Ok(link) => {
                        debug!(%link, "Invite link built");
                        self.share = Some(link);
                    }
                    Err(e) => {
                        warn!(error = %e, "Could not build invite link");
                        self.share = Some(e.to_string());
                    }
                }
                None
            }
            Action::Quit => {
                self.should_quit = true;
                None
            }
        }
    }

    /// One-line description of what is happening.
    pub fn status_line(&self) -> String {
        let snap = &self.view.session;
        let result = snap.last_outcome.map(|r| self.describe(r.winner()));
        match snap.phase {
            Phase::Complete => match snap.final_score {
                Some(score) => format!("Challenge complete! Score: {}", score),
                None => "Challenge complete!".to_string(),
            },
            Phase::CountdownToNextRound => format!(
                "Round {}: {}. Next round in {}...",
                snap.round_index,
                result.unwrap_or_default(),
                snap.countdown.unwrap_or_default()
            ),
            Phase::CountdownToScoring => format!(
                "Final round: {}. Scoring in {}...",
                result.unwrap_or_default(),
                snap.countdown.unwrap_or_default()
            ),
            Phase::Idle | Phase::InRound => match (snap.countdown, snap.turn) {
                (Some(n), _) => format!("{}. New board in {}...", result.unwrap_or_default(), n),
                _ if snap.opponent_thinking => format!("{} is thinking...", self.view.opponent_name),
                (None, Some(mark)) => {
                    let name = if mark == strictly_challenge::Mark::X {
                        &self.view.player_name
                    } else {
                        &self.view.opponent_name
                    };
                    format!("{}'s turn ({})", name, mark.symbol())
                }
                (None, None) => result.unwrap_or_else(|| "Press c to start a challenge".to_string()),
            },
        }
    }

    /// Verdict against the invite the player accepted, once scored.
    pub fn invite_verdict(&self) -> Option<String> {
        let invite = self.incoming.as_ref()?;
        let score = self.view.session.final_score?;
        Some(if invite.beats(score) {
            format!("You beat the target of {}!", invite.target())
        } else {
            format!("{} short of the target {}", invite.target() - score, invite.target())
        })
    }

    /// Fastest round, formatted.
    pub fn best_round(&self) -> Option<String> {
        self.view.session.best_round_ms.map(format_round_time)
    }

    fn describe(&self, winner: RoundWinner) -> String {
        match winner {
            RoundWinner::Tie => "It's a tie".to_string(),
            RoundWinner::Mark(strictly_challenge::Mark::X) => format!("{} wins", self.view.player_name),
            RoundWinner::Mark(_) => format!("{} wins", self.view.opponent_name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strictly_challenge::{ChallengeSession, SessionSettings, Standings};

    fn app_for(session: &ChallengeSession) -> App {
        let view = ViewState {
            session: session.snapshot(),
            standings: Standings::default(),
            rank: None,
            notice: None,
            player_name: "Ada".to_string(),
            opponent_name: "AI".to_string(),
        };
        App::new(view, None, "https://play.example/".to_string())
    }

    #[test]
    fn test_idle_status_shows_turn() {
        let session = ChallengeSession::new(SessionSettings::default().with_seed(3));
        let app = app_for(&session);
        assert_eq!(app.status_line(), "Ada's turn (X)");
    }

    #[test]
    fn test_opponent_thinking_status() {
        let mut session = ChallengeSession::new(SessionSettings::default().with_seed(3));
        session.start_challenge();
        session.submit_move(4).expect("Center is free");
        let app = app_for(&session);
        assert_eq!(app.status_line(), "AI is thinking...");
    }

    #[test]
    fn test_enter_places_at_cursor() {
        let session = ChallengeSession::new(SessionSettings::default().with_seed(3));
        let mut app = app_for(&session);
        app.apply(Action::Cursor(Position::TopRight));
        assert_eq!(app.apply(Action::PlaceAtCursor), Some(Command::SubmitMove(2)));
    }

    #[test]
    fn test_invite_builds_link() {
        let session = ChallengeSession::new(SessionSettings::default().with_seed(3));
        let mut app = app_for(&session);
        assert_eq!(app.apply(Action::Invite), None);
        let link = app.share.clone().expect("Link shown");
        assert!(link.starts_with("https://play.example/?challenge=Ada"));
    }

    #[test]
    fn test_quit_sets_flag() {
        let session = ChallengeSession::new(SessionSettings::default().with_seed(3));
        let mut app = app_for(&session);
        assert_eq!(app.apply(Action::Quit), None);
        assert!(app.should_quit);
    }
}
