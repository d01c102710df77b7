//! Keyboard mapping for the challenge screen.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use strictly_challenge::{Command, GameMode, Position};

/// What a key press asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Forward a command to the driver.
    Send(Command),
    /// Move the board cursor.
    Cursor(Position),
    /// Place a mark under the cursor.
    PlaceAtCursor,
    /// Show a shareable invite link.
    Invite,
    /// Leave the program.
    Quit,
}

/// Moves the cursor one square in the arrow's direction, stopping at edges.
pub fn move_cursor(cursor: Position, key: KeyCode) -> Position {
    let index = cursor.index();
    let (row, col) = (index / 3, index % 3);
    let (row, col) = match key {
        KeyCode::Up if row > 0 => (row - 1, col),
        KeyCode::Down if row < 2 => (row + 1, col),
        KeyCode::Left if col > 0 => (row, col - 1),
        KeyCode::Right if col < 2 => (row, col + 1),
        _ => (row, col),
    };
    Position::from_index(row * 3 + col).unwrap_or(cursor)
}

/// Maps a key press to an action given the cursor and current mode.
pub fn map_key(key: KeyEvent, cursor: Position, mode: GameMode) -> Option<Action> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Action::Quit);
    }
    match key.code {
        KeyCode::Char(c @ '1'..='9') => {
            let index = c.to_digit(10).map(|d| d as usize - 1)?;
            Some(Action::Send(Command::SubmitMove(index)))
        }
        KeyCode::Up | KeyCode::Down | KeyCode::Left | KeyCode::Right => {
            Some(Action::Cursor(move_cursor(cursor, key.code)))
        }
        KeyCode::Enter => Some(Action::PlaceAtCursor),
        KeyCode::Char('c') => Some(Action::Send(Command::StartChallenge)),
        KeyCode::Char('r') => Some(Action::Send(Command::ResetChallenge)),
        KeyCode::Char(' ') => Some(Action::Send(Command::SkipCountdown)),
        KeyCode::Char('m') => Some(Action::Send(Command::ChangeMode(mode.toggled()))),
        KeyCode::Char('n') => Some(Action::Send(Command::NewGame)),
        KeyCode::Char('l') => Some(Action::Send(Command::RefreshLeaderboard)),
        KeyCode::Char('i') => Some(Action::Invite),
        KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_cursor_stops_at_edges() {
        assert_eq!(move_cursor(Position::TopLeft, KeyCode::Up), Position::TopLeft);
        assert_eq!(move_cursor(Position::TopLeft, KeyCode::Right), Position::TopCenter);
        assert_eq!(move_cursor(Position::Center, KeyCode::Down), Position::BottomCenter);
        assert_eq!(move_cursor(Position::BottomRight, KeyCode::Right), Position::BottomRight);
    }

    #[test]
    fn test_digits_map_to_board_indices() {
        assert_eq!(
            map_key(press(KeyCode::Char('1')), Position::Center, GameMode::Ai),
            Some(Action::Send(Command::SubmitMove(0)))
        );
        assert_eq!(
            map_key(press(KeyCode::Char('9')), Position::Center, GameMode::Ai),
            Some(Action::Send(Command::SubmitMove(8)))
        );
        assert_eq!(map_key(press(KeyCode::Char('0')), Position::Center, GameMode::Ai), None);
    }

    #[test]
    fn test_mode_key_toggles() {
        assert_eq!(
            map_key(press(KeyCode::Char('m')), Position::Center, GameMode::Ai),
            Some(Action::Send(Command::ChangeMode(GameMode::Friend)))
        );
    }

    #[test]
    fn test_ctrl_c_quits() {
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(map_key(key, Position::Center, GameMode::Ai), Some(Action::Quit));
        assert_eq!(
            map_key(press(KeyCode::Char('c')), Position::Center, GameMode::Ai),
            Some(Action::Send(Command::StartChallenge))
        );
    }
}
