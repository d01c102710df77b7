//! Stateless rendering of the challenge screen.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
};
use strictly_challenge::{Mark, Position, format_timer};

use super::app::App;

const HELP: &str = "1-9/arrows+enter move  c challenge  r reset  space skip  m mode  n new  i invite  q quit";

/// Draws the whole screen.
pub fn draw(frame: &mut Frame, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(13),   // Board and side panel
            Constraint::Length(4), // Status
            Constraint::Length(1), // Help
        ])
        .split(frame.area());

    let title = Paragraph::new(format!(
        "Tic-Tac-Toe Challenge - {} vs {} ({})",
        app.view.player_name, app.view.opponent_name, app.view.session.mode
    ))
    .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
    .alignment(Alignment::Center);
    frame.render_widget(title, rows[0]);

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(rows[1]);
    draw_board(frame, middle[0], app);
    draw_panel(frame, middle[1], app);

    let mut status = vec![Line::from(Span::styled(
        app.status_line(),
        Style::default().fg(Color::Yellow),
    ))];
    if let Some(extra) = app.share.as_ref().or(app.view.notice.as_ref()) {
        status.push(Line::from(Span::styled(extra.clone(), Style::default().fg(Color::Gray))));
    } else if let Some(verdict) = app.invite_verdict() {
        status.push(Line::from(Span::styled(verdict, Style::default().fg(Color::Green))));
    }
    let status = Paragraph::new(status)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, rows[2]);

    let help = Paragraph::new(HELP)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(help, rows[3]);
}

fn draw_board(frame: &mut Frame, area: Rect, app: &App) {
    let board_area = center_rect(area, 38, 11);
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(3),
        ])
        .split(board_area);

    for (band, row) in [0, 2, 4].into_iter().zip(0..3) {
        draw_row(frame, rows[band], app, row);
    }
    for band in [1, 3] {
        frame.render_widget(
            Paragraph::new("─".repeat(rows[band].width as usize)),
            rows[band],
        );
    }
}

fn draw_row(frame: &mut Frame, area: Rect, app: &App, row: usize) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(12),
            Constraint::Length(1),
            Constraint::Length(12),
            Constraint::Length(1),
            Constraint::Length(12),
        ])
        .split(area);

    for (slot, col) in [0, 2, 4].into_iter().zip(0..3) {
        if let Some(pos) = Position::from_index(row * 3 + col) {
            draw_cell(frame, cols[slot], app, pos);
        }
    }
    for slot in [1, 3] {
        frame.render_widget(Paragraph::new("│\n│\n│"), cols[slot]);
    }
}

fn draw_cell(frame: &mut Frame, area: Rect, app: &App, pos: Position) {
    let snap = &app.view.session;
    let (label, mut style) = match snap.board.get(pos).mark() {
        Some(Mark::X) => ("X".to_string(), Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD)),
        Some(Mark::O) => ("O".to_string(), Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
        None => ((pos.index() + 1).to_string(), Style::default().fg(Color::DarkGray)),
    };

    if snap.winning_line.is_some_and(|line| line.contains(pos)) {
        style = style.bg(Color::Green).fg(Color::Black);
    } else if pos == app.cursor {
        style = style.bg(Color::White).fg(Color::Black);
    }

    let cell = Paragraph::new(format!("\n{}", label))
        .style(style)
        .alignment(Alignment::Center);
    frame.render_widget(cell, area);
}

fn draw_panel(frame: &mut Frame, area: Rect, app: &App) {
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(7), Constraint::Min(3)])
        .split(area);

    let snap = &app.view.session;
    let round = if snap.phase.in_challenge() || snap.final_score.is_some() {
        format!("Round {}/{}", snap.round_index.max(1), snap.total_rounds)
    } else {
        "Casual play".to_string()
    };
    let tally = if snap.phase.in_challenge() || snap.final_score.is_some() {
        snap.tally
    } else {
        snap.casual_tally
    };
    let mut lines = vec![
        Line::from(round),
        Line::from(format!("Record: {}", tally)),
        Line::from(format!("Time: {}", format_timer(snap.elapsed_seconds))),
    ];
    if let Some(best) = app.best_round() {
        lines.push(Line::from(format!("Best round: {}", best)));
    }
    if let Some(rank) = app.view.rank {
        lines.push(Line::from(format!("Your rank: #{}", rank)));
    }
    let stats = Paragraph::new(lines).block(Block::default().title("Challenge").borders(Borders::ALL));
    frame.render_widget(stats, parts[0]);

    let items: Vec<ListItem> = app
        .view
        .standings
        .for_mode(snap.mode)
        .take(10)
        .enumerate()
        .map(|(i, entry)| {
            let line = format!("{:>2}. {:<15} {:>5}", i + 1, entry.name(), entry.score());
            let style = if *entry.name() == app.view.player_name {
                Style::default().fg(Color::Cyan)
            } else {
                Style::default()
            };
            ListItem::new(line).style(style)
        })
        .collect();
    let board = List::new(items).block(
        Block::default()
            .title(format!("Leaderboard ({})", snap.mode))
            .borders(Borders::ALL),
    );
    frame.render_widget(board, parts[1]);
}

/// Centers a `width` x `height` rectangle inside `area`.
fn center_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
