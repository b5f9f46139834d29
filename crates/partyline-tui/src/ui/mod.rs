//! UI rendering
//!
//! Rendering functions that convert App state into terminal output using
//! ratatui widgets. All functions are pure (no I/O), taking state and
//! drawing into the frame.

mod chat;
mod composer;
mod lobby;
mod status;

pub use chat::{format_time, typing_indicator};
use partyline_app::{App, NoticeLevel, Screen};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::Paragraph,
};

use crate::InputState;

const STATUS_HEIGHT: u16 = 1;

/// Render the entire UI.
pub fn render(frame: &mut Frame, app: &App, input: &InputState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(STATUS_HEIGHT)])
        .split(frame.area());

    let [main_area, status_area] = chunks.as_ref() else {
        return;
    };

    match app.screen() {
        Screen::Disconnected => render_disconnected(frame, app, *main_area),
        Screen::Lobby => lobby::render(frame, app, input, *main_area),
        Screen::Room => render_room(frame, app, input, *main_area),
    }
    status::render(frame, app, *status_area);
}

/// Render the room screen (header, messages, typing line, composer).
fn render_room(frame: &mut Frame, app: &App, input: &InputState, area: Rect) {
    const HEADER_HEIGHT: u16 = 1;
    const MESSAGES_MIN_HEIGHT: u16 = 3;
    const TYPING_HEIGHT: u16 = 1;
    const COMPOSER_HEIGHT: u16 = 3;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(HEADER_HEIGHT),
            Constraint::Min(MESSAGES_MIN_HEIGHT),
            Constraint::Length(TYPING_HEIGHT),
            Constraint::Length(COMPOSER_HEIGHT),
        ])
        .split(area);

    let [header_area, messages_area, typing_area, composer_area] = chunks.as_ref() else {
        return;
    };

    status::render_header(frame, app, *header_area);
    chat::render(frame, app, *messages_area);
    chat::render_typing(frame, app, *typing_area);
    composer::render(frame, input.composer(), *composer_area);
}

fn render_disconnected(frame: &mut Frame, app: &App, area: Rect) {
    // An error here can only be the connection loss
    let (text, color) = match app.notice() {
        Some(notice) if notice.level == NoticeLevel::Error => (notice.text.as_str(), Color::Red),
        _ => ("Connecting to server...", Color::Yellow),
    };

    let top = area.height / 2;
    let line_area = Rect { y: area.y.saturating_add(top), height: area.height.min(1), ..area };
    let paragraph =
        Paragraph::new(text).style(Style::default().fg(color)).alignment(Alignment::Center);
    frame.render_widget(paragraph, line_area);
}
