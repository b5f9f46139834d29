//! Lobby form
//!
//! Avatar picker, nickname, create/join toggle, room ID, and submit.

use partyline_app::{App, JoinMode, RoomOperation};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::{InputState, LobbyField};

const FORM_WIDTH: u16 = 64;
const FORM_HEIGHT: u16 = 12;
const MARKER_WIDTH: u16 = 2;
const LABEL_WIDTH: u16 = 10;
const PATH_LABEL: &str = "Avatar file: ";

/// Render the lobby form centered in `area`.
pub fn render(frame: &mut Frame, app: &App, input: &InputState, area: Rect) {
    let form = centered(area, FORM_WIDTH, FORM_HEIGHT);
    let block = Block::default().borders(Borders::ALL).title(" Partyline ");
    let inner = block.inner(form);

    let focus = input.focus();
    let session = app.session();
    let mut lines = Vec::new();
    let mut cursor = None;

    match input.avatar_path() {
        Some(path) => {
            cursor = Some((PATH_LABEL.len() as u16 + MARKER_WIDTH + path.cursor() as u16, 0));
            lines.push(Line::from(vec![
                Span::styled("> ", Style::default().fg(Color::Yellow)),
                Span::raw(format!("{PATH_LABEL}{}", path.text())),
            ]));
        },
        None => lines.push(field_line(
            focus == LobbyField::Avatar,
            "Avatar:",
            format!("< {} >  (u: file, r: reset)", session.avatar.label()),
        )),
    }

    lines.push(Line::default());

    if focus == LobbyField::Nickname {
        cursor = cursor.or(Some((text_column(input, &session.nickname), 2)));
    }
    lines.push(field_line(focus == LobbyField::Nickname, "Nickname:", session.nickname.clone()));

    let mode = match app.join_mode() {
        JoinMode::Create => "[Create room]  Join room",
        JoinMode::Join => " Create room  [Join room]",
    };
    lines.push(field_line(focus == LobbyField::Mode, "Mode:", mode.to_string()));

    if app.join_mode() == JoinMode::Join {
        if focus == LobbyField::RoomId {
            cursor = cursor.or(Some((text_column(input, app.room_id_input()), 4)));
        }
        lines.push(field_line(
            focus == LobbyField::RoomId,
            "Room ID:",
            app.room_id_input().to_string(),
        ));
    } else {
        lines.push(Line::default());
    }

    lines.push(Line::default());
    lines.push(submit_line(app, focus == LobbyField::Submit));
    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        "  Tab to move, Enter to submit, Esc to quit",
        Style::default().fg(Color::DarkGray),
    )));

    frame.render_widget(Paragraph::new(lines).block(block), form);

    if let Some((x, y)) = cursor {
        let max_x = inner.x.saturating_add(inner.width.saturating_sub(1));
        frame.set_cursor_position((inner.x.saturating_add(x).min(max_x), inner.y.saturating_add(y)));
    }
}

fn field_line(focused: bool, label: &str, value: String) -> Line<'static> {
    let marker = if focused { "> " } else { "  " };
    let style = if focused {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };

    Line::from(vec![
        Span::styled(marker, style),
        Span::styled(format!("{label:<width$}", width = LABEL_WIDTH as usize), style),
        Span::raw(value),
    ])
}

fn submit_line(app: &App, focused: bool) -> Line<'static> {
    let label = match (app.pending(), app.join_mode()) {
        (Some(RoomOperation::Create), _) => "Creating...",
        (Some(RoomOperation::Join), _) => "Joining...",
        (None, JoinMode::Create) => "[ Create ]",
        (None, JoinMode::Join) => "[ Join ]",
    };

    let style = match (focused, app.can_submit()) {
        (_, false) => Style::default().fg(Color::DarkGray),
        (true, true) => Style::default().fg(Color::Black).bg(Color::Yellow),
        (false, true) => Style::default().fg(Color::Yellow),
    };

    Line::from(vec![Span::raw("  "), Span::styled(label, style)])
}

/// Cursor column of a focused text field.
fn text_column(input: &InputState, text: &str) -> u16 {
    MARKER_WIDTH + LABEL_WIDTH + input.field_cursor(text) as u16
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use partyline_app::AppEvent;
    use partyline_client::SocketEvent;

    use super::*;
    use crate::{KeyInput, ui::test_support::render_rows};

    fn lobby_app() -> App {
        let mut app = App::new();
        let _ = app.handle(AppEvent::Socket(SocketEvent::ConnectionReady));
        app
    }

    #[test]
    fn create_mode_hides_room_id() {
        let mut app = lobby_app();
        app.set_nickname("Ann");

        let rows = render_rows(&app, &InputState::new(), 70, 16);

        assert!(rows.iter().any(|row| row.contains("> Nickname: Ann")));
        assert!(rows.iter().any(|row| row.contains("[ Create ]")));
        assert!(!rows.iter().any(|row| row.contains("Room ID:")));
    }

    #[test]
    fn join_mode_shows_room_id() {
        let mut app = lobby_app();
        app.toggle_join_mode();
        app.set_room_id_input("R1");

        let rows = render_rows(&app, &InputState::new(), 70, 16);

        assert!(rows.iter().any(|row| row.contains("Room ID:  R1")));
        assert!(rows.iter().any(|row| row.contains("[Join room]")));
    }

    #[test]
    fn avatar_path_replaces_picker_line() {
        let mut app = lobby_app();
        let mut input = InputState::new();
        let _ = input.handle_key(KeyInput::BackTab, &mut app);
        let _ = input.handle_key(KeyInput::Char('u'), &mut app);
        let _ = input.handle_key(KeyInput::Char('x'), &mut app);

        let rows = render_rows(&app, &input, 70, 16);

        assert!(rows.iter().any(|row| row.contains("Avatar file: x")));
    }

    #[test]
    fn pending_request_shows_progress() {
        let mut app = lobby_app();
        let _ = app.create_room("Ann", partyline_client::AvatarRef::default());

        let rows = render_rows(&app, &InputState::new(), 70, 16);

        assert!(rows.iter().any(|row| row.contains("Creating...")));
    }
}
