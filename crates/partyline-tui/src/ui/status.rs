//! Status bar and room header
//!
//! The status bar shows connection state and the latest notice; the header
//! names the room and the local user.

use partyline_app::{App, ConnectionState, NoticeLevel};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

/// Render the status bar.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let connection_status = match app.connection_state() {
        ConnectionState::Disconnected => {
            Span::styled("Disconnected", Style::default().fg(Color::Red))
        },
        ConnectionState::Connected => Span::styled(
            "Connected",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
    };

    let notice = app.notice().map_or_else(
        || Span::raw(""),
        |notice| {
            let color = match notice.level {
                NoticeLevel::Success => Color::LightGreen,
                NoticeLevel::Error => Color::LightRed,
            };
            Span::styled(format!(" | {}", notice.text), Style::default().fg(color))
        },
    );

    let status_line = Line::from(vec![Span::raw(" "), connection_status, notice]);
    let paragraph =
        Paragraph::new(status_line).style(Style::default().bg(Color::DarkGray).fg(Color::White));

    frame.render_widget(paragraph, area);
}

/// Render the room header.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let session = app.session();
    let room = session.room_id.as_deref().unwrap_or_default();

    let header = Line::from(vec![
        Span::styled(format!(" Room {room}"), Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(format!(" | {} ({})", session.nickname, session.avatar.label())),
        Span::styled(" | Esc to leave", Style::default().fg(Color::DarkGray)),
    ]);

    frame.render_widget(Paragraph::new(header), area);
}

#[cfg(test)]
mod tests {
    use partyline_app::{AppEvent, Notice};
    use partyline_client::{AvatarRef, SocketEvent};

    use super::*;
    use crate::{InputState, ui::test_support::render_rows};

    #[test]
    fn status_bar_shows_notice() {
        let mut app = App::new();
        let _ = app.handle(AppEvent::Socket(SocketEvent::ConnectionReady));
        app.set_notice(Notice::error("Failed to join room"));

        let rows = render_rows(&app, &InputState::new(), 60, 12);

        insta::assert_snapshot!(rows.last().unwrap().trim(), @"Connected | Failed to join room");
    }

    #[test]
    fn header_names_room_and_user() {
        let mut app = App::new();
        let _ = app.handle(AppEvent::Socket(SocketEvent::ConnectionReady));
        let _ = app.create_room("Ann", AvatarRef::default());
        let _ = app.handle(AppEvent::RoomCreated { room_id: "R1".into() });

        let rows = render_rows(&app, &InputState::new(), 60, 12);

        insta::assert_snapshot!(rows[0].trim(), @"Room R1 | Ann (johndoe) | Esc to leave");
    }
}
