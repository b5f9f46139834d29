//! Chat area
//!
//! Displays the room's messages, newest at the bottom, and the typing line.

use std::fmt::Display;

use chrono::{DateTime, Local, TimeZone, Utc};
use partyline_app::App;
use partyline_client::{AvatarRef, ChatMessage};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

const BORDER_SIZE: u16 = 2;

/// Render the message list.
///
/// Only the newest messages that fit are shown, so the list always follows
/// the latest message.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Messages ");
    let nickname = app.session().nickname.as_str();

    let width = usize::from(area.width.saturating_sub(BORDER_SIZE));

    let rows: Vec<Line> = if app.messages().is_empty() {
        vec![Line::from(Span::styled("No messages yet", Style::default().fg(Color::DarkGray)))]
    } else {
        app.messages()
            .iter()
            .flat_map(|msg| wrap_line(message_line(msg, nickname, &Local), width))
            .collect()
    };

    let visible_height = usize::from(area.height.saturating_sub(BORDER_SIZE));
    let skip = rows.len().saturating_sub(visible_height);
    let items: Vec<_> = rows.into_iter().skip(skip).map(ListItem::new).collect();

    frame.render_widget(List::new(items).block(block), area);
}

/// One grapheme of a line being wrapped.
struct Glyph {
    symbol: String,
    style: Style,
    width: usize,
}

impl Glyph {
    fn is_space(&self) -> bool {
        self.symbol.trim().is_empty()
    }
}

/// Split `line` into rows no wider than `width`, breaking at spaces where
/// possible and mid-word otherwise. Styles and alignment carry over.
fn wrap_line(line: Line<'static>, width: usize) -> Vec<Line<'static>> {
    if width == 0 || line.width() <= width {
        return vec![line];
    }

    let mut rows = Vec::new();
    let mut row: Vec<Glyph> = Vec::new();
    let mut row_width = 0;

    for grapheme in line.styled_graphemes(Style::default()) {
        let glyph = Glyph {
            symbol: grapheme.symbol.to_string(),
            style: grapheme.style,
            width: Span::raw(grapheme.symbol).width(),
        };

        if row_width + glyph.width > width && !row.is_empty() {
            if glyph.is_space() {
                rows.push(std::mem::take(&mut row));
                row_width = 0;
                continue;
            }

            // Carry the partial word over to the next row
            let carry = match row.iter().rposition(Glyph::is_space) {
                Some(space) if space > 0 => row.split_off(space).into_iter().skip(1).collect(),
                _ => Vec::new(),
            };
            rows.push(std::mem::replace(&mut row, carry));
            row_width = row.iter().map(|g| g.width).sum();
        }

        row_width += glyph.width;
        row.push(glyph);
    }
    rows.push(row);

    rows.into_iter()
        .map(|row| {
            let mut wrapped = Line::from(merge_glyphs(row));
            wrapped.alignment = line.alignment;
            wrapped
        })
        .collect()
}

/// Join runs of equally styled glyphs back into spans.
fn merge_glyphs(row: Vec<Glyph>) -> Vec<Span<'static>> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    for glyph in row {
        match spans.last_mut() {
            Some(span) if span.style == glyph.style => span.content.to_mut().push_str(&glyph.symbol),
            _ => spans.push(Span::styled(glyph.symbol, glyph.style)),
        }
    }
    spans
}

/// Render the typing line. Empty when nobody else is typing.
pub fn render_typing(frame: &mut Frame, app: &App, area: Rect) {
    let Some(text) = typing_indicator(app.typing_roster(), &app.session().nickname) else {
        return;
    };

    let paragraph = Paragraph::new(format!(" {text}"))
        .style(Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC));
    frame.render_widget(paragraph, area);
}

/// Typing indicator text for `roster`, as seen by `local_nickname`.
///
/// `None` when the roster is empty or led by the local user.
pub fn typing_indicator(roster: &[String], local_nickname: &str) -> Option<String> {
    let first = roster.first()?;
    if first == local_nickname {
        return None;
    }

    let verb = if roster.len() == 1 { "is" } else { "are" };
    Some(format!("{} {verb} typing...", roster.join(", ")))
}

/// Format a millisecond timestamp as `HH:MM:SS` in `tz`.
pub fn format_time<Tz>(millis: u64, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    i64::try_from(millis)
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|dt| dt.with_timezone(tz).format("%H:%M:%S").to_string())
        .unwrap_or_default()
}

/// One message as a display line.
fn message_line<Tz>(msg: &ChatMessage, local_nickname: &str, tz: &Tz) -> Line<'static>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let time = Span::styled(format_time(msg.timestamp, tz), Style::default().fg(Color::DarkGray));

    if msg.is_system_message {
        return Line::from(vec![
            time,
            Span::raw(" "),
            Span::styled(
                msg.body.clone(),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            ),
        ])
        .centered();
    }

    let sender = msg.user_nickname.clone().unwrap_or_else(|| msg.perm_id.clone());
    let avatar =
        msg.user_icon.as_ref().map_or_else(AvatarRef::default, AvatarRef::or_default).label();
    let own = !local_nickname.is_empty() && sender == local_nickname;
    let sender_color = if own { Color::Cyan } else { Color::Green };

    let line = Line::from(vec![
        time,
        Span::raw(" "),
        Span::styled(format!("({avatar})"), Style::default().fg(Color::Magenta)),
        Span::raw(" "),
        Span::styled(sender, Style::default().fg(sender_color).add_modifier(Modifier::BOLD)),
        Span::raw(": "),
        Span::raw(msg.body.clone()),
    ]);

    if own { line.right_aligned() } else { line }
}
