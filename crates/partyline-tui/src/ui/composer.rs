//! Composer line
//!
//! Displays the message being written, with the cursor.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
};

use crate::TextBuffer;

const PROMPT_WIDTH: u16 = 2; // "> "
const INPUT_LINE_OFFSET_Y: u16 = 1; // inside top border
const BORDER_WIDTH: u16 = 1;

/// Render the composer.
pub fn render(frame: &mut Frame, composer: &TextBuffer, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Enter to send, Esc to leave ");

    let paragraph = Paragraph::new(format!("> {}", composer.text()))
        .style(Style::default().fg(Color::White))
        .block(block);
    frame.render_widget(paragraph, area);

    let available_width = area.width.saturating_sub(PROMPT_WIDTH + 2 * BORDER_WIDTH);
    let cursor_offset = (composer.cursor() as u16).min(available_width);

    let cursor_x = area.x + BORDER_WIDTH + PROMPT_WIDTH + cursor_offset;
    let cursor_y = area.y.saturating_add(INPUT_LINE_OFFSET_Y);
    frame.set_cursor_position((cursor_x, cursor_y));
}
