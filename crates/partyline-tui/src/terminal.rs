//! Crossterm-backed [`Driver`].
//!
//! Owns the terminal for the lifetime of the driver: raw mode and the
//! alternate screen are entered on construction and left on drop, even when
//! the runtime bails out with an error.

use std::{
    io::{self, Stdout},
    time::Duration,
};

use crossterm::{
    ExecutableCommand,
    event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use partyline_app::{App, AppAction, AppEvent, Driver};
use ratatui::{Terminal, backend::CrosstermBackend};
use thiserror::Error;

use crate::{InputState, KeyInput, ui};

/// Errors from the terminal.
#[derive(Debug, Error)]
pub enum TerminalError {
    /// Terminal I/O failed.
    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),

    /// The terminal stopped producing input.
    #[error("terminal input stream ended")]
    InputClosed,
}

/// Terminal front-end: reads keys, redraws the screen.
///
/// Text being edited (composer, avatar path) lives here in [`InputState`],
/// everything else in the [`App`].
pub struct TerminalDriver {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    keys: EventStream,
    input: InputState,
    tick: Duration,
}

impl TerminalDriver {
    /// Take over the terminal. Emits a tick after `tick` without input.
    pub fn new(tick: Duration) -> Result<Self, TerminalError> {
        enable_raw_mode()?;
        if let Err(err) = io::stdout().execute(EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(err.into());
        }

        Ok(Self {
            terminal: Terminal::new(CrosstermBackend::new(io::stdout()))?,
            keys: EventStream::new(),
            input: InputState::new(),
            tick,
        })
    }

    fn on_terminal_event(&mut self, event: Event, app: &mut App) -> Vec<AppAction> {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                translate_key(key).map_or_else(Vec::new, |key| self.input.handle_key(key, app))
            },
            Event::Resize(cols, rows) => app.handle(AppEvent::Resize(cols, rows)),
            _ => Vec::new(),
        }
    }
}

impl Driver for TerminalDriver {
    type Error = TerminalError;

    async fn poll_event(&mut self, app: &mut App) -> Result<Vec<AppAction>, Self::Error> {
        tokio::select! {
            biased;

            next = self.keys.next() => match next {
                Some(Ok(event)) => Ok(self.on_terminal_event(event, app)),
                Some(Err(err)) => Err(err.into()),
                None => Err(TerminalError::InputClosed),
            },

            () = tokio::time::sleep(self.tick) => Ok(app.handle(AppEvent::Tick)),
        }
    }

    fn render(&mut self, app: &App) -> Result<(), Self::Error> {
        let input = &self.input;
        self.terminal.draw(|frame| ui::render(frame, app, input))?;
        Ok(())
    }

    fn stop(&mut self) {
        let _ = self.terminal.show_cursor();
    }
}

impl Drop for TerminalDriver {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = io::stdout().execute(LeaveAlternateScreen);
    }
}

/// Map a crossterm key press onto the platform-independent [`KeyInput`].
///
/// Control chords are not text; they are dropped so they never reach a field.
fn translate_key(key: KeyEvent) -> Option<KeyInput> {
    let input = match key.code {
        KeyCode::Char(_) if key.modifiers.contains(KeyModifiers::CONTROL) => return None,
        KeyCode::Char(c) => KeyInput::Char(c),
        KeyCode::Enter => KeyInput::Enter,
        KeyCode::Backspace => KeyInput::Backspace,
        KeyCode::Delete => KeyInput::Delete,
        KeyCode::Tab => KeyInput::Tab,
        KeyCode::BackTab => KeyInput::BackTab,
        KeyCode::Esc => KeyInput::Esc,
        KeyCode::Left => KeyInput::Left,
        KeyCode::Right => KeyInput::Right,
        KeyCode::Up => KeyInput::Up,
        KeyCode::Down => KeyInput::Down,
        KeyCode::Home => KeyInput::Home,
        KeyCode::End => KeyInput::End,
        _ => return None,
    };
    Some(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_and_shifted_chars_are_text() {
        let plain = KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE);
        let shifted = KeyEvent::new(KeyCode::Char('A'), KeyModifiers::SHIFT);

        assert_eq!(translate_key(plain), Some(KeyInput::Char('a')));
        assert_eq!(translate_key(shifted), Some(KeyInput::Char('A')));
    }

    #[test]
    fn control_chords_are_dropped() {
        let chord = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(translate_key(chord), None);
    }

    #[test]
    fn back_tab_moves_focus_backwards() {
        let key = KeyEvent::new(KeyCode::BackTab, KeyModifiers::SHIFT);
        assert_eq!(translate_key(key), Some(KeyInput::BackTab));
    }

    #[test]
    fn unmapped_keys_are_ignored() {
        let key = KeyEvent::new(KeyCode::F(5), KeyModifiers::NONE);
        assert_eq!(translate_key(key), None);
    }
}
