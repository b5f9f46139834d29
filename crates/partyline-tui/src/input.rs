//! Input state and key handling for the TUI.
//!
//! This module owns all text editing state (composer, lobby cursor, avatar
//! path) and handles character-level key events. What a key means depends
//! on the screen the App is showing; completed input goes to the App's
//! public operations.

use std::path::Path;

use partyline_app::{App, AppAction, JoinMode, KeyInput, Notice, Screen};

use crate::avatar;

/// Single-line text buffer with a character cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBuffer {
    text: String,
    /// Cursor position in characters.
    cursor: usize,
}

impl TextBuffer {
    /// Buffer holding `text` with the cursor at `cursor`, clamped to the end.
    pub fn with_cursor(text: impl Into<String>, cursor: usize) -> Self {
        let text = text.into();
        let cursor = cursor.min(text.chars().count());
        Self { text, cursor }
    }

    /// Current text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Cursor position in characters.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Whether the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Take the text, leaving the buffer empty.
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.text)
    }

    /// Apply an editing key. Returns `false` if the key does not edit text.
    pub fn edit(&mut self, key: KeyInput) -> bool {
        match key {
            KeyInput::Char(c) => {
                let at = self.byte_offset(self.cursor);
                self.text.insert(at, c);
                self.cursor += 1;
            },
            KeyInput::Backspace => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    let at = self.byte_offset(self.cursor);
                    self.text.remove(at);
                }
            },
            KeyInput::Delete => {
                if self.cursor < self.len() {
                    let at = self.byte_offset(self.cursor);
                    self.text.remove(at);
                }
            },
            KeyInput::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyInput::Right => self.cursor = (self.cursor + 1).min(self.len()),
            KeyInput::Home => self.cursor = 0,
            KeyInput::End => self.cursor = self.len(),
            _ => return false,
        }
        true
    }

    fn len(&self) -> usize {
        self.text.chars().count()
    }

    fn byte_offset(&self, chars: usize) -> usize {
        self.text.char_indices().nth(chars).map_or(self.text.len(), |(i, _)| i)
    }
}

/// Lobby form fields, in focus order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LobbyField {
    /// Avatar picker.
    Avatar,
    /// Nickname text field.
    #[default]
    Nickname,
    /// Create/join toggle.
    Mode,
    /// Room ID text field. Only reachable in join mode.
    RoomId,
    /// Submit button.
    Submit,
}

impl LobbyField {
    fn next(self, mode: JoinMode) -> Self {
        match self {
            Self::Avatar => Self::Nickname,
            Self::Nickname => Self::Mode,
            Self::Mode if mode == JoinMode::Join => Self::RoomId,
            Self::Mode | Self::RoomId => Self::Submit,
            Self::Submit => Self::Avatar,
        }
    }

    fn previous(self, mode: JoinMode) -> Self {
        match self {
            Self::Avatar => Self::Submit,
            Self::Nickname => Self::Avatar,
            Self::Mode => Self::Nickname,
            Self::RoomId => Self::Mode,
            Self::Submit if mode == JoinMode::Join => Self::RoomId,
            Self::Submit => Self::Mode,
        }
    }
}

/// Input state for the TUI.
#[derive(Debug, Default)]
pub struct InputState {
    /// Room composer.
    composer: TextBuffer,
    /// Focused lobby field.
    focus: LobbyField,
    /// Cursor within the focused lobby text field.
    field_cursor: usize,
    /// Custom avatar path being typed. `None` unless the picker is open.
    avatar_path: Option<TextBuffer>,
}

impl InputState {
    /// Create a new empty input state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Room composer.
    pub fn composer(&self) -> &TextBuffer {
        &self.composer
    }

    /// Focused lobby field.
    pub fn focus(&self) -> LobbyField {
        self.focus
    }

    /// Cursor within the focused lobby text field, clamped to `text`.
    pub fn field_cursor(&self, text: &str) -> usize {
        self.field_cursor.min(text.chars().count())
    }

    /// Custom avatar path being typed, if the picker is open.
    pub fn avatar_path(&self) -> Option<&TextBuffer> {
        self.avatar_path.as_ref()
    }

    /// Handle a key input event.
    ///
    /// Returns actions to process (may be empty for keys with no effect).
    pub fn handle_key(&mut self, key: KeyInput, app: &mut App) -> Vec<AppAction> {
        match app.screen() {
            Screen::Disconnected => match key {
                KeyInput::Esc => app.quit(),
                _ => vec![],
            },
            Screen::Lobby => self.handle_lobby_key(key, app),
            Screen::Room => self.handle_room_key(key, app),
        }
    }

    fn handle_room_key(&mut self, key: KeyInput, app: &mut App) -> Vec<AppAction> {
        match key {
            KeyInput::Enter => {
                let actions = app.send_chat_message(self.composer.text(), now_millis());
                // Blank input stays in the composer
                if !actions.is_empty() {
                    self.composer.take();
                }
                actions
            },
            KeyInput::Esc => {
                self.composer.take();
                self.focus = LobbyField::Nickname;
                self.field_cursor = 0;
                app.leave_room()
            },
            KeyInput::Char(_) => {
                self.composer.edit(key);
                let mut actions = app.notify_typing();
                actions.push(AppAction::Render);
                actions
            },
            _ if self.composer.edit(key) => vec![AppAction::Render],
            _ => vec![],
        }
    }

    fn handle_lobby_key(&mut self, key: KeyInput, app: &mut App) -> Vec<AppAction> {
        if self.avatar_path.is_some() {
            return self.handle_avatar_path_key(key, app);
        }

        let mode = app.join_mode();
        match key {
            KeyInput::Esc => return app.quit(),
            KeyInput::Tab | KeyInput::Down => self.move_focus(self.focus.next(mode), app),
            KeyInput::BackTab | KeyInput::Up => self.move_focus(self.focus.previous(mode), app),
            _ if app.is_form_locked() => return vec![],
            _ => {
                return match self.focus {
                    LobbyField::Avatar => self.handle_avatar_key(key, app),
                    LobbyField::Nickname | LobbyField::RoomId => self.handle_field_key(key, app),
                    LobbyField::Mode => match key {
                        KeyInput::Enter
                        | KeyInput::Char(' ')
                        | KeyInput::Left
                        | KeyInput::Right => {
                            app.toggle_join_mode();
                            vec![AppAction::Render]
                        },
                        _ => vec![],
                    },
                    LobbyField::Submit => match key {
                        KeyInput::Enter => Self::submit(app),
                        _ => vec![],
                    },
                };
            },
        }
        vec![AppAction::Render]
    }

    fn handle_avatar_key(&mut self, key: KeyInput, app: &mut App) -> Vec<AppAction> {
        match key {
            KeyInput::Left => app.previous_avatar(),
            KeyInput::Right => app.next_avatar(),
            KeyInput::Char('r') => app.reset_avatar(),
            KeyInput::Enter | KeyInput::Char('u') => self.avatar_path = Some(TextBuffer::default()),
            _ => return vec![],
        }
        vec![AppAction::Render]
    }

    fn handle_avatar_path_key(&mut self, key: KeyInput, app: &mut App) -> Vec<AppAction> {
        let Some(path) = self.avatar_path.as_mut() else {
            return vec![];
        };

        match key {
            KeyInput::Esc => self.avatar_path = None,
            KeyInput::Enter => {
                let path = path.take();
                self.avatar_path = None;
                match avatar::load_custom(Path::new(path.trim())) {
                    Ok(avatar) => {
                        app.set_avatar(avatar);
                        app.clear_notice();
                    },
                    Err(e) => {
                        tracing::warn!(error = %e, %path, "custom avatar rejected");
                        app.set_notice(Notice::error(e.notice()));
                    },
                }
            },
            _ if path.edit(key) => {},
            _ => return vec![],
        }
        vec![AppAction::Render]
    }

    fn handle_field_key(&mut self, key: KeyInput, app: &mut App) -> Vec<AppAction> {
        if key == KeyInput::Enter {
            return Self::submit(app);
        }

        let current = match self.focus {
            LobbyField::RoomId => app.room_id_input().to_string(),
            _ => app.session().nickname.clone(),
        };
        let mut buffer = TextBuffer::with_cursor(current, self.field_cursor);
        if !buffer.edit(key) {
            return vec![];
        }

        self.field_cursor = buffer.cursor();
        match self.focus {
            LobbyField::RoomId => app.set_room_id_input(buffer.take()),
            _ => app.set_nickname(buffer.take()),
        }
        vec![AppAction::Render]
    }

    fn move_focus(&mut self, focus: LobbyField, app: &App) {
        self.focus = focus;
        self.field_cursor = match focus {
            LobbyField::Nickname => app.session().nickname.chars().count(),
            LobbyField::RoomId => app.room_id_input().chars().count(),
            _ => 0,
        };
    }

    fn submit(app: &mut App) -> Vec<AppAction> {
        let actions = app.submit_lobby();
        if actions.is_empty() { vec![AppAction::Render] } else { actions }
    }
}

/// Current time in milliseconds since the Unix epoch.
fn now_millis() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or_default()
}
