//! Session controller state machine.
//!
//! This module defines the [`App`] state machine, which owns the session
//! state of the front-end completely decoupled from I/O and from the chat
//! service connection.
//!
//! It consumes [`crate::AppEvent`] inputs and produces [`crate::AppAction`]
//! instructions for the runtime to execute. Connection callbacks arrive
//! through its [`SocketEventHandler`] implementation.
//!
//! # Responsibilities
//!
//! - Tracks connection state, room identity, nickname, and avatar.
//! - Accumulates the room's message list and typing roster.
//! - Guards room requests (one at a time, only when connected).
//! - Debounces typing presence to one update per composing burst.
//! - Surfaces every failure as a [`Notice`].

use partyline_client::{
    AvatarRef, ChatMessage, DEFAULT_AVATARS, MessageList, SocketEventHandler, SocketMessage,
    SocketMessageType, TypingPresence,
};

use crate::{
    AppAction, AppEvent, ConnectionState, JoinMode, Notice, RoomOperation, Screen, Session,
};

const NOTICE_CONNECTED: &str = "Connected to server";
const NOTICE_CONNECTION_LOST: &str = "Connection lost. Please reload.";
const NOTICE_ROOM_CREATED: &str = "Room created successfully!";
const NOTICE_ROOM_JOINED: &str = "Joined room successfully!";
const NOTICE_CREATE_FAILED: &str = "Failed to create room";
const NOTICE_JOIN_FAILED: &str = "Failed to join room";
const NOTICE_SEND_FAILED: &str = "Failed to send message";

/// Session controller.
///
/// Pure state machine that processes events and produces actions.
/// No I/O dependencies - fully testable without a connection.
#[derive(Debug, Clone)]
pub struct App {
    /// Connection, room, and identity.
    session: Session,
    /// Room ID typed into the lobby form.
    room_id_input: String,
    /// Lobby form mode.
    join_mode: JoinMode,
    /// Room request in flight. `None` if idle.
    pending: Option<RoomOperation>,
    /// Room messages in arrival order.
    messages: Vec<ChatMessage>,
    /// Nicknames currently typing, as last reported.
    typing_roster: Vec<String>,
    /// Whether a typing=true update has been sent since the last message.
    is_typing: bool,
    /// Terminal dimensions (columns, rows).
    terminal_size: (u16, u16),
    /// Latest notice. `None` if nothing to show.
    notice: Option<Notice>,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    /// Create a new App in the disconnected state.
    pub fn new() -> Self {
        Self {
            session: Session::default(),
            room_id_input: String::new(),
            join_mode: JoinMode::default(),
            pending: None,
            messages: Vec::new(),
            typing_roster: Vec::new(),
            is_typing: false,
            terminal_size: (80, 24),
            notice: None,
        }
    }

    /// Process an event and return actions.
    pub fn handle(&mut self, event: AppEvent) -> Vec<AppAction> {
        match event {
            AppEvent::Tick => vec![],
            AppEvent::Resize(cols, rows) => {
                self.terminal_size = (cols, rows);
                vec![AppAction::Render]
            },
            AppEvent::Socket(event) => {
                event.dispatch(self);
                vec![AppAction::Render]
            },
            AppEvent::RoomCreated { room_id } => {
                tracing::info!(%room_id, "room created");
                self.pending = None;
                self.enter_room(room_id, Vec::new());
                self.notice = Some(Notice::success(NOTICE_ROOM_CREATED));
                vec![AppAction::Render]
            },
            AppEvent::RoomJoined { room_id, history } => {
                let history = MessageList::from_response(&history).messages;
                tracing::info!(%room_id, messages = history.len(), "room joined");
                self.pending = None;
                self.enter_room(room_id, history);
                self.notice = Some(Notice::success(NOTICE_ROOM_JOINED));
                vec![AppAction::Render]
            },
            AppEvent::RoomOperationFailed { operation, reason } => {
                tracing::warn!(?operation, %reason, "room request failed");
                self.pending = None;
                // Drop traffic buffered while the request was in flight
                self.messages.clear();
                self.typing_roster.clear();
                let text = match operation {
                    RoomOperation::Create => NOTICE_CREATE_FAILED,
                    RoomOperation::Join => {
                        self.room_id_input.clear();
                        NOTICE_JOIN_FAILED
                    },
                };
                self.notice = Some(Notice::error(text));
                vec![AppAction::Render]
            },
            AppEvent::MessageSent => {
                self.is_typing = false;
                vec![]
            },
            AppEvent::SendFailed { reason } => {
                tracing::warn!(%reason, "send failed");
                self.notice = Some(Notice::error(NOTICE_SEND_FAILED));
                vec![AppAction::Render]
            },
        }
    }

    /// Route a message from the chat service by its kind.
    ///
    /// Chat messages are appended in arrival order; typing presence replaces
    /// the roster. Unknown kinds and malformed payloads are ignored.
    pub fn dispatch_incoming(&mut self, message: SocketMessage) {
        match message.message_type() {
            Some(SocketMessageType::SendMessage) => {
                match serde_json::from_value::<ChatMessage>(message.data) {
                    Ok(chat) => self.messages.push(chat),
                    Err(e) => tracing::warn!(error = %e, "ignoring malformed chat message"),
                }
            },
            Some(SocketMessageType::SetTypingPresence) => {
                match serde_json::from_value::<TypingPresence>(message.data) {
                    Ok(presence) => self.typing_roster = presence.users_typing,
                    Err(e) => tracing::warn!(error = %e, "ignoring malformed typing presence"),
                }
            },
            _ => tracing::debug!(kind = %message.kind, "ignoring message"),
        }
    }

    /// Create a new room as `nickname`.
    ///
    /// Ignored unless connected, outside a room, with a non-empty nickname and
    /// no other room request in flight.
    pub fn create_room(&mut self, nickname: impl Into<String>, avatar: AvatarRef) -> Vec<AppAction> {
        let nickname = nickname.into();
        if !self.can_request_room(&nickname) {
            return vec![];
        }

        self.session.nickname.clone_from(&nickname);
        self.session.avatar = avatar.clone();
        self.pending = Some(RoomOperation::Create);
        vec![AppAction::CreateRoom { nickname, avatar }, AppAction::Render]
    }

    /// Join room `room_id` as `nickname`.
    ///
    /// Same guards as [`App::create_room`], plus a non-empty room ID.
    pub fn join_room(
        &mut self,
        nickname: impl Into<String>,
        room_id: &str,
        avatar: AvatarRef,
    ) -> Vec<AppAction> {
        let nickname = nickname.into();
        let room_id = room_id.trim();
        if room_id.is_empty() || !self.can_request_room(&nickname) {
            return vec![];
        }

        self.session.nickname.clone_from(&nickname);
        self.session.avatar = avatar.clone();
        self.room_id_input = room_id.to_string();
        self.pending = Some(RoomOperation::Join);
        vec![
            AppAction::JoinRoom { nickname, room_id: room_id.to_string(), avatar },
            AppAction::Render,
        ]
    }

    /// Submit the lobby form in its current mode.
    pub fn submit_lobby(&mut self) -> Vec<AppAction> {
        let nickname = self.session.nickname.clone();
        let avatar = self.session.avatar.clone();
        match self.join_mode {
            JoinMode::Create => self.create_room(nickname, avatar),
            JoinMode::Join => {
                let room_id = self.room_id_input.clone();
                self.join_room(nickname, &room_id, avatar)
            },
        }
    }

    /// Whether [`App::submit_lobby`] would issue a request.
    pub fn can_submit(&self) -> bool {
        let room_ready = match self.join_mode {
            JoinMode::Create => true,
            JoinMode::Join => !self.room_id_input.trim().is_empty(),
        };
        room_ready && self.can_request_room(&self.session.nickname)
    }

    /// Leave the current room.
    ///
    /// Purely local: the chat service is not told. Clears the room, the
    /// nickname, the message list, and the typing roster.
    pub fn leave_room(&mut self) -> Vec<AppAction> {
        if let Some(room_id) = self.session.room_id.take() {
            tracing::info!(%room_id, "left room");
        }
        self.session.nickname.clear();
        self.session.joined = false;
        self.room_id_input.clear();
        self.messages.clear();
        self.typing_roster.clear();
        self.is_typing = false;
        vec![AppAction::Render]
    }

    /// Send a chat message stamped with `timestamp` (ms since the Unix epoch).
    ///
    /// Blank messages are dropped without any request. The typing burst
    /// ends once the bridge reports [`AppEvent::MessageSent`]; after a failed
    /// send it carries on.
    pub fn send_chat_message(&mut self, body: impl Into<String>, timestamp: u64) -> Vec<AppAction> {
        let body = body.into();
        if body.trim().is_empty() || !self.session.joined {
            return vec![];
        }

        vec![AppAction::SendChat { body, timestamp }, AppAction::Render]
    }

    /// Report a keystroke in the composer.
    ///
    /// Only the first keystroke of a burst produces a typing update; later
    /// ones are suppressed until a message is sent.
    pub fn notify_typing(&mut self) -> Vec<AppAction> {
        if self.is_typing || !self.session.joined {
            return vec![];
        }

        self.is_typing = true;
        vec![AppAction::SetTyping { typing: true }]
    }

    /// Quit the application.
    pub fn quit(&self) -> Vec<AppAction> {
        vec![AppAction::Quit]
    }

    /// Whether the lobby form is frozen by a room request in flight.
    ///
    /// The form setters below are no-ops while locked, so the identity the
    /// room was requested with is the one the room is entered with.
    pub fn is_form_locked(&self) -> bool {
        self.pending.is_some()
    }

    /// Set the lobby nickname.
    pub fn set_nickname(&mut self, nickname: impl Into<String>) {
        if !self.is_form_locked() {
            self.session.nickname = nickname.into();
        }
    }

    /// Set the lobby room ID field.
    pub fn set_room_id_input(&mut self, room_id: impl Into<String>) {
        if !self.is_form_locked() {
            self.room_id_input = room_id.into();
        }
    }

    /// Set the lobby mode.
    pub fn set_join_mode(&mut self, mode: JoinMode) {
        if !self.is_form_locked() {
            self.join_mode = mode;
        }
    }

    /// Switch between create and join.
    pub fn toggle_join_mode(&mut self) {
        self.set_join_mode(self.join_mode.toggled());
    }

    /// Use `avatar` for the next room request.
    pub fn set_avatar(&mut self, avatar: AvatarRef) {
        if !self.is_form_locked() {
            self.session.avatar = avatar;
        }
    }

    /// Go back to the default avatar.
    pub fn reset_avatar(&mut self) {
        self.set_avatar(AvatarRef::default());
    }

    /// Select the next built-in avatar. A custom avatar moves to the first.
    pub fn next_avatar(&mut self) {
        let next = self.session.avatar.builtin_index().map_or(0, |index| index + 1);
        self.set_avatar(AvatarRef::builtin(next));
    }

    /// Select the previous built-in avatar. A custom avatar moves to the last.
    pub fn previous_avatar(&mut self) {
        let count = DEFAULT_AVATARS.len();
        let previous =
            self.session.avatar.builtin_index().map_or(count - 1, |index| index + count - 1);
        self.set_avatar(AvatarRef::builtin(previous));
    }

    /// Show a notice.
    pub fn set_notice(&mut self, notice: Notice) {
        self.notice = Some(notice);
    }

    /// Dismiss the current notice.
    pub fn clear_notice(&mut self) {
        self.notice = None;
    }

    /// Session record.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Current connection state.
    pub fn connection_state(&self) -> ConnectionState {
        self.session.connection
    }

    /// Screen to show for the current state.
    pub fn screen(&self) -> Screen {
        match (self.session.connection, self.session.joined) {
            (ConnectionState::Disconnected, _) => Screen::Disconnected,
            (ConnectionState::Connected, false) => Screen::Lobby,
            (ConnectionState::Connected, true) => Screen::Room,
        }
    }

    /// Room messages in arrival order.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Nicknames currently typing.
    pub fn typing_roster(&self) -> &[String] {
        &self.typing_roster
    }

    /// Whether the local user's typing presence is on.
    pub fn is_typing(&self) -> bool {
        self.is_typing
    }

    /// Room request in flight. `None` if idle.
    pub fn pending(&self) -> Option<RoomOperation> {
        self.pending
    }

    /// Lobby form mode.
    pub fn join_mode(&self) -> JoinMode {
        self.join_mode
    }

    /// Lobby room ID field.
    pub fn room_id_input(&self) -> &str {
        &self.room_id_input
    }

    /// Terminal dimensions (columns, rows).
    pub fn terminal_size(&self) -> (u16, u16) {
        self.terminal_size
    }

    /// Latest notice. `None` if nothing to show.
    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    fn can_request_room(&self, nickname: &str) -> bool {
        self.session.connection == ConnectionState::Connected
            && !self.session.joined
            && self.pending.is_none()
            && !nickname.trim().is_empty()
    }

    fn enter_room(&mut self, room_id: String, messages: Vec<ChatMessage>) {
        self.room_id_input.clone_from(&room_id);
        self.session.room_id = Some(room_id);
        self.session.joined = true;
        self.messages = messages;
        self.typing_roster.clear();
        self.is_typing = false;
    }
}

impl SocketEventHandler for App {
    fn on_message(&mut self, message: SocketMessage) {
        // Also accepted while a room request is in flight; its completion
        // decides what survives
        if self.session.joined || self.pending.is_some() {
            self.dispatch_incoming(message);
        } else {
            tracing::debug!(kind = %message.kind, "ignoring message outside a room");
        }
    }

    fn on_close(&mut self) {
        tracing::warn!("connection closed");
        self.session.connection = ConnectionState::Disconnected;
        self.messages.clear();
        self.typing_roster.clear();
        self.is_typing = false;
        self.notice = Some(Notice::error(NOTICE_CONNECTION_LOST));
    }

    fn on_error(&mut self, message: String) {
        tracing::warn!(%message, "connection error");
        self.notice = Some(Notice::error(format!("Error: {message}")));
    }

    fn on_connection_ready(&mut self) {
        tracing::info!("connection ready");
        self.session.connection = ConnectionState::Connected;
        self.notice = Some(Notice::success(NOTICE_CONNECTED));
    }
}
