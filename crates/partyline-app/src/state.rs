//! Observable session state types.
//!
//! These structures are the "View Model" of the front-end: what the
//! renderer needs to draw the lobby and the room, with none of the
//! connection plumbing.

use partyline_client::{AvatarRef, RoomId};

/// Connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Not connected. Initial state, and terminal after the connection closes.
    Disconnected,
    /// Connection ready for room requests.
    Connected,
}

/// Local record of connection, room, and identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Connection state.
    pub connection: ConnectionState,
    /// Current room. `None` outside a room.
    pub room_id: Option<RoomId>,
    /// Local nickname.
    pub nickname: String,
    /// Local avatar.
    pub avatar: AvatarRef,
    /// Whether a create or join has completed.
    pub joined: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            connection: ConnectionState::Disconnected,
            room_id: None,
            nickname: String::new(),
            avatar: AvatarRef::default(),
            joined: false,
        }
    }
}

/// Which screen the front-end shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Waiting for the connection, or the connection is gone.
    Disconnected,
    /// Avatar, nickname, and room form.
    Lobby,
    /// Message list and composer.
    Room,
}

/// Whether the lobby form creates a new room or joins an existing one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JoinMode {
    /// Create a new room.
    #[default]
    Create,
    /// Join a room by ID.
    Join,
}

impl JoinMode {
    /// The other mode.
    pub fn toggled(self) -> Self {
        match self {
            Self::Create => Self::Join,
            Self::Join => Self::Create,
        }
    }
}

/// Asynchronous room request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomOperation {
    /// Room creation.
    Create,
    /// Room join.
    Join,
}

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    /// Operation succeeded.
    Success,
    /// Operation failed.
    Error,
}

/// Transient user-visible message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Severity.
    pub level: NoticeLevel,
    /// Display text.
    pub text: String,
}

impl Notice {
    /// Success notice.
    pub fn success(text: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Success, text: text.into() }
    }

    /// Error notice.
    pub fn error(text: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, text: text.into() }
    }
}
