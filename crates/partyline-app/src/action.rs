//! Application side-effects and intents.
//!
//! This module defines the [`AppAction`] enum, which represents instructions
//! produced by the [`crate::App`] state machine for the runtime to execute.

use partyline_client::{AvatarRef, RoomId};

/// Actions produced by the App state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    /// Render the UI.
    Render,

    /// Quit the application.
    Quit,

    /// Create a new room.
    CreateRoom {
        /// Nickname to present.
        nickname: String,
        /// Avatar to present.
        avatar: AvatarRef,
    },

    /// Join an existing room.
    JoinRoom {
        /// Nickname to present.
        nickname: String,
        /// Room to join.
        room_id: RoomId,
        /// Avatar to present.
        avatar: AvatarRef,
    },

    /// Send a chat message, then clear typing presence.
    SendChat {
        /// Message text.
        body: String,
        /// Client-side send time in milliseconds since the Unix epoch.
        timestamp: u64,
    },

    /// Update typing presence.
    SetTyping {
        /// Whether the local user is composing.
        typing: bool,
    },
}
