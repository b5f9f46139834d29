//! Application input events.
//!
//! This module defines [`AppEvent`], the set of inputs that drive the
//! [`crate::App`] state machine.
//!
//! Events originate from three sources:
//! - The terminal (resize) and system ticks.
//! - The chat service connection ([`SocketEvent`]).
//! - Completion of room requests started by the [`crate::Bridge`].

use partyline_client::{RoomId, SocketEvent};
use serde_json::Value;

use crate::RoomOperation;

/// Events processed by the App state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// Periodic tick.
    Tick,

    /// Terminal resize (columns, rows).
    Resize(u16, u16),

    /// Notification from the chat service connection.
    Socket(SocketEvent),

    /// Room creation succeeded.
    RoomCreated {
        /// ID issued for the new room.
        room_id: RoomId,
    },

    /// Room join succeeded.
    RoomJoined {
        /// Joined room.
        room_id: RoomId,
        /// Raw join response carrying the room history.
        history: Value,
    },

    /// Room creation or join was rejected.
    RoomOperationFailed {
        /// Which request failed.
        operation: RoomOperation,
        /// Error description.
        reason: String,
    },

    /// A chat message and the typing=false update that follows it went out.
    MessageSent,

    /// An outbound chat message or typing update could not be sent.
    SendFailed {
        /// Error description.
        reason: String,
    },
}
