//! Wire payloads exchanged with the chat service.
//!
//! Field names follow the service's camelCase JSON. Optional fields are
//! omitted when absent and tolerated when missing.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::AvatarRef;

/// Opaque room identifier issued by the chat service.
pub type RoomId = String;

/// A chat message as delivered by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    /// Service-generated notice (joins, departures). Rendered without sender.
    #[serde(default)]
    pub is_system_message: bool,
    /// Sender's avatar.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_icon: Option<AvatarRef>,
    /// Sender's nickname.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_nickname: Option<String>,
    /// Message text.
    pub body: String,
    /// Stable sender ID.
    pub perm_id: String,
    /// Send time in milliseconds since the Unix epoch.
    pub timestamp: u64,
    /// Service-assigned message ID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
}

/// Room history returned when joining a room.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageList {
    /// Messages in arrival order.
    pub messages: Vec<ChatMessage>,
}

impl MessageList {
    /// Decode a join response, treating anything malformed as empty history.
    pub fn from_response(response: &Value) -> Self {
        let Some(messages) = response.get("messages").filter(|m| m.is_array()) else {
            tracing::debug!("join response carries no message list");
            return Self::default();
        };

        match serde_json::from_value(messages.clone()) {
            Ok(messages) => Self { messages },
            Err(e) => {
                tracing::warn!(error = %e, "discarding malformed room history");
                Self::default()
            },
        }
    }
}

/// Typing presence for a room.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingPresence {
    /// Whether at least one member is composing.
    #[serde(default)]
    pub anyone_typing: bool,
    /// Nicknames of members currently composing.
    #[serde(default)]
    pub users_typing: Vec<String>,
}

/// Outbound chat body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatBody {
    /// Message text.
    pub body: String,
    /// Client-side send time in milliseconds since the Unix epoch.
    pub timestamp: u64,
}

/// Outbound typing presence update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypingUpdate {
    /// Whether the local user is composing.
    pub typing: bool,
}

/// Message kinds understood by the chat service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SocketMessageType {
    /// Create a session (room).
    CreateSession,
    /// Join a session (room).
    JoinSession,
    /// Chat message.
    SendMessage,
    /// Typing presence.
    SetTypingPresence,
}

impl SocketMessageType {
    /// Wire name of this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CreateSession => "createSession",
            Self::JoinSession => "joinSession",
            Self::SendMessage => "sendMessage",
            Self::SetTypingPresence => "setTypingPresence",
        }
    }

    /// Parse a wire name. `None` for kinds this client does not know.
    pub fn from_wire(name: &str) -> Option<Self> {
        match name {
            "createSession" => Some(Self::CreateSession),
            "joinSession" => Some(Self::JoinSession),
            "sendMessage" => Some(Self::SendMessage),
            "setTypingPresence" => Some(Self::SetTypingPresence),
            _ => None,
        }
    }
}

/// A typed notification from the chat service.
///
/// The kind stays a raw string so that unknown kinds survive decoding and can
/// be ignored by the receiver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocketMessage {
    /// Wire name of the message kind.
    #[serde(rename = "type")]
    pub kind: String,
    /// Kind-specific payload.
    #[serde(default)]
    pub data: Value,
}

impl SocketMessage {
    /// Build a message of a known kind from a serializable payload.
    pub fn new<T: Serialize>(
        kind: SocketMessageType,
        data: &T,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self { kind: kind.as_str().to_string(), data: serde_json::to_value(data)? })
    }

    /// Known kind of this message. `None` if unrecognized.
    pub fn message_type(&self) -> Option<SocketMessageType> {
        SocketMessageType::from_wire(&self.kind)
    }
}
