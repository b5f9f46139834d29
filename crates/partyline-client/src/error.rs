//! Client error types.

use thiserror::Error;

use crate::RoomId;

/// Errors returned by [`crate::ChatClient`] requests.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Connection to the chat service is gone.
    #[error("not connected to the chat service")]
    Disconnected,

    /// No room exists with the requested ID.
    #[error("room {0} does not exist")]
    RoomNotFound(RoomId),

    /// Request was rejected before reaching a room.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Payload could not be encoded for the wire.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
