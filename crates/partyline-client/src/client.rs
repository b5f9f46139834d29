//! Request surface of the chat service.

use std::future::Future;

use serde_json::Value;

use crate::{AvatarRef, ClientError, RoomId, SocketMessageType};

/// Outbound requests to the chat service.
///
/// Room operations are asynchronous and resolve once the service answers.
/// Sending is fire-and-forget: it fails only if the request cannot be handed
/// to the connection. Problems detected later by the service arrive as
/// [`crate::SocketEvent::Error`].
///
/// Implementations are cheap handles; clones share the same connection.
pub trait ChatClient: Clone + Send + Sync + 'static {
    /// Create a room and join it. Resolves to the new room's ID.
    fn create_chat_room(
        &self,
        nickname: &str,
        icon: &AvatarRef,
    ) -> impl Future<Output = Result<RoomId, ClientError>> + Send;

    /// Join an existing room.
    ///
    /// Resolves to the raw join response, which normally carries the room
    /// history as `{"messages": [...]}`.
    fn join_chat_room(
        &self,
        nickname: &str,
        room_id: &str,
        icon: &AvatarRef,
    ) -> impl Future<Output = Result<Value, ClientError>> + Send;

    /// Send a message of the given kind to the current room.
    fn send_message(&self, kind: SocketMessageType, payload: Value) -> Result<(), ClientError>;
}
