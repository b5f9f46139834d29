//! Chat client that records every outbound request.
//!
//! `RecordingClient` answers room requests from configured results and keeps
//! every `send_message` call, so tests can drive the [`partyline_app::Bridge`]
//! without a chat service and assert on exactly what would have gone out.

use std::{
    future::Future,
    sync::{Arc, Mutex, PoisonError},
};

use partyline_client::{AvatarRef, ChatClient, ClientError, RoomId, SocketMessageType};
use serde_json::{Value, json};

/// A room request as the client received it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomRequest {
    /// `create_chat_room` call.
    Create {
        /// Nickname presented.
        nickname: String,
        /// Avatar presented.
        icon: AvatarRef,
    },
    /// `join_chat_room` call.
    Join {
        /// Nickname presented.
        nickname: String,
        /// Room requested.
        room_id: RoomId,
        /// Avatar presented.
        icon: AvatarRef,
    },
}

#[derive(Debug)]
struct Recorded {
    rooms: Vec<RoomRequest>,
    sent: Vec<(SocketMessageType, Value)>,
    create_result: Result<RoomId, ClientError>,
    join_result: Result<Value, ClientError>,
    fail_sends: bool,
}

/// Recording [`ChatClient`].
///
/// Clones share the same record.
#[derive(Debug, Clone)]
pub struct RecordingClient {
    inner: Arc<Mutex<Recorded>>,
}

impl Default for RecordingClient {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingClient {
    /// Client that creates room `R1` and joins any room with empty history.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Recorded {
                rooms: Vec::new(),
                sent: Vec::new(),
                create_result: Ok("R1".to_string()),
                join_result: Ok(json!({ "messages": [] })),
                fail_sends: false,
            })),
        }
    }

    /// Answer `create_chat_room` with `result`.
    #[must_use]
    pub fn with_create_result(self, result: Result<RoomId, ClientError>) -> Self {
        self.lock().create_result = result;
        self
    }

    /// Answer `join_chat_room` with `result`.
    #[must_use]
    pub fn with_join_result(self, result: Result<Value, ClientError>) -> Self {
        self.lock().join_result = result;
        self
    }

    /// Fail every `send_message` call as if the connection were gone.
    #[must_use]
    pub fn failing_sends(self) -> Self {
        self.lock().fail_sends = true;
        self
    }

    /// Room requests received, in order.
    pub fn room_requests(&self) -> Vec<RoomRequest> {
        self.lock().rooms.clone()
    }

    /// Messages sent, in order.
    pub fn sent(&self) -> Vec<(SocketMessageType, Value)> {
        self.lock().sent.clone()
    }

    /// Take all messages sent so far.
    pub fn take_sent(&self) -> Vec<(SocketMessageType, Value)> {
        std::mem::take(&mut self.lock().sent)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Recorded> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ChatClient for RecordingClient {
    fn create_chat_room(
        &self,
        nickname: &str,
        icon: &AvatarRef,
    ) -> impl Future<Output = Result<RoomId, ClientError>> + Send {
        let result = {
            let mut recorded = self.lock();
            recorded
                .rooms
                .push(RoomRequest::Create { nickname: nickname.to_string(), icon: icon.clone() });
            recorded.create_result.clone()
        };
        async move { result }
    }

    fn join_chat_room(
        &self,
        nickname: &str,
        room_id: &str,
        icon: &AvatarRef,
    ) -> impl Future<Output = Result<Value, ClientError>> + Send {
        let result = {
            let mut recorded = self.lock();
            recorded.rooms.push(RoomRequest::Join {
                nickname: nickname.to_string(),
                room_id: room_id.to_string(),
                icon: icon.clone(),
            });
            recorded.join_result.clone()
        };
        async move { result }
    }

    fn send_message(&self, kind: SocketMessageType, payload: Value) -> Result<(), ClientError> {
        let mut recorded = self.lock();
        if recorded.fail_sends {
            return Err(ClientError::Disconnected);
        }
        recorded.sent.push((kind, payload));
        Ok(())
    }
}
