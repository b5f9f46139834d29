//! In-process chat service.
//!
//! Runs the room service as a tokio task. Clients talk to it over mpsc
//! channels, so several [`LocalClient`]s in one process can share rooms
//! without any network.
//!
//! # Behaviour
//!
//! - A new connection receives [`SocketEvent::ConnectionReady`] first.
//! - Creating a room issues a random 8-character ID and moves the creator in.
//! - Joining appends a "joined the party" system message to the history,
//!   notifies the members already present, and returns the full history.
//! - Chat messages are echoed to every member, sender included.
//! - Typing presence is broadcast to every member whenever it changes.
//! - Requests that cannot be served after a send (no room, bad payload) come
//!   back as [`SocketEvent::Error`] on the sender's connection.
//! - [`LocalServer::shutdown`] sends [`SocketEvent::Close`] to everyone.

use std::{
    collections::HashMap,
    future::Future,
    time::{SystemTime, UNIX_EPOCH},
};

use rand::{Rng, distr::Alphanumeric};
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};

use crate::{
    AvatarRef, ChatBody, ChatClient, ChatMessage, ClientError, MessageList, RoomId, SocketEvent,
    SocketMessage, SocketMessageType, TypingPresence, TypingUpdate,
};

const ROOM_ID_LEN: usize = 8;
const PERM_ID_LEN: usize = 12;

/// Requests from clients to the service task.
enum Request {
    Connect {
        perm_id: String,
        events: mpsc::UnboundedSender<SocketEvent>,
    },
    CreateRoom {
        perm_id: String,
        nickname: String,
        icon: AvatarRef,
        reply: oneshot::Sender<Result<RoomId, ClientError>>,
    },
    JoinRoom {
        perm_id: String,
        nickname: String,
        room_id: RoomId,
        icon: AvatarRef,
        reply: oneshot::Sender<Result<Vec<ChatMessage>, ClientError>>,
    },
    Send {
        perm_id: String,
        kind: SocketMessageType,
        payload: Value,
    },
    Shutdown,
}

/// Handle to a running in-process chat service.
#[derive(Debug)]
pub struct LocalServer {
    requests: mpsc::UnboundedSender<Request>,
    abort_handle: tokio::task::AbortHandle,
}

impl LocalServer {
    /// Spawn the service on the current tokio runtime.
    pub fn spawn() -> Self {
        let (requests, inbox) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run(inbox));
        Self { requests, abort_handle: handle.abort_handle() }
    }

    /// Open a connection.
    ///
    /// Returns the request handle and the connection's event receiver. The
    /// receiver is the connection's only subscription; it yields
    /// [`SocketEvent::ConnectionReady`] once the service accepts the
    /// connection, or [`SocketEvent::Close`] if the service is gone.
    pub fn connect(&self) -> (LocalClient, mpsc::UnboundedReceiver<SocketEvent>) {
        let perm_id = random_id(PERM_ID_LEN);
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let notify = events_tx.clone();

        let request = Request::Connect { perm_id: perm_id.clone(), events: events_tx };
        if self.requests.send(request).is_err() {
            tracing::warn!("local chat service is not running");
            let _ = notify.send(SocketEvent::Close);
        }

        let client = LocalClient { perm_id, requests: self.requests.clone() };
        (client, events_rx)
    }

    /// Close every connection and stop the service.
    pub fn shutdown(&self) {
        if self.requests.send(Request::Shutdown).is_err() {
            tracing::debug!("local chat service already stopped");
        }
    }

    /// Stop the service immediately. Connections see their event channel
    /// close without a [`SocketEvent::Close`].
    pub fn stop(&self) {
        self.abort_handle.abort();
    }
}

/// Client handle for a [`LocalServer`] connection.
#[derive(Debug, Clone)]
pub struct LocalClient {
    perm_id: String,
    requests: mpsc::UnboundedSender<Request>,
}

impl LocalClient {
    /// Stable sender ID of this connection.
    pub fn perm_id(&self) -> &str {
        &self.perm_id
    }
}

impl ChatClient for LocalClient {
    fn create_chat_room(
        &self,
        nickname: &str,
        icon: &AvatarRef,
    ) -> impl Future<Output = Result<RoomId, ClientError>> + Send {
        let (reply, response) = oneshot::channel();
        let sent = self
            .requests
            .send(Request::CreateRoom {
                perm_id: self.perm_id.clone(),
                nickname: nickname.to_string(),
                icon: icon.clone(),
                reply,
            })
            .map_err(|_| ClientError::Disconnected);

        async move {
            sent?;
            response.await.map_err(|_| ClientError::Disconnected)?
        }
    }

    fn join_chat_room(
        &self,
        nickname: &str,
        room_id: &str,
        icon: &AvatarRef,
    ) -> impl Future<Output = Result<Value, ClientError>> + Send {
        let (reply, response) = oneshot::channel();
        let sent = self
            .requests
            .send(Request::JoinRoom {
                perm_id: self.perm_id.clone(),
                nickname: nickname.to_string(),
                room_id: room_id.to_string(),
                icon: icon.clone(),
                reply,
            })
            .map_err(|_| ClientError::Disconnected);

        async move {
            sent?;
            let messages = response.await.map_err(|_| ClientError::Disconnected)??;
            Ok(serde_json::to_value(MessageList { messages })?)
        }
    }

    fn send_message(&self, kind: SocketMessageType, payload: Value) -> Result<(), ClientError> {
        self.requests
            .send(Request::Send { perm_id: self.perm_id.clone(), kind, payload })
            .map_err(|_| ClientError::Disconnected)
    }
}

/// Service task loop.
async fn run(mut inbox: mpsc::UnboundedReceiver<Request>) {
    let mut state = ServerState::default();

    while let Some(request) = inbox.recv().await {
        if !state.handle(request) {
            break;
        }
    }

    tracing::info!("local chat service stopped");
}

/// A connected client as seen by the service.
struct Connection {
    events: mpsc::UnboundedSender<SocketEvent>,
    room: Option<RoomId>,
    nickname: String,
    icon: AvatarRef,
}

/// A room and its history.
#[derive(Default)]
struct Room {
    /// Member perm IDs in join order.
    members: Vec<String>,
    history: Vec<ChatMessage>,
    /// Perm IDs of members currently typing, in the order they started.
    typing: Vec<String>,
}

#[derive(Default)]
struct ServerState {
    connections: HashMap<String, Connection>,
    rooms: HashMap<RoomId, Room>,
    next_message_id: u64,
}

impl ServerState {
    /// Process one request. Returns `false` once the service should stop.
    fn handle(&mut self, request: Request) -> bool {
        match request {
            Request::Connect { perm_id, events } => {
                if events.send(SocketEvent::ConnectionReady).is_ok() {
                    tracing::debug!(%perm_id, "connection accepted");
                    self.connections.insert(perm_id, Connection {
                        events,
                        room: None,
                        nickname: String::new(),
                        icon: AvatarRef::default(),
                    });
                }
            },
            Request::CreateRoom { perm_id, nickname, icon, reply } => {
                let result = self.create_room(&perm_id, nickname, icon);
                let _ = reply.send(result);
            },
            Request::JoinRoom { perm_id, nickname, room_id, icon, reply } => {
                let result = self.join_room(&perm_id, nickname, &room_id, icon);
                let _ = reply.send(result);
            },
            Request::Send { perm_id, kind, payload } => self.send(&perm_id, kind, payload),
            Request::Shutdown => {
                for connection in self.connections.values() {
                    let _ = connection.events.send(SocketEvent::Close);
                }
                self.connections.clear();
                return false;
            },
        }
        true
    }

    fn create_room(
        &mut self,
        perm_id: &str,
        nickname: String,
        icon: AvatarRef,
    ) -> Result<RoomId, ClientError> {
        self.identify(perm_id, nickname, icon)?;

        let room_id = loop {
            let candidate = random_id(ROOM_ID_LEN);
            if !self.rooms.contains_key(&candidate) {
                break candidate;
            }
        };
        self.rooms.insert(room_id.clone(), Room::default());
        self.enter_room(perm_id, &room_id);

        tracing::info!(%room_id, %perm_id, "room created");
        Ok(room_id)
    }

    fn join_room(
        &mut self,
        perm_id: &str,
        nickname: String,
        room_id: &str,
        icon: AvatarRef,
    ) -> Result<Vec<ChatMessage>, ClientError> {
        if !self.rooms.contains_key(room_id) {
            return Err(ClientError::RoomNotFound(room_id.to_string()));
        }
        self.identify(perm_id, nickname.clone(), icon)?;
        self.enter_room(perm_id, room_id);

        let notice = ChatMessage {
            is_system_message: true,
            user_icon: None,
            user_nickname: None,
            body: format!("{nickname} joined the party"),
            perm_id: perm_id.to_string(),
            timestamp: now_millis(),
            message_id: Some(self.next_message_id()),
        };
        self.append(room_id, &notice, Some(perm_id));

        tracing::info!(%room_id, %perm_id, "room joined");
        Ok(self.rooms.get(room_id).map(|room| room.history.clone()).unwrap_or_default())
    }

    fn send(&mut self, perm_id: &str, kind: SocketMessageType, payload: Value) {
        let Some(connection) = self.connections.get(perm_id) else {
            return;
        };
        let Some(room_id) = connection.room.clone() else {
            self.notify(perm_id, SocketEvent::Error("join a room before sending messages".into()));
            return;
        };
        let (nickname, icon) = (connection.nickname.clone(), connection.icon.clone());

        match kind {
            SocketMessageType::SendMessage => match serde_json::from_value::<ChatBody>(payload) {
                Ok(chat) => {
                    let message = ChatMessage {
                        is_system_message: false,
                        user_icon: Some(icon),
                        user_nickname: Some(nickname),
                        body: chat.body,
                        perm_id: perm_id.to_string(),
                        timestamp: chat.timestamp,
                        message_id: Some(self.next_message_id()),
                    };
                    self.append(&room_id, &message, None);
                },
                Err(e) => {
                    self.notify(perm_id, SocketEvent::Error(format!("malformed chat message: {e}")));
                },
            },
            SocketMessageType::SetTypingPresence => {
                match serde_json::from_value::<TypingUpdate>(payload) {
                    Ok(update) => self.set_typing(&room_id, perm_id, update.typing),
                    Err(e) => self.notify(
                        perm_id,
                        SocketEvent::Error(format!("malformed typing update: {e}")),
                    ),
                }
            },
            SocketMessageType::CreateSession | SocketMessageType::JoinSession => {
                self.notify(
                    perm_id,
                    SocketEvent::Error(format!("unsupported message type {}", kind.as_str())),
                );
            },
        }
    }

    /// Record the identity a connection presents with a room request.
    fn identify(
        &mut self,
        perm_id: &str,
        nickname: String,
        icon: AvatarRef,
    ) -> Result<(), ClientError> {
        if nickname.trim().is_empty() {
            return Err(ClientError::InvalidRequest("nickname is required".into()));
        }
        let connection = self.connections.get_mut(perm_id).ok_or(ClientError::Disconnected)?;
        connection.nickname = nickname;
        connection.icon = icon;
        Ok(())
    }

    /// Move a connection into `room_id`, leaving its previous room.
    fn enter_room(&mut self, perm_id: &str, room_id: &str) {
        let previous = self.connections.get_mut(perm_id).and_then(|c| c.room.take());
        if let Some(previous) = previous {
            self.leave_room(perm_id, &previous);
        }

        if let Some(room) = self.rooms.get_mut(room_id) {
            room.members.push(perm_id.to_string());
        }
        if let Some(connection) = self.connections.get_mut(perm_id) {
            connection.room = Some(room_id.to_string());
        }
    }

    fn leave_room(&mut self, perm_id: &str, room_id: &str) {
        let was_typing = match self.rooms.get_mut(room_id) {
            Some(room) => {
                room.members.retain(|member| member != perm_id);
                let before = room.typing.len();
                room.typing.retain(|member| member != perm_id);
                room.typing.len() != before
            },
            None => false,
        };

        if was_typing {
            self.broadcast_presence(room_id);
        }
    }

    fn set_typing(&mut self, room_id: &str, perm_id: &str, typing: bool) {
        let Some(room) = self.rooms.get_mut(room_id) else {
            return;
        };

        let listed = room.typing.iter().any(|member| member == perm_id);
        match (typing, listed) {
            (true, false) => room.typing.push(perm_id.to_string()),
            (false, true) => room.typing.retain(|member| member != perm_id),
            _ => return,
        }

        self.broadcast_presence(room_id);
    }

    fn broadcast_presence(&mut self, room_id: &str) {
        let Some(room) = self.rooms.get(room_id) else {
            return;
        };

        let users_typing: Vec<String> = room
            .typing
            .iter()
            .filter_map(|member| self.connections.get(member))
            .map(|connection| connection.nickname.clone())
            .collect();
        let presence = TypingPresence { anyone_typing: !users_typing.is_empty(), users_typing };

        match SocketMessage::new(SocketMessageType::SetTypingPresence, &presence) {
            Ok(message) => self.broadcast(room_id, &message, None),
            Err(e) => tracing::warn!(error = %e, "failed to encode typing presence"),
        }
    }

    /// Append a message to a room's history and deliver it to its members.
    fn append(&mut self, room_id: &str, message: &ChatMessage, skip: Option<&str>) {
        let Some(room) = self.rooms.get_mut(room_id) else {
            return;
        };
        room.history.push(message.clone());

        match SocketMessage::new(SocketMessageType::SendMessage, message) {
            Ok(message) => self.broadcast(room_id, &message, skip),
            Err(e) => tracing::warn!(error = %e, "failed to encode chat message"),
        }
    }

    /// Deliver a message to every member of a room except `skip`.
    ///
    /// Members whose event receiver is gone are dropped from the service.
    fn broadcast(&mut self, room_id: &str, message: &SocketMessage, skip: Option<&str>) {
        let Some(room) = self.rooms.get(room_id) else {
            return;
        };

        let mut gone = Vec::new();
        for member in room.members.iter().filter(|member| Some(member.as_str()) != skip) {
            let delivered = self
                .connections
                .get(member)
                .is_some_and(|c| c.events.send(SocketEvent::Message(message.clone())).is_ok());
            if !delivered {
                gone.push(member.clone());
            }
        }

        for perm_id in gone {
            tracing::debug!(%perm_id, "dropping closed connection");
            self.connections.remove(&perm_id);
            if let Some(room) = self.rooms.get_mut(room_id) {
                room.members.retain(|member| *member != perm_id);
                room.typing.retain(|member| *member != perm_id);
            }
        }
    }

    fn notify(&self, perm_id: &str, event: SocketEvent) {
        if let Some(connection) = self.connections.get(perm_id) {
            let _ = connection.events.send(event);
        }
    }

    fn next_message_id(&mut self) -> String {
        self.next_message_id += 1;
        format!("m{}", self.next_message_id)
    }
}

fn random_id(len: usize) -> String {
    rand::rng().sample_iter(Alphanumeric).take(len).map(char::from).collect()
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or_default()
}
