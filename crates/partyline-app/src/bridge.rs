//! Action-to-client translation layer.
//!
//! The [`Bridge`] wraps a [`ChatClient`] and executes the App's outbound
//! intents against it.
//!
//! # Responsibilities
//!
//! - Runs room requests as background tasks and reports their outcome as
//!   [`AppEvent`]s on the completion channel, so the event loop keeps running
//!   while a request is pending.
//! - Sends chat messages and typing updates immediately, converting failures
//!   into [`AppEvent::SendFailed`].
//! - Nothing is retried or queued.

use std::future::Future;

use partyline_client::{ChatBody, ChatClient, ClientError, SocketMessageType, TypingUpdate};
use serde::Serialize;
use tokio::sync::mpsc;

use crate::{AppAction, AppEvent, RoomOperation};

/// Bridge between the App and the chat client.
pub struct Bridge<C: ChatClient> {
    client: C,
    completions: mpsc::UnboundedSender<AppEvent>,
}

impl<C: ChatClient> Bridge<C> {
    /// Create a bridge over `client`.
    ///
    /// Returns the receiver on which room request outcomes are delivered.
    pub fn new(client: C) -> (Self, mpsc::UnboundedReceiver<AppEvent>) {
        let (completions, receiver) = mpsc::unbounded_channel();
        (Self { client, completions }, receiver)
    }

    /// Underlying client.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Execute an App action and return events that result immediately.
    ///
    /// Room requests must run inside a tokio runtime; their outcome arrives
    /// later on the completion channel.
    pub fn process_app_action(&mut self, action: AppAction) -> Vec<AppEvent> {
        match action {
            AppAction::CreateRoom { nickname, avatar } => {
                let client = self.client.clone();
                self.spawn_request(async move {
                    match client.create_chat_room(&nickname, &avatar).await {
                        Ok(room_id) => AppEvent::RoomCreated { room_id },
                        Err(e) => AppEvent::RoomOperationFailed {
                            operation: RoomOperation::Create,
                            reason: e.to_string(),
                        },
                    }
                });
                vec![]
            },
            AppAction::JoinRoom { nickname, room_id, avatar } => {
                let client = self.client.clone();
                self.spawn_request(async move {
                    match client.join_chat_room(&nickname, &room_id, &avatar).await {
                        Ok(history) => AppEvent::RoomJoined { room_id, history },
                        Err(e) => AppEvent::RoomOperationFailed {
                            operation: RoomOperation::Join,
                            reason: e.to_string(),
                        },
                    }
                });
                vec![]
            },
            AppAction::SendChat { body, timestamp } => {
                let result = self
                    .send(SocketMessageType::SendMessage, &ChatBody { body, timestamp })
                    .and_then(|()| {
                        self.send(SocketMessageType::SetTypingPresence, &TypingUpdate {
                            typing: false,
                        })
                    });
                match result {
                    Ok(()) => vec![AppEvent::MessageSent],
                    Err(e) => vec![AppEvent::SendFailed { reason: e.to_string() }],
                }
            },
            AppAction::SetTyping { typing } => {
                let result =
                    self.send(SocketMessageType::SetTypingPresence, &TypingUpdate { typing });
                Self::send_result(result)
            },
            AppAction::Render | AppAction::Quit => vec![],
        }
    }

    fn send<T: Serialize>(&self, kind: SocketMessageType, payload: &T) -> Result<(), ClientError> {
        let payload = serde_json::to_value(payload)?;
        self.client.send_message(kind, payload)
    }

    fn send_result(result: Result<(), ClientError>) -> Vec<AppEvent> {
        match result {
            Ok(()) => vec![],
            Err(e) => vec![AppEvent::SendFailed { reason: e.to_string() }],
        }
    }

    fn spawn_request<F>(&self, request: F)
    where
        F: Future<Output = AppEvent> + Send + 'static,
    {
        let completions = self.completions.clone();
        tokio::spawn(async move {
            let event = request.await;
            if completions.send(event).is_err() {
                tracing::debug!("room request finished after shutdown");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use std::{
        future::Future,
        sync::{Arc, Mutex},
    };

    use partyline_client::{AvatarRef, RoomId};
    use serde_json::{Value, json};

    use super::*;

    /// Client that records sends and answers room requests from fixed results.
    #[derive(Clone, Default)]
    struct StubClient {
        sent: Arc<Mutex<Vec<(SocketMessageType, Value)>>>,
        fail_sends: bool,
        fail_rooms: bool,
    }

    impl StubClient {
        fn sent(&self) -> Vec<(SocketMessageType, Value)> {
            self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
        }
    }

    impl ChatClient for StubClient {
        fn create_chat_room(
            &self,
            _nickname: &str,
            _icon: &AvatarRef,
        ) -> impl Future<Output = Result<RoomId, ClientError>> + Send {
            let fail = self.fail_rooms;
            async move { if fail { Err(ClientError::Disconnected) } else { Ok("R1".to_string()) } }
        }

        fn join_chat_room(
            &self,
            _nickname: &str,
            room_id: &str,
            _icon: &AvatarRef,
        ) -> impl Future<Output = Result<Value, ClientError>> + Send {
            let result = if self.fail_rooms {
                Err(ClientError::RoomNotFound(room_id.to_string()))
            } else {
                Ok(json!({ "messages": [] }))
            };
            async move { result }
        }

        fn send_message(&self, kind: SocketMessageType, payload: Value) -> Result<(), ClientError> {
            if self.fail_sends {
                return Err(ClientError::Disconnected);
            }
            if let Ok(mut sent) = self.sent.lock() {
                sent.push((kind, payload));
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn create_room_reports_completion() {
        let (mut bridge, mut completions) = Bridge::new(StubClient::default());
        let events = bridge.process_app_action(AppAction::CreateRoom {
            nickname: "Ann".into(),
            avatar: AvatarRef::default(),
        });

        assert!(events.is_empty());
        assert_eq!(completions.recv().await, Some(AppEvent::RoomCreated { room_id: "R1".into() }));
    }

    #[tokio::test]
    async fn failed_join_reports_operation() {
        let client = StubClient { fail_rooms: true, ..StubClient::default() };
        let (mut bridge, mut completions) = Bridge::new(client);
        let _ = bridge.process_app_action(AppAction::JoinRoom {
            nickname: "Bob".into(),
            room_id: "nope".into(),
            avatar: AvatarRef::default(),
        });

        assert!(matches!(
            completions.recv().await,
            Some(AppEvent::RoomOperationFailed { operation: RoomOperation::Join, .. })
        ));
    }

    #[test]
    fn send_chat_clears_typing_after_body() {
        let client = StubClient::default();
        let (mut bridge, _completions) = Bridge::new(client.clone());

        let events =
            bridge.process_app_action(AppAction::SendChat { body: "hi".into(), timestamp: 7 });

        assert_eq!(events, [AppEvent::MessageSent]);
        assert_eq!(client.sent(), [
            (SocketMessageType::SendMessage, json!({ "body": "hi", "timestamp": 7 })),
            (SocketMessageType::SetTypingPresence, json!({ "typing": false })),
        ]);
    }

    #[test]
    fn failed_send_produces_event() {
        let client = StubClient { fail_sends: true, ..StubClient::default() };
        let (mut bridge, _completions) = Bridge::new(client.clone());

        let events =
            bridge.process_app_action(AppAction::SendChat { body: "hi".into(), timestamp: 7 });
        assert!(matches!(events.as_slice(), [AppEvent::SendFailed { .. }]));

        let events = bridge.process_app_action(AppAction::SetTyping { typing: true });
        assert!(matches!(events.as_slice(), [AppEvent::SendFailed { .. }]));
        assert!(client.sent().is_empty());
    }
}
