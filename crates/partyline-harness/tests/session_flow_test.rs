//! Session flow tests through the App and Bridge.
//!
//! # Test Strategy
//!
//! Each test plays what a user does in the front-end:
//! 1. Call the App's public operations (as the lobby and composer do)
//! 2. Execute the resulting actions through the Bridge against a
//!    [`RecordingClient`]
//! 3. Feed connection events and request outcomes back into the App
//! 4. Verify App state and the exact outbound traffic
//!
//! # Oracle Pattern
//!
//! Tests end with oracle checks on the App state the view renders from and
//! on what the client was asked to send.

use partyline_app::{App, AppAction, AppEvent, Bridge, NoticeLevel, Screen};
use partyline_client::{AvatarRef, ClientError, SocketEvent, SocketMessage, SocketMessageType};
use partyline_harness::{InvariantRegistry, RecordingClient, RoomRequest};
use serde_json::json;
use tokio::sync::mpsc;

/// App, bridge, and client wired together.
struct Session {
    app: App,
    bridge: Bridge<RecordingClient>,
    client: RecordingClient,
    completions: mpsc::UnboundedReceiver<AppEvent>,
}

impl Session {
    fn connected(client: RecordingClient) -> Self {
        let (bridge, completions) = Bridge::new(client.clone());
        let mut session = Self { app: App::new(), bridge, client, completions };
        session.deliver(SocketEvent::ConnectionReady);
        session
    }

    /// Execute actions the way the runtime does.
    fn run(&mut self, actions: Vec<AppAction>) {
        let mut pending = actions;
        while !pending.is_empty() {
            for action in std::mem::take(&mut pending) {
                for event in self.bridge.process_app_action(action) {
                    pending.extend(self.app.handle(event));
                }
            }
        }
    }

    /// Wait for the outcome of the pending room request.
    async fn complete(&mut self) {
        let event = self.completions.recv().await.unwrap();
        let actions = self.app.handle(event);
        self.run(actions);
    }

    fn deliver(&mut self, event: SocketEvent) {
        let actions = self.app.handle(AppEvent::Socket(event));
        self.run(actions);
    }
}

fn chat_from(nickname: &str, body: &str, timestamp: u64) -> SocketEvent {
    SocketEvent::Message(SocketMessage {
        kind: "sendMessage".into(),
        data: json!({
            "isSystemMessage": false,
            "userNickname": nickname,
            "body": body,
            "permId": "u2",
            "timestamp": timestamp,
        }),
    })
}

fn typing(users: &[&str]) -> SocketEvent {
    SocketEvent::Message(SocketMessage {
        kind: "setTypingPresence".into(),
        data: json!({ "anyoneTyping": !users.is_empty(), "usersTyping": users }),
    })
}

/// Create as Ann, receive Bob's message and typing presence.
///
/// Front-end behavior:
/// - Ann creates a room and lands in R1 with an empty list
/// - Bob's message appears
/// - Bob shows as typing
#[tokio::test]
async fn create_receive_and_see_typing() {
    let mut session = Session::connected(RecordingClient::new());
    let invariants = InvariantRegistry::standard();

    let actions = session.app.create_room("Ann", AvatarRef::default());
    session.run(actions);
    session.complete().await;
    invariants.assert_all(&session.app, "after create");

    assert_eq!(session.app.session().room_id.as_deref(), Some("R1"));
    assert!(session.app.session().joined);
    assert!(session.app.messages().is_empty());
    assert_eq!(session.client.room_requests(), [RoomRequest::Create {
        nickname: "Ann".into(),
        icon: AvatarRef::default(),
    }]);

    session.deliver(chat_from("Bob", "hi", 1000));
    session.deliver(typing(&["Bob"]));
    invariants.assert_all(&session.app, "after traffic");

    let [message] = session.app.messages() else {
        panic!("expected one message, got {:?}", session.app.messages());
    };
    assert_eq!(message.body, "hi");
    assert_eq!(message.user_nickname.as_deref(), Some("Bob"));
    assert_eq!(message.perm_id, "u2");
    assert_eq!(message.timestamp, 1000);
    assert_eq!(session.app.typing_roster(), ["Bob"]);
}

/// Join with history, then chat.
///
/// Front-end behavior:
/// - The list shows exactly the room's history
/// - Typing sends one presence update, sending a message clears it
#[tokio::test]
async fn join_then_chat() {
    let history = json!({ "messages": [
        { "isSystemMessage": true, "body": "Bob joined the party", "permId": "u2", "timestamp": 5 },
        { "userNickname": "Ann", "body": "welcome", "permId": "u1", "timestamp": 6 },
    ]});
    let client = RecordingClient::new().with_join_result(Ok(history));
    let mut session = Session::connected(client);

    session.app.toggle_join_mode();
    session.app.set_nickname("Bob");
    session.app.set_room_id_input("R1");
    let actions = session.app.submit_lobby();
    session.run(actions);
    session.complete().await;

    let bodies: Vec<_> = session.app.messages().iter().map(|m| m.body.as_str()).collect();
    assert_eq!(bodies, ["Bob joined the party", "welcome"]);
    assert_eq!(session.app.screen(), Screen::Room);

    for _ in 0..3 {
        let actions = session.app.notify_typing();
        session.run(actions);
    }
    let actions = session.app.send_chat_message("hello", 42);
    session.run(actions);

    assert_eq!(session.client.take_sent(), [
        (SocketMessageType::SetTypingPresence, json!({ "typing": true })),
        (SocketMessageType::SendMessage, json!({ "body": "hello", "timestamp": 42 })),
        (SocketMessageType::SetTypingPresence, json!({ "typing": false })),
    ]);
}

/// A failed join leaves the lobby ready for another attempt.
#[tokio::test]
async fn failed_join_can_be_retried() {
    let client =
        RecordingClient::new().with_join_result(Err(ClientError::RoomNotFound("R9".into())));
    let mut session = Session::connected(client);

    let actions = session.app.join_room("Bob", "R9", AvatarRef::default());
    session.run(actions);
    assert!(session.app.join_room("Bob", "R9", AvatarRef::default()).is_empty());
    session.complete().await;

    assert!(!session.app.session().joined);
    assert_eq!(session.app.room_id_input(), "");
    assert!(session.app.notice().is_some_and(|n| n.level == NoticeLevel::Error));
    assert!(!session.app.create_room("Bob", AvatarRef::default()).is_empty());
}

/// Failed sends surface a notice and are not retried.
#[tokio::test]
async fn failed_send_is_reported_once() {
    let mut session = Session::connected(RecordingClient::new().failing_sends());
    let actions = session.app.create_room("Ann", AvatarRef::default());
    session.run(actions);
    session.complete().await;

    let actions = session.app.send_chat_message("lost", 1);
    session.run(actions);

    assert_eq!(session.app.notice().map(|n| n.text.as_str()), Some("Failed to send message"));
    assert!(session.client.sent().is_empty());
    assert!(session.app.session().joined);
}

/// Leaving is local and resets the room view.
#[tokio::test]
async fn leave_resets_without_traffic() {
    let mut session = Session::connected(RecordingClient::new());
    let actions = session.app.create_room("Ann", AvatarRef::default());
    session.run(actions);
    session.complete().await;
    session.deliver(chat_from("Bob", "hi", 1));
    session.deliver(typing(&["Bob"]));

    let actions = session.app.leave_room();
    session.run(actions);

    assert_eq!(session.app.screen(), Screen::Lobby);
    assert!(session.app.messages().is_empty());
    assert!(session.app.typing_roster().is_empty());
    assert!(session.client.sent().is_empty());

    // Traffic for the old room no longer lands
    session.deliver(chat_from("Bob", "still here?", 2));
    assert!(session.app.messages().is_empty());
}

/// Connection loss is terminal.
#[tokio::test]
async fn close_disconnects_for_good() {
    let mut session = Session::connected(RecordingClient::new());
    session.deliver(SocketEvent::Close);

    assert_eq!(session.app.screen(), Screen::Disconnected);
    assert!(session.app.create_room("Ann", AvatarRef::default()).is_empty());
    assert!(session.client.room_requests().is_empty());
}
