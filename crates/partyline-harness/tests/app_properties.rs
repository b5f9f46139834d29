//! Property-based tests for the App state machine.
//!
//! Tests verify that invariants hold under arbitrary operation sequences,
//! covering connection callbacks, room request outcomes, and user actions
//! in every interleaving.

use partyline_app::{App, AppAction, AppEvent, RoomOperation};
use partyline_client::{AvatarRef, SocketEvent, SocketMessage};
use partyline_harness::InvariantRegistry;
use proptest::prelude::*;
use serde_json::json;

/// One thing that can happen to a session.
#[derive(Debug, Clone)]
enum Op {
    Ready,
    Close,
    Error,
    Chat(String),
    Typing(Vec<String>),
    Create(String),
    Join(String, String),
    Created,
    Joined(Vec<String>),
    Failed(bool),
    Leave,
    Send(String),
    NotifyTyping,
}

fn nickname() -> impl Strategy<Value = String> {
    prop_oneof![Just(String::new()), Just(" ".to_string()), "[A-Za-z]{1,8}"]
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        1 => Just(Op::Ready),
        1 => Just(Op::Close),
        1 => Just(Op::Error),
        4 => "[ -~]{0,12}".prop_map(Op::Chat),
        2 => prop::collection::vec("[A-Za-z]{1,6}", 0..4).prop_map(Op::Typing),
        2 => nickname().prop_map(Op::Create),
        2 => (nickname(), "[A-Z0-9 ]{0,4}").prop_map(|(n, r)| Op::Join(n, r)),
        1 => Just(Op::Created),
        1 => prop::collection::vec("[a-z]{1,6}", 0..4).prop_map(Op::Joined),
        1 => any::<bool>().prop_map(Op::Failed),
        1 => Just(Op::Leave),
        2 => "[ -~]{0,12}".prop_map(Op::Send),
        2 => Just(Op::NotifyTyping),
    ]
}

fn chat(body: &str, nickname: &str) -> AppEvent {
    AppEvent::Socket(SocketEvent::Message(SocketMessage {
        kind: "sendMessage".into(),
        data: json!({ "userNickname": nickname, "body": body, "permId": "p", "timestamp": 1 }),
    }))
}

fn apply(app: &mut App, op: Op) -> Vec<AppAction> {
    match op {
        Op::Ready => app.handle(AppEvent::Socket(SocketEvent::ConnectionReady)),
        Op::Close => app.handle(AppEvent::Socket(SocketEvent::Close)),
        Op::Error => app.handle(AppEvent::Socket(SocketEvent::Error("oops".into()))),
        Op::Chat(body) => app.handle(chat(&body, "Bob")),
        Op::Typing(users) => app.handle(AppEvent::Socket(SocketEvent::Message(SocketMessage {
            kind: "setTypingPresence".into(),
            data: json!({ "anyoneTyping": !users.is_empty(), "usersTyping": users }),
        }))),
        Op::Create(nickname) => app.create_room(nickname, AvatarRef::default()),
        Op::Join(nickname, room_id) => app.join_room(nickname, &room_id, AvatarRef::default()),
        Op::Created => app.handle(AppEvent::RoomCreated { room_id: "R1".into() }),
        Op::Joined(bodies) => {
            let messages: Vec<_> = bodies
                .iter()
                .map(|b| json!({ "body": b, "permId": "p", "timestamp": 1 }))
                .collect();
            app.handle(AppEvent::RoomJoined {
                room_id: "R1".into(),
                history: json!({ "messages": messages }),
            })
        },
        Op::Failed(create) => app.handle(AppEvent::RoomOperationFailed {
            operation: if create { RoomOperation::Create } else { RoomOperation::Join },
            reason: "refused".into(),
        }),
        Op::Leave => app.leave_room(),
        Op::Send(body) => app.send_chat_message(body, 1),
        Op::NotifyTyping => app.notify_typing(),
    }
}

fn joined_app() -> App {
    let mut app = App::new();
    let _ = app.handle(AppEvent::Socket(SocketEvent::ConnectionReady));
    let _ = app.create_room("Ann", AvatarRef::default());
    let _ = app.handle(AppEvent::RoomCreated { room_id: "R1".into() });
    app
}

proptest! {
    /// Session invariants hold under arbitrary operation sequences.
    #[test]
    fn prop_session_invariants_hold(ops in prop::collection::vec(op_strategy(), 0..60)) {
        let mut app = App::new();
        let invariants = InvariantRegistry::standard();

        for op in ops {
            let _ = apply(&mut app, op.clone());

            prop_assert!(
                invariants.check_all(&app).is_ok(),
                "Invariant violated after {:?}", op
            );
        }
    }

    /// Messages received while joined accumulate in arrival order.
    #[test]
    fn prop_messages_keep_arrival_order(bodies in prop::collection::vec("[ -~]{0,16}", 0..30)) {
        let mut app = joined_app();

        for body in &bodies {
            let _ = app.handle(chat(body, "Bob"));
        }

        let received: Vec<_> = app.messages().iter().map(|m| m.body.clone()).collect();
        prop_assert_eq!(received, bodies);
    }

    /// Leaving always yields an empty message list and roster.
    #[test]
    fn prop_leave_clears_room(ops in prop::collection::vec(op_strategy(), 0..40)) {
        let mut app = joined_app();
        for op in ops {
            let _ = apply(&mut app, op);
        }

        let _ = app.leave_room();

        prop_assert!(app.messages().is_empty());
        prop_assert!(app.typing_roster().is_empty());
        prop_assert!(!app.session().joined);
        prop_assert!(app.session().room_id.is_none());
    }

    /// Any number of keystrokes without a send yields one typing update.
    #[test]
    fn prop_typing_update_once_per_burst(keystrokes in 1usize..50) {
        let mut app = joined_app();

        let updates = (0..keystrokes)
            .flat_map(|_| app.notify_typing())
            .filter(|a| matches!(a, AppAction::SetTyping { typing: true }))
            .count();

        prop_assert_eq!(updates, 1);
    }

    /// Blank messages never produce a send.
    #[test]
    fn prop_blank_messages_never_sent(body in "[ \t]{0,10}") {
        let mut app = joined_app();
        prop_assert!(app.send_chat_message(body, 1).is_empty());
    }
}
