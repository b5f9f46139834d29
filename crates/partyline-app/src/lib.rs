//! Application layer for Partyline
//!
//! Pure session state machine and generic runtime for the chat front-end,
//! so the same code runs behind the terminal UI and in tests.
//!
//! # Components
//!
//! - [`App`]: Session controller (connection, room, identity, messages)
//! - [`Bridge`]: Executes App actions against a [`partyline_client::ChatClient`]
//! - [`Driver`]: Trait for platform-specific input and rendering
//! - [`Runtime`]: Event loop tying the driver, the App, and the client together

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod action;
mod app;
mod bridge;
mod driver;
mod event;
mod input;
mod runtime;
mod state;

pub use action::AppAction;
pub use app::App;
pub use bridge::Bridge;
pub use driver::Driver;
pub use event::AppEvent;
pub use input::KeyInput;
pub use runtime::Runtime;
pub use state::{
    ConnectionState, JoinMode, Notice, NoticeLevel, RoomOperation, Screen, Session,
};
