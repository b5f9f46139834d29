//! Terminal UI for Partyline
//!
//! A thin shell over [`partyline_app::Driver`] that provides terminal-specific
//! I/O. All orchestration logic lives in the generic [`partyline_app::Runtime`].
//!
//! This crate only handles keyboard input, avatar files, and rendering.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod avatar;
pub mod input;
pub mod terminal;
pub mod ui;

pub use avatar::{AvatarError, load_custom};
pub use input::{InputState, LobbyField, TextBuffer};
pub use partyline_app::{App, AppAction, AppEvent, Bridge, Driver, KeyInput, Runtime};
pub use terminal::{TerminalDriver, TerminalError};
