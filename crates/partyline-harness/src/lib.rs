//! Test harness for the Partyline front-end.
//!
//! Scripted and recording implementations of the [`partyline_app::Driver`]
//! and [`partyline_client::ChatClient`] seams, so the same
//! [`partyline_app::Runtime`] that backs the terminal UI runs under test.
//!
//! # Invariant Testing
//!
//! The `invariants` module provides behavioral testing through invariant
//! checks against [`partyline_app::App`] state. Use
//! [`InvariantRegistry::standard()`] for the session invariants.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod invariants;
pub mod recording_client;
pub mod sim_driver;

pub use invariants::{
    IdleLobbyIsEmpty, Invariant, InvariantRegistry, InvariantResult, NoPendingInRoom,
    RoomMatchesJoined, TypingOnlyInRoom, Violation,
};
pub use recording_client::{RecordingClient, RoomRequest};
pub use sim_driver::{RenderLog, SimDriver, SimDriverError};
