//! Chat client
//!
//! The boundary between the Partyline front-end and the real-time chat
//! service. Everything the front-end knows about the service lives here: the
//! wire shapes it consumes, the four connection callbacks it implements, and
//! the request surface it calls.
//!
//! # Components
//!
//! - [`ChatClient`]: Outbound requests (create room, join room, send message)
//! - [`SocketEventHandler`]: Inbound callbacks (message, close, error, ready)
//! - [`SocketEvent`]: Inbound notifications delivered over the event channel
//! - [`ChatMessage`], [`SocketMessage`], [`TypingPresence`]: Wire payloads
//! - [`LocalServer`]: In-process room service implementing [`ChatClient`]
//!   through [`LocalClient`] handles

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod avatar;
mod client;
mod error;
mod handler;
mod local;
mod message;

pub use avatar::{AvatarRef, DEFAULT_AVATARS};
pub use client::ChatClient;
pub use error::ClientError;
pub use handler::{SocketEvent, SocketEventHandler};
pub use local::{LocalClient, LocalServer};
pub use message::{
    ChatBody, ChatMessage, MessageList, RoomId, SocketMessage, SocketMessageType, TypingPresence,
    TypingUpdate,
};
