//! Connection callbacks.
//!
//! The chat service reports everything that happens on the connection through
//! four callbacks. A connection delivers [`SocketEvent`]s over a channel; the
//! receiver feeds each one into its [`SocketEventHandler`] with
//! [`SocketEvent::dispatch`].

use crate::SocketMessage;

/// Receiver of connection callbacks.
pub trait SocketEventHandler {
    /// A message arrived from the service.
    fn on_message(&mut self, message: SocketMessage);

    /// The connection closed. No further events follow.
    fn on_close(&mut self);

    /// The service reported an error. The connection stays as it was.
    fn on_error(&mut self, message: String);

    /// The connection is ready for requests.
    fn on_connection_ready(&mut self);
}

/// A notification from the chat service connection.
#[derive(Debug, Clone, PartialEq)]
pub enum SocketEvent {
    /// Message received.
    Message(SocketMessage),

    /// Connection closed.
    Close,

    /// Error reported by the service.
    Error(String),

    /// Connection established.
    ConnectionReady,
}

impl SocketEvent {
    /// Invoke the matching callback on `handler`.
    pub fn dispatch<H: SocketEventHandler + ?Sized>(self, handler: &mut H) {
        match self {
            Self::Message(message) => handler.on_message(message),
            Self::Close => handler.on_close(),
            Self::Error(message) => handler.on_error(message),
            Self::ConnectionReady => handler.on_connection_ready(),
        }
    }

    /// Whether this event ends the connection.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Close)
    }
}
