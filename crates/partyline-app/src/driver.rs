//! Driver trait for abstracting front-end I/O.
//!
//! The [`Driver`] trait decouples the application runtime from specific
//! input and rendering implementations. Each front-end implements the trait,
//! while the generic [`crate::Runtime`] handles all orchestration.

use std::future::Future;

use crate::{App, AppAction};

/// Abstracts user input and rendering for the application runtime.
///
/// # Implementations
///
/// - **TUI**: crossterm for keyboard events, ratatui for rendering
/// - **Tests**: scripted input against an in-process chat service
pub trait Driver: Send {
    /// Platform-specific error type.
    type Error: std::error::Error + Send + 'static;

    /// Wait for the next input and apply it to `app`.
    ///
    /// Returns the actions the input produced, which may be empty (for
    /// example on a tick with nothing to do).
    fn poll_event(
        &mut self,
        app: &mut App,
    ) -> impl Future<Output = Result<Vec<AppAction>, Self::Error>> + Send;

    /// Render the application state.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    fn render(&mut self, app: &App) -> Result<(), Self::Error>;

    /// Release front-end resources.
    fn stop(&mut self);
}
