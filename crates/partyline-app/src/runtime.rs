//! Event loop.
//!
//! [`Runtime`] is the only place the [`App`] is mutated. Three sources feed
//! it, whichever is ready first:
//!
//! - the [`Driver`] (keys, resize, ticks)
//! - the connection's [`SocketEvent`] subscription
//! - completions of room requests started by the [`Bridge`]
//!
//! Actions the App returns are executed in order; bridge results that come
//! back synchronously are fed straight into the App again.

use std::collections::VecDeque;

use partyline_client::{ChatClient, SocketEvent};
use tokio::sync::mpsc;

use crate::{App, AppAction, AppEvent, Bridge, Driver};

/// Owns the App, the bridge to the chat client, the driver, and the
/// connection's event subscription until the user quits.
pub struct Runtime<D, C>
where
    D: Driver,
    C: ChatClient,
{
    driver: D,
    app: App,
    bridge: Bridge<C>,
    socket_events: mpsc::UnboundedReceiver<SocketEvent>,
    completions: mpsc::UnboundedReceiver<AppEvent>,
    /// False once the connection has closed.
    connected: bool,
}

impl<D, C> Runtime<D, C>
where
    D: Driver,
    C: ChatClient,
{
    /// Wire `app` to `client`. `socket_events` is the subscription returned
    /// alongside the client.
    pub fn new(
        driver: D,
        app: App,
        client: C,
        socket_events: mpsc::UnboundedReceiver<SocketEvent>,
    ) -> Self {
        let (bridge, completions) = Bridge::new(client);
        Self { driver, app, bridge, socket_events, completions, connected: true }
    }

    /// Draw once, then loop until the App emits [`AppAction::Quit`].
    ///
    /// # Errors
    ///
    /// Driver failures (terminal I/O) end the loop and are returned as is.
    pub async fn run(mut self) -> Result<(), D::Error> {
        self.driver.render(&self.app)?;

        while !self.step().await? {}

        self.driver.stop();
        Ok(())
    }

    /// Wait for the next input and apply it. `Ok(true)` means quit.
    async fn step(&mut self) -> Result<bool, D::Error> {
        let actions = tokio::select! {
            actions = self.driver.poll_event(&mut self.app) => actions?,

            event = self.socket_events.recv(), if self.connected => {
                let event = event.unwrap_or(SocketEvent::Close);
                self.connected = !event.is_terminal();
                tracing::debug!(?event, "connection event");
                self.app.handle(AppEvent::Socket(event))
            }

            Some(event) = self.completions.recv() => self.app.handle(event),
        };

        self.execute(actions)
    }

    /// Run `actions` and everything they lead to. `Ok(true)` means quit.
    fn execute(&mut self, actions: Vec<AppAction>) -> Result<bool, D::Error> {
        let mut queue = VecDeque::from(actions);

        while let Some(action) = queue.pop_front() {
            match action {
                AppAction::Quit => return Ok(true),
                AppAction::Render => self.driver.render(&self.app)?,
                request => {
                    for event in self.bridge.process_app_action(request) {
                        queue.extend(self.app.handle(event));
                    }
                },
            }
        }

        Ok(false)
    }

    /// Session state as of the last processed event.
    pub fn app(&self) -> &App {
        &self.app
    }

    /// Mutable access, for seeding state before [`Runtime::run`].
    pub fn app_mut(&mut self) -> &mut App {
        &mut self.app
    }
}
