//! Simulation driver implementing the Driver trait.
//!
//! `SimDriver` provides the same interface as the terminal driver but plays
//! a fixed script of user steps instead of reading a keyboard. It implements
//! [`Driver`] so the same [`partyline_app::Runtime`] orchestration code runs
//! in both production and tests.
//!
//! A script mixes two kinds of step:
//! - **Act**: call the App's public operations, as a key press would
//! - **Wait**: hold until the App reaches a state, such as a room being
//!   joined or a message arriving
//!
//! While waiting, `poll_event` never resolves; the runtime's select picks up
//! connection events instead and the condition is re-checked on the next
//! cycle. When the script runs out the driver asks the App to quit.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, PoisonError},
};

use partyline_app::{App, AppAction, Driver};
use thiserror::Error;

/// Error type for simulation driver.
#[derive(Debug, Clone, Error)]
#[error("simulation driver: {0}")]
pub struct SimDriverError(pub String);

type Act = Box<dyn FnOnce(&mut App) -> Vec<AppAction> + Send>;
type Condition = Box<dyn Fn(&App) -> bool + Send>;

enum Step {
    Act(Act),
    Wait(Condition),
}

/// Renders and shutdown captured by a [`SimDriver`].
///
/// Shared with the test, since the runtime consumes the driver.
#[derive(Clone, Default)]
pub struct RenderLog {
    inner: Arc<Mutex<RenderState>>,
}

#[derive(Default)]
struct RenderState {
    count: usize,
    last: Option<App>,
    stopped: bool,
}

impl RenderLog {
    /// Number of renders so far.
    pub fn count(&self) -> usize {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).count
    }

    /// App state at the most recent render.
    pub fn last(&self) -> Option<App> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).last.clone()
    }

    /// Whether the runtime released the driver.
    pub fn stopped(&self) -> bool {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).stopped
    }

    fn record(&self, app: &App) -> Result<(), SimDriverError> {
        let mut state =
            self.inner.lock().map_err(|_| SimDriverError("render log poisoned".into()))?;
        state.count += 1;
        state.last = Some(app.clone());
        Ok(())
    }
}

/// Simulation driver for scripted runtime tests.
#[derive(Default)]
pub struct SimDriver {
    steps: VecDeque<Step>,
    renders: RenderLog,
}

impl SimDriver {
    /// Create a driver with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step that drives the App directly.
    #[must_use]
    pub fn act<F>(mut self, act: F) -> Self
    where
        F: FnOnce(&mut App) -> Vec<AppAction> + Send + 'static,
    {
        self.steps.push_back(Step::Act(Box::new(act)));
        self
    }

    /// Append a step that holds the script until `condition` holds.
    #[must_use]
    pub fn wait_until<F>(mut self, condition: F) -> Self
    where
        F: Fn(&App) -> bool + Send + 'static,
    {
        self.steps.push_back(Step::Wait(Box::new(condition)));
        self
    }

    /// Handle on the renders this driver captures.
    pub fn renders(&self) -> RenderLog {
        self.renders.clone()
    }
}

impl Driver for SimDriver {
    type Error = SimDriverError;

    async fn poll_event(&mut self, app: &mut App) -> Result<Vec<AppAction>, Self::Error> {
        loop {
            let Some(step) = self.steps.pop_front() else {
                tracing::debug!("script finished");
                return Ok(app.quit());
            };

            match step {
                Step::Act(act) => return Ok(act(app)),
                Step::Wait(condition) => {
                    if condition(app) {
                        continue;
                    }
                    self.steps.push_front(Step::Wait(condition));
                    // Cancelled by the runtime when another source has input
                    return std::future::pending().await;
                },
            }
        }
    }

    fn render(&mut self, app: &App) -> Result<(), Self::Error> {
        self.renders.record(app)
    }

    fn stop(&mut self) {
        self.renders.inner.lock().unwrap_or_else(PoisonError::into_inner).stopped = true;
    }
}
