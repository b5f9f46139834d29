//! Session invariants.
//!
//! Each [`Invariant`] is a statement about a single [`App`] snapshot that has
//! to be true after every event, in any order of arrival. Tests run them
//! through an [`InvariantRegistry`] after each step of a scenario or
//! generated operation sequence.
//!
//! ```ignore
//! let invariants = InvariantRegistry::standard();
//! invariants.assert_all(&app, "after join");
//! ```

use partyline_app::App;
use thiserror::Error;

/// Outcome of one invariant check.
pub type InvariantResult = Result<(), Violation>;

/// A broken invariant.
#[derive(Debug, Clone, Error)]
#[error("{invariant}: {message}")]
pub struct Violation {
    /// Which invariant failed.
    pub invariant: &'static str,
    /// What the state looked like.
    pub message: String,
}

/// A property of [`App`] state.
pub trait Invariant: Send + Sync {
    /// Short snake_case name used in reports.
    fn name(&self) -> &'static str;

    /// `Err` describes the offending state.
    fn check(&self, app: &App) -> InvariantResult;

    /// Violation of this invariant carrying `message`.
    fn violation(&self, message: impl Into<String>) -> Violation
    where
        Self: Sized,
    {
        Violation { invariant: self.name(), message: message.into() }
    }
}

/// A room ID is recorded exactly when a room has been entered.
pub struct RoomMatchesJoined;

impl Invariant for RoomMatchesJoined {
    fn name(&self) -> &'static str {
        "room_matches_joined"
    }

    fn check(&self, app: &App) -> InvariantResult {
        let session = app.session();
        if session.room_id.is_some() == session.joined {
            Ok(())
        } else {
            Err(self.violation(format!(
                "room_id={:?} but joined={}",
                session.room_id, session.joined
            )))
        }
    }
}

/// Outside a room with nothing pending, no room traffic is kept.
pub struct IdleLobbyIsEmpty;

impl Invariant for IdleLobbyIsEmpty {
    fn name(&self) -> &'static str {
        "idle_lobby_is_empty"
    }

    fn check(&self, app: &App) -> InvariantResult {
        if app.session().joined || app.pending().is_some() {
            return Ok(());
        }
        if app.messages().is_empty() && app.typing_roster().is_empty() {
            Ok(())
        } else {
            Err(self.violation(format!(
                "{} messages and {} typists kept outside a room",
                app.messages().len(),
                app.typing_roster().len()
            )))
        }
    }
}

/// Typing presence is only ever on inside a room.
pub struct TypingOnlyInRoom;

impl Invariant for TypingOnlyInRoom {
    fn name(&self) -> &'static str {
        "typing_only_in_room"
    }

    fn check(&self, app: &App) -> InvariantResult {
        if !app.is_typing() || app.session().joined {
            Ok(())
        } else {
            Err(self.violation("typing presence on outside a room"))
        }
    }
}

/// No room request is in flight once a room has been entered.
pub struct NoPendingInRoom;

impl Invariant for NoPendingInRoom {
    fn name(&self) -> &'static str {
        "no_pending_in_room"
    }

    fn check(&self, app: &App) -> InvariantResult {
        match app.pending() {
            Some(operation) if app.session().joined => {
                Err(self.violation(format!("{operation:?} pending inside a room")))
            },
            _ => Ok(()),
        }
    }
}

/// A set of invariants checked together.
#[derive(Default)]
pub struct InvariantRegistry {
    checks: Vec<Box<dyn Invariant>>,
}

impl InvariantRegistry {
    /// No invariants.
    pub fn new() -> Self {
        Self::default()
    }

    /// [`RoomMatchesJoined`], [`IdleLobbyIsEmpty`], [`TypingOnlyInRoom`] and
    /// [`NoPendingInRoom`].
    pub fn standard() -> Self {
        Self::new()
            .with(RoomMatchesJoined)
            .with(IdleLobbyIsEmpty)
            .with(TypingOnlyInRoom)
            .with(NoPendingInRoom)
    }

    /// Builder form of [`InvariantRegistry::add`].
    #[must_use]
    pub fn with<I: Invariant + 'static>(mut self, invariant: I) -> Self {
        self.add(invariant);
        self
    }

    /// Register `invariant`.
    pub fn add<I: Invariant + 'static>(&mut self, invariant: I) {
        self.checks.push(Box::new(invariant));
    }

    /// Every violation in `app`, in registration order.
    pub fn check_all(&self, app: &App) -> Result<(), Vec<Violation>> {
        let violations: Vec<Violation> =
            self.checks.iter().filter_map(|check| check.check(app).err()).collect();

        if violations.is_empty() { Ok(()) } else { Err(violations) }
    }

    /// Panic listing every violation in `app`. `context` names the step.
    pub fn assert_all(&self, app: &App, context: &str) {
        let Err(violations) = self.check_all(app) else {
            return;
        };

        let report = violations.iter().map(|v| format!("\n  - {v}")).collect::<String>();
        panic!("{} invariant(s) broken {context}:{report}", violations.len());
    }

    /// Number of registered invariants.
    pub fn len(&self) -> usize {
        self.checks.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }
}
