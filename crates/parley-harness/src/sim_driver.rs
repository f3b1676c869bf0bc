//! Simulation driver implementing the Driver trait.
//!
//! `SimDriver` records every render request instead of drawing, and can
//! check invariants against the session on each one, so the same
//! [`parley_app::Runtime`] orchestration code runs in production and tests.

use parley_app::{AppAction, Driver, EventSource, Runtime, Session};
use parley_core::Backend;

use crate::invariants::{InvariantRegistry, SessionSnapshot};

/// Error type for simulation driver.
#[derive(Debug, Clone)]
pub struct SimDriverError(pub String);

impl std::fmt::Display for SimDriverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SimDriverError: {}", self.0)
    }
}

impl std::error::Error for SimDriverError {}

/// Simulation driver for deterministic testing.
#[derive(Default)]
pub struct SimDriver {
    rendered: Vec<AppAction>,
    invariants: Option<InvariantRegistry>,
    last_snapshot: Option<SessionSnapshot>,
}

impl SimDriver {
    /// Create a driver that only records.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a driver that checks `invariants` on every render.
    pub fn with_invariants(invariants: InvariantRegistry) -> Self {
        Self { invariants: Some(invariants), ..Self::default() }
    }

    /// Actions rendered so far.
    pub fn rendered(&self) -> &[AppAction] {
        &self.rendered
    }

    /// Take the rendered actions, leaving the log empty.
    pub fn take_rendered(&mut self) -> Vec<AppAction> {
        std::mem::take(&mut self.rendered)
    }
}

impl<B: Backend> Driver<B> for SimDriver {
    type Error = SimDriverError;

    fn render(&mut self, session: &Session<B>, action: &AppAction) -> Result<(), Self::Error> {
        self.rendered.push(action.clone());

        if let Some(invariants) = &self.invariants {
            let snapshot = SessionSnapshot::capture(session, self.last_snapshot.as_ref());
            if let Err(violations) = invariants.check_all(&snapshot) {
                let messages: Vec<_> = violations.iter().map(ToString::to_string).collect();
                return Err(SimDriverError(format!(
                    "after {action:?}: {}",
                    messages.join("; ")
                )));
            }
            self.last_snapshot = Some(snapshot);
        }
        Ok(())
    }
}

/// Deliver every queued event to `session`, returning the actions produced.
///
/// Loops until the backend is idle, since handling an event may subscribe
/// and queue more.
pub fn pump<B: Backend + EventSource>(session: &mut Session<B>) -> Vec<AppAction> {
    let mut actions = Vec::new();
    loop {
        let events = session.backend_mut().poll_events();
        if events.is_empty() {
            return actions;
        }
        for event in events {
            actions.extend(session.handle(event));
        }
    }
}

/// Runtime over a [`SimDriver`].
pub type SimRuntime<B> = Runtime<B, SimDriver>;
