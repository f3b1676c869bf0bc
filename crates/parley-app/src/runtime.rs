//! Generic runtime driving a [`Session`].
//!
//! The Runtime moves events from the backend into the session and hands the
//! resulting actions to a [`Driver`] for rendering:
//! - [`EventSource`]: backends that queue events until polled
//! - [`Driver`]: platform-specific rendering

use parley_core::{Backend, BackendEvent};

use crate::{AppAction, Session, SessionError};

/// Backend that buffers subscription events until polled.
pub trait EventSource {
    /// Take every queued event, oldest first.
    fn poll_events(&mut self) -> Vec<BackendEvent>;
}

/// Renders session state.
///
/// Implemented by each frontend. The runtime calls [`Driver::render`] once
/// per action with the session already updated.
pub trait Driver<B: Backend> {
    /// Platform-specific error type.
    type Error: std::error::Error + 'static;

    /// Render the region named by `action`.
    fn render(&mut self, session: &Session<B>, action: &AppAction) -> Result<(), Self::Error>;
}

/// Orchestrates a session, its event source and a driver.
pub struct Runtime<B, D>
where
    B: Backend + EventSource,
    D: Driver<B>,
{
    session: Session<B>,
    driver: D,
}

impl<B, D> Runtime<B, D>
where
    B: Backend + EventSource,
    D: Driver<B>,
{
    /// Wrap a session and a driver.
    pub fn new(session: Session<B>, driver: D) -> Self {
        Self { session, driver }
    }

    /// Start the session and process the initial replay.
    pub fn start(&mut self) -> Result<usize, RuntimeError<D::Error>> {
        self.session.start()?;
        self.run_until_idle().map_err(RuntimeError::Driver)
    }

    /// Deliver queued events until the backend has nothing left.
    ///
    /// Handling an event may queue more (a new channel subscribes to its
    /// message count), so this loops. Returns the number of events handled.
    pub fn run_until_idle(&mut self) -> Result<usize, D::Error> {
        let mut handled = 0;
        loop {
            let events = self.session.backend_mut().poll_events();
            if events.is_empty() {
                return Ok(handled);
            }
            for event in events {
                handled += 1;
                let actions = self.session.handle(event);
                self.dispatch(&actions)?;
            }
        }
    }

    /// Render actions returned by a user operation.
    pub fn dispatch(&mut self, actions: &[AppAction]) -> Result<(), D::Error> {
        for action in actions {
            self.driver.render(&self.session, action)?;
        }
        Ok(())
    }

    /// Tear the session down and drop whatever is still queued.
    pub fn stop(&mut self) {
        self.session.teardown();
        let dropped = self.session.backend_mut().poll_events().len();
        if dropped > 0 {
            tracing::debug!(dropped, "discarded events queued at teardown");
        }
    }

    /// The driven session.
    pub fn session(&self) -> &Session<B> {
        &self.session
    }

    /// Mutable access for user operations.
    pub fn session_mut(&mut self) -> &mut Session<B> {
        &mut self.session
    }

    /// The driver.
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Borrow the session and the driver together, for full redraws.
    pub fn parts_mut(&mut self) -> (&Session<B>, &mut D) {
        (&self.session, &mut self.driver)
    }

    /// Split into session and driver.
    pub fn into_parts(self) -> (Session<B>, D) {
        (self.session, self.driver)
    }
}

/// Failure while starting a runtime.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError<E: std::error::Error + 'static> {
    /// Session refused to start.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Driver failed to render.
    #[error("render failed: {0}")]
    Driver(#[source] E),
}
