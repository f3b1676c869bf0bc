//! Chaotic backend wrapper for fault injection testing
//!
//! Delegates to an underlying backend but randomly refuses subscriptions,
//! writes, removals and cleanup registrations. Used to check that backend
//! failures never corrupt session state.

use parley_app::EventSource;
use parley_core::{
    Backend, BackendError, BackendEvent, CleanupAction, DbPath, EventKind, SubscriptionId,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde_json::Value;

/// Backend wrapper that randomly injects failures.
///
/// The RNG is seeded, so a failing run is reproducible from its seed.
pub struct ChaoticBackend<B: Backend> {
    inner: B,
    /// Failure rate (0.0 = never fail, 1.0 = always fail)
    failure_rate: f64,
    rng: ChaCha8Rng,
    injected: usize,
    operations: usize,
}

impl<B: Backend> ChaoticBackend<B> {
    /// Wrap `inner` with a fixed default seed.
    ///
    /// # Panics
    ///
    /// Panics if `failure_rate` is not in [0.0, 1.0]
    pub fn new(inner: B, failure_rate: f64) -> Self {
        Self::with_seed(inner, failure_rate, 0x1234_5678_9ABC_DEF0)
    }

    /// Wrap `inner` with an explicit seed for reproducible chaos.
    ///
    /// # Panics
    ///
    /// Panics if `failure_rate` is not in [0.0, 1.0]
    pub fn with_seed(inner: B, failure_rate: f64, seed: u64) -> Self {
        assert!(
            (0.0..=1.0).contains(&failure_rate),
            "failure_rate must be between 0.0 and 1.0, got {failure_rate}"
        );

        Self { inner, failure_rate, rng: ChaCha8Rng::seed_from_u64(seed), injected: 0, operations: 0 }
    }

    /// Underlying backend (for checking state after chaos).
    pub fn inner(&self) -> &B {
        &self.inner
    }

    /// Change the failure rate, e.g. after a clean startup.
    ///
    /// # Panics
    ///
    /// Panics if `failure_rate` is not in [0.0, 1.0]
    pub fn set_failure_rate(&mut self, failure_rate: f64) {
        assert!(
            (0.0..=1.0).contains(&failure_rate),
            "failure_rate must be between 0.0 and 1.0, got {failure_rate}"
        );
        self.failure_rate = failure_rate;
    }

    /// Number of failures injected so far.
    pub fn injected_failures(&self) -> usize {
        self.injected
    }

    /// Total number of fallible operations attempted.
    pub fn operation_count(&self) -> usize {
        self.operations
    }

    fn chaos(&mut self, path: &DbPath) -> Result<(), BackendError> {
        self.operations += 1;
        if self.rng.gen_bool(self.failure_rate) {
            self.injected += 1;
            tracing::debug!(%path, "injecting backend failure");
            return Err(BackendError::Rejected {
                path: path.to_string(),
                reason: "injected failure".into(),
            });
        }
        Ok(())
    }
}

impl<B: Backend> Backend for ChaoticBackend<B> {
    fn subscribe(&mut self, path: &DbPath, kind: EventKind) -> Result<SubscriptionId, BackendError> {
        self.chaos(path)?;
        self.inner.subscribe(path, kind)
    }

    fn unsubscribe_all(&mut self, path: &DbPath) {
        self.inner.unsubscribe_all(path);
    }

    fn write(&mut self, path: &DbPath, value: Value) -> Result<(), BackendError> {
        self.chaos(path)?;
        self.inner.write(path, value)
    }

    fn remove(&mut self, path: &DbPath) -> Result<(), BackendError> {
        self.chaos(path)?;
        self.inner.remove(path)
    }

    fn register_disconnect_cleanup(
        &mut self,
        path: &DbPath,
        action: CleanupAction,
    ) -> Result<(), BackendError> {
        self.chaos(path)?;
        self.inner.register_disconnect_cleanup(path, action)
    }

    fn generate_key(&mut self, parent: &DbPath) -> String {
        self.inner.generate_key(parent)
    }
}

impl<B: Backend + EventSource> EventSource for ChaoticBackend<B> {
    fn poll_events(&mut self) -> Vec<BackendEvent> {
        self.inner.poll_events()
    }
}
