//! Deterministic test harness for Parley sessions.
//!
//! In-memory implementations of the backend capability for reproducible
//! testing of session state machines without a hosted database.
//!
//! # Backends
//!
//! [`MemoryDatabase`] is a shared JSON tree with subscription, push key and
//! disconnect-cleanup semantics. [`ChaoticBackend`] wraps any backend and
//! injects seeded failures.
//!
//! # Model-Based Testing
//!
//! The `model` module provides a reference implementation of unread
//! bookkeeping. Operations are applied to both the model and a real session,
//! and their observable states are compared.
//!
//! # Invariant Testing
//!
//! The `invariants` module provides behavioral testing through invariant
//! checks. Use [`InvariantRegistry::standard()`] for the session invariants.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod chaotic;
pub mod invariants;
pub mod memory;
pub mod model;
pub mod sim_driver;

pub use chaotic::ChaoticBackend;
pub use invariants::{
    ActiveChannelHasNoUnread, ActiveChannelListed, BaselineNotAhead, Invariant, InvariantKind,
    InvariantRegistry, InvariantResult, LastKnownMonotonic, LocalPeerExcluded, SessionSnapshot,
    Violation,
};
pub use memory::{ClientHandle, MemoryBackend, MemoryDatabase};
pub use model::{
    MODEL_CHANNELS, ModelChannel, ModelWorld, ObservableState, Operation, OperationError,
    OperationResult, channel_id,
};
pub use sim_driver::{SimDriver, SimDriverError, SimRuntime, pump};
