//! Realtime backend capability.
//!
//! The [`Backend`] trait is the only way client state machines reach the
//! realtime database. It is synchronous: operations are issued immediately and
//! the resulting data arrives later as [`BackendEvent`]s, which the owner of
//! the state machine feeds back in. This keeps all client logic Sans-IO and
//! lets tests substitute an in-memory database.

use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{BackendError, DbPath};

/// Handle identifying one subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub#{}", self.0)
    }
}

/// Kind of change a subscription listens for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A child appeared below the path.
    ///
    /// Existing children are replayed once at subscription time, in key order.
    EntryAdded,
    /// A child disappeared from below the path.
    EntryRemoved,
    /// The value at the path changed.
    ///
    /// The current value is delivered once at subscription time.
    ValueChanged,
    /// The local transport connected or disconnected.
    ///
    /// The snapshot value is a boolean; the current state is delivered once
    /// at subscription time.
    ConnectionStateChanged,
}

/// Data delivered with an event.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Key of the node the data belongs to.
    pub key: String,
    /// Node value. `Value::Null` if the node does not exist.
    pub value: Value,
}

impl Snapshot {
    /// Create a snapshot.
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Self { key: key.into(), value }
    }

    /// Number of direct children of the node.
    pub fn num_children(&self) -> u64 {
        match &self.value {
            Value::Object(map) => map.len() as u64,
            Value::Array(items) => items.len() as u64,
            _ => 0,
        }
    }

    /// True if the node exists.
    pub fn exists(&self) -> bool {
        !self.value.is_null()
    }

    /// True if the value is the boolean `true`.
    pub fn is_true(&self) -> bool {
        self.value == Value::Bool(true)
    }

    /// Decode the value into `T`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, BackendError> {
        T::deserialize(&self.value)
            .map_err(|e| BackendError::Decode { key: self.key.clone(), reason: e.to_string() })
    }
}

/// Event delivered to a subscription.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendEvent {
    /// Subscription the event belongs to.
    pub subscription: SubscriptionId,
    /// What happened.
    pub kind: EventKind,
    /// Data at the time of the event.
    pub snapshot: Snapshot,
}

/// Server-side action executed when the transport detects disconnection.
#[derive(Debug, Clone, PartialEq)]
pub enum CleanupAction {
    /// Remove the node.
    Remove,
    /// Overwrite the node with a value.
    Set(Value),
}

/// Capability interface to a realtime-sync backend.
///
/// Implementations own subscription bookkeeping and deliver events in write
/// order per subscription. No ordering is promised across subscriptions.
///
/// # Invariants
///
/// - Every [`SubscriptionId`] returned is unique for the lifetime of the
///   implementation.
/// - After [`Backend::unsubscribe_all`] for a path, no new events are queued
///   for subscriptions on exactly that path. Events already queued may still
///   be delivered; consumers must treat them as no-ops.
/// - Write outcomes are final: implementations do not retry.
pub trait Backend {
    /// Start listening for `kind` changes at `path`.
    fn subscribe(&mut self, path: &DbPath, kind: EventKind) -> Result<SubscriptionId, BackendError>;

    /// Drop every subscription registered on `path` by this client.
    fn unsubscribe_all(&mut self, path: &DbPath);

    /// Create or overwrite the node at `path`.
    fn write(&mut self, path: &DbPath, value: Value) -> Result<(), BackendError>;

    /// Delete the node at `path`. Removing a missing node succeeds.
    fn remove(&mut self, path: &DbPath) -> Result<(), BackendError>;

    /// Arm `action` to run server-side once this client's transport
    /// disconnects.
    fn register_disconnect_cleanup(
        &mut self,
        path: &DbPath,
        action: CleanupAction,
    ) -> Result<(), BackendError>;

    /// Generate a fresh, chronologically ordered child key below `parent`.
    fn generate_key(&mut self, parent: &DbPath) -> String;
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::Channel;

    #[test]
    fn num_children_counts_objects_and_arrays() {
        assert_eq!(Snapshot::new("m", json!({ "a": 1, "b": 2 })).num_children(), 2);
        assert_eq!(Snapshot::new("m", json!([1, 2, 3])).num_children(), 3);
        assert_eq!(Snapshot::new("m", Value::Null).num_children(), 0);
        assert_eq!(Snapshot::new("m", json!("text")).num_children(), 0);
    }

    #[test]
    fn connection_flag_is_strict_bool() {
        assert!(Snapshot::new("connected", json!(true)).is_true());
        assert!(!Snapshot::new("connected", json!("true")).is_true());
        assert!(!Snapshot::new("connected", Value::Null).exists());
    }

    #[test]
    fn decode_failure_reports_key() {
        let err = Snapshot::new("c9", json!(42)).decode::<Channel>().unwrap_err();
        assert!(matches!(err, BackendError::Decode { ref key, .. } if key == "c9"));
    }
}
