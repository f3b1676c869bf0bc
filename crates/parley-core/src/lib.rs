//! Parley core
//!
//! Shared vocabulary for the Parley chat client: the realtime backend
//! capability trait, database paths, subscription events, the channel and
//! peer data model, and the error types used across the workspace.
//!
//! # Architecture
//!
//! The client never talks to a concrete realtime service. State machines in
//! `parley-app` receive a [`Backend`] at construction, issue subscriptions and
//! writes through it, and are fed the resulting [`BackendEvent`]s by their
//! owner. Production code plugs in a hosted-service adapter; tests plug in the
//! in-memory database from `parley-harness`.
//!
//! # Components
//!
//! - [`Backend`]: subscribe, write, remove, disconnect cleanup, push keys
//! - [`DbPath`]: slash-separated location in the realtime database
//! - [`BackendEvent`] / [`Snapshot`]: data delivered to subscriptions
//! - [`Channel`], [`PeerProfile`], [`PresenceStatus`]: data model
//! - [`BackendError`], [`ValidationError`]: error taxonomy

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod backend;
mod error;
mod model;
mod path;

pub use backend::{Backend, BackendEvent, CleanupAction, EventKind, Snapshot, SubscriptionId};
pub use error::{BackendError, ValidationError};
pub use model::{Channel, ChannelId, Creator, PeerId, PeerProfile, PresenceStatus};
pub use path::DbPath;
