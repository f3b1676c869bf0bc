//! Application layer for Parley
//!
//! Pure state machines for the chat sidebar: channel roster, unread
//! reconciliation, presence and starred channels. They run against an
//! injected [`parley_core::Backend`], so the same code runs in production and
//! in deterministic tests.
//!
//! # Components
//!
//! - [`Session`]: owns all sidebar state, routes backend events, user actions
//! - [`NotificationReconciler`]: per-channel unread counts
//! - [`PresenceTracker`]: peer directory and online status
//! - [`ChannelRoster`]: channel list and highlighted channel
//! - [`StarredChannels`]: bookmarked channels
//! - [`UploadModal`], [`UserPanel`]: media upload and account menu
//! - [`Runtime`]: generic loop feeding backend events through a [`Driver`]

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod account;
mod action;
mod config;
mod error;
mod notifications;
mod presence;
mod roster;
mod runtime;
mod session;
mod starred;
mod state;
mod upload;

pub use account::{Authenticator, UserMenuOption, UserPanel};
pub use action::AppAction;
pub use config::{DbLayout, SessionConfig, UnreadPolicy};
pub use error::SessionError;
pub use notifications::{NotificationReconciler, NotificationRecord};
pub use presence::{PresenceCommand, PresenceEntry, PresenceTracker};
pub use roster::{ChannelRoster, ChannelSwitch};
pub use runtime::{Driver, EventSource, Runtime, RuntimeError};
pub use session::Session;
pub use starred::StarredChannels;
pub use state::{ChannelKind, CurrentChannel, LocalUser, direct_channel_id};
pub use upload::{FileStore, SelectedFile, UploadMetadata, UploadModal, content_type_of};
