//! Session configuration.
//!
//! Defaults reproduce the database layout and upload allow-list the hosted
//! deployment already uses, so an empty config file behaves like no config.

use parley_core::{DbPath, PeerId};
use serde::Deserialize;

/// How unread counts react to repeated observations while a channel is not
/// active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnreadPolicy {
    /// Unread count is the distance between the newest observed total and the
    /// last acknowledged baseline.
    #[default]
    Replace,
    /// Unread count grows by the difference between consecutive observed
    /// totals.
    Accumulate,
}

/// Locations of the collections the session subscribes to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DbLayout {
    /// Channel definitions, one child per channel.
    pub channels: String,
    /// Messages, one child per channel holding one child per message.
    pub messages: String,
    /// Peer directory, one child per peer.
    pub users: String,
    /// Presence registry, one child per connected peer.
    pub presence: String,
    /// Connection flag of the local transport.
    pub connected: String,
    /// Name of the per-user child that holds starred channels.
    pub starred: String,
}

impl Default for DbLayout {
    fn default() -> Self {
        Self {
            channels: "channels".into(),
            messages: "messages".into(),
            users: "users".into(),
            presence: "presence".into(),
            connected: ".info/connected".into(),
            starred: "starred".into(),
        }
    }
}

impl DbLayout {
    /// Root of the channel collection.
    pub fn channels_path(&self) -> DbPath {
        DbPath::new(&self.channels)
    }

    /// Message collection of one channel.
    pub fn messages_path(&self, channel_id: &str) -> DbPath {
        DbPath::new(&self.messages).child(channel_id)
    }

    /// Root of the peer directory.
    pub fn users_path(&self) -> DbPath {
        DbPath::new(&self.users)
    }

    /// Root of the presence registry.
    pub fn presence_path(&self) -> DbPath {
        DbPath::new(&self.presence)
    }

    /// Presence marker of one peer.
    pub fn presence_marker(&self, peer_id: &str) -> DbPath {
        self.presence_path().child(peer_id)
    }

    /// Connection flag path.
    pub fn connected_path(&self) -> DbPath {
        DbPath::new(&self.connected)
    }

    /// Starred channels of one peer.
    pub fn starred_path(&self, peer_id: &PeerId) -> DbPath {
        self.users_path().child(peer_id).child(&self.starred)
    }
}

/// Configuration for a [`crate::Session`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Database layout.
    pub layout: DbLayout,
    /// Unread count update policy.
    pub unread_policy: UnreadPolicy,
    /// MIME types accepted by the upload modal.
    pub allowed_upload_types: Vec<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            layout: DbLayout::default(),
            unread_policy: UnreadPolicy::default(),
            allowed_upload_types: vec!["image/jpeg".into(), "image/png".into()],
        }
    }
}
