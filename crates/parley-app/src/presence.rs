//! Peer presence tracking.
//!
//! Peers are enumerated from the directory and start offline. The sparse
//! presence registry flips them online while a marker exists. The local
//! session announces itself by writing its own marker and arming a
//! server-side cleanup that removes it on disconnect; no heartbeat runs on
//! the client.

use parley_core::{CleanupAction, DbPath, PeerId, PeerProfile, PresenceStatus};
use serde_json::Value;

/// A peer known from the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceEntry {
    /// Peer identifier.
    pub peer_id: PeerId,
    /// Directory profile.
    pub profile: PeerProfile,
    /// Current status.
    pub status: PresenceStatus,
}

/// Backend operations requested by the tracker.
#[derive(Debug, Clone, PartialEq)]
pub enum PresenceCommand {
    /// Write the local presence marker.
    Write {
        /// Marker path.
        path: DbPath,
        /// Marker value.
        value: Value,
    },
    /// Arm server-side cleanup of the marker on disconnect.
    ArmDisconnectCleanup {
        /// Marker path.
        path: DbPath,
        /// Cleanup to run.
        action: CleanupAction,
    },
}

/// Online/offline state per peer, excluding the local peer.
#[derive(Debug, Clone)]
pub struct PresenceTracker {
    local_peer: PeerId,
    marker_path: DbPath,
    peers: Vec<PresenceEntry>,
}

impl PresenceTracker {
    /// Create a tracker for `local_peer`, whose marker lives at `marker_path`.
    pub fn new(local_peer: impl Into<PeerId>, marker_path: DbPath) -> Self {
        Self { local_peer: local_peer.into(), marker_path, peers: Vec::new() }
    }

    /// Identifier of the local peer.
    pub fn local_peer(&self) -> &str {
        &self.local_peer
    }

    /// Register a peer from the directory as offline.
    ///
    /// Returns `false` for the local peer and for peers already known.
    pub fn on_peer_directory_entry_added(&mut self, peer_id: &str, profile: PeerProfile) -> bool {
        if peer_id == self.local_peer || self.entry(peer_id).is_some() {
            return false;
        }
        self.peers.push(PresenceEntry {
            peer_id: peer_id.to_owned(),
            profile,
            status: PresenceStatus::Offline,
        });
        true
    }

    /// Commands announcing the local session after a connection change.
    ///
    /// A live transport yields exactly one marker write and one cleanup
    /// registration. A dropped transport yields nothing; the backend removes
    /// the marker itself.
    pub fn on_local_session_connected(&self, connected: bool) -> Vec<PresenceCommand> {
        if !connected {
            return Vec::new();
        }
        vec![
            PresenceCommand::Write { path: self.marker_path.clone(), value: Value::Bool(true) },
            PresenceCommand::ArmDisconnectCleanup {
                path: self.marker_path.clone(),
                action: CleanupAction::Remove,
            },
        ]
    }

    /// A presence marker appeared. Returns `true` if a status changed.
    pub fn on_presence_registry_entry_added(&mut self, peer_id: &str) -> bool {
        self.set_status(peer_id, PresenceStatus::Online)
    }

    /// A presence marker disappeared. Returns `true` if a status changed.
    pub fn on_presence_registry_entry_removed(&mut self, peer_id: &str) -> bool {
        self.set_status(peer_id, PresenceStatus::Offline)
    }

    /// Status of a peer. Unknown peers read as offline.
    pub fn status(&self, peer_id: &str) -> PresenceStatus {
        self.entry(peer_id).map_or(PresenceStatus::Offline, |e| e.status)
    }

    /// Entry for a peer. `None` if not in the directory.
    pub fn entry(&self, peer_id: &str) -> Option<&PresenceEntry> {
        self.peers.iter().find(|e| e.peer_id == peer_id)
    }

    /// Known peers in directory order.
    pub fn peers(&self) -> &[PresenceEntry] {
        &self.peers
    }

    fn set_status(&mut self, peer_id: &str, status: PresenceStatus) -> bool {
        if peer_id == self.local_peer {
            return false;
        }
        // Directory and registry listeners race; a marker for an unknown
        // peer is dropped.
        match self.peers.iter_mut().find(|e| e.peer_id == peer_id) {
            Some(entry) if entry.status != status => {
                entry.status = status;
                true
            },
            Some(_) => false,
            None => {
                tracing::debug!(peer = peer_id, %status, "presence change for unknown peer");
                false
            },
        }
    }
}
