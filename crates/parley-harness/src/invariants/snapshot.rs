//! Observable state snapshots for invariant checking.
//!
//! Snapshots capture the observable state of a session at a point in time.
//! Invariants operate on snapshots rather than live state to ensure
//! consistent, atomic checks.

use std::collections::HashMap;

use parley_app::{NotificationRecord, Session};
use parley_core::{Backend, ChannelId, PeerId};

/// Snapshot of one session's observable state.
#[derive(Debug, Clone, Default)]
pub struct SessionSnapshot {
    /// Signed-in peer.
    pub local_peer: PeerId,
    /// Open conversation id. `None` before the first channel arrives.
    pub active: Option<ChannelId>,
    /// True if the open conversation is a public channel.
    pub active_is_public: bool,
    /// True if the open conversation was listed in the roster or the starred
    /// list when it was opened. Carried over from the previous snapshot
    /// while the same conversation stays open.
    pub active_was_listed: bool,
    /// Roster channel ids in arrival order.
    pub roster: Vec<ChannelId>,
    /// Starred channel ids.
    pub starred: Vec<ChannelId>,
    /// Notification records.
    pub records: HashMap<ChannelId, NotificationRecord>,
    /// Peers listed in the sidebar.
    pub peers: Vec<PeerId>,
    /// Every `last_known_total` observed per channel, oldest first.
    pub last_known_history: HashMap<ChannelId, Vec<u64>>,
}

impl SessionSnapshot {
    /// Create an empty snapshot.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Capture `session`, extending the history of `previous` if given.
    pub fn capture<B: Backend>(session: &Session<B>, previous: Option<&Self>) -> Self {
        let records: HashMap<_, _> = session
            .notifications()
            .records()
            .map(|r| (r.channel_id.clone(), r.clone()))
            .collect();

        let mut last_known_history =
            previous.map(|p| p.last_known_history.clone()).unwrap_or_default();
        for record in records.values() {
            last_known_history
                .entry(record.channel_id.clone())
                .or_default()
                .push(record.last_known_total);
        }

        let current = session.current_channel();
        let active = current.map(|c| c.id.clone());
        let roster: Vec<ChannelId> = session.channels().iter().map(|c| c.id.clone()).collect();
        let starred: Vec<ChannelId> = session.starred().ids().cloned().collect();
        let listed_now =
            active.as_ref().is_some_and(|id| roster.contains(id) || starred.contains(id));
        let listed_before = previous
            .is_some_and(|p| p.active.is_some() && p.active == active && p.active_was_listed);

        Self {
            local_peer: session.local_user().id.clone(),
            active,
            active_is_public: current.is_some_and(|c| !c.is_private()),
            active_was_listed: listed_now || listed_before,
            roster,
            starred,
            records,
            peers: session.peers().iter().map(|p| p.peer_id.clone()).collect(),
            last_known_history,
        }
    }

    /// Set the open conversation.
    #[must_use]
    pub fn with_active(mut self, channel_id: impl Into<ChannelId>, public: bool) -> Self {
        self.active = Some(channel_id.into());
        self.active_is_public = public;
        self
    }

    /// Mark the open conversation as listed when it was opened.
    #[must_use]
    pub fn opened_from_list(mut self) -> Self {
        self.active_was_listed = true;
        self
    }

    /// Add a roster channel.
    #[must_use]
    pub fn with_channel(mut self, channel_id: impl Into<ChannelId>) -> Self {
        self.roster.push(channel_id.into());
        self
    }

    /// Add a notification record.
    #[must_use]
    pub fn with_record(mut self, record: NotificationRecord) -> Self {
        self.records.insert(record.channel_id.clone(), record);
        self
    }

    /// Record a `last_known_total` observation.
    pub fn record_last_known(&mut self, channel_id: impl Into<ChannelId>, total: u64) {
        self.last_known_history.entry(channel_id.into()).or_default().push(total);
    }
}
