//! Session state machine.
//!
//! The [`Session`] owns the channel roster, the notification reconciler, the
//! presence tracker and the starred list for one signed-in user. It receives
//! its [`Backend`] at construction, subscribes on [`Session::start`], and is
//! driven by feeding it [`BackendEvent`]s and user actions. Every entry point
//! returns [`AppAction`]s telling the UI what to redraw.
//!
//! # Subscriptions
//!
//! | path                        | kind                     | consumer         |
//! |-----------------------------|--------------------------|------------------|
//! | `channels`                  | entry added              | roster           |
//! | `messages/<channel>`        | value changed            | reconciler       |
//! | `users`                     | entry added              | presence         |
//! | `.info/connected`           | connection state changed | presence         |
//! | `presence`                  | entry added / removed    | presence         |
//! | `users/<local>/starred`     | entry added / removed    | starred list     |
//!
//! # Lifecycle
//!
//! [`Session::teardown`] releases every subscription. Events that were
//! already queued still reach [`Session::handle`] and are dropped there.

use std::collections::HashMap;

use parley_core::{
    Backend, BackendError, BackendEvent, Channel, ChannelId, DbPath, EventKind, PeerProfile,
    PresenceStatus, Snapshot, SubscriptionId, ValidationError,
};

use crate::{
    AppAction, ChannelKind, ChannelRoster, CurrentChannel, LocalUser, NotificationReconciler,
    NotificationRecord, PresenceCommand, PresenceEntry, PresenceTracker, SessionConfig,
    SessionError, StarredChannels, direct_channel_id,
};

/// Consumer of a subscription's events.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Route {
    Channels,
    MessageCount(ChannelId),
    Directory,
    Connection,
    PresenceAdded,
    PresenceRemoved,
    StarredAdded,
    StarredRemoved,
}

/// Client session for one signed-in user.
///
/// Pure state machine over an injected backend: no globals, no background
/// work. All state is rebuilt from backend event replay.
pub struct Session<B: Backend> {
    backend: B,
    config: SessionConfig,
    local: LocalUser,
    roster: ChannelRoster,
    notifications: NotificationReconciler,
    presence: PresenceTracker,
    starred: StarredChannels,
    /// Open conversation. `None` until the first channel arrives.
    current: Option<CurrentChannel>,
    /// Live subscriptions and where their events go.
    routes: HashMap<SubscriptionId, (DbPath, Route)>,
    started: bool,
    torn_down: bool,
}

impl<B: Backend> Session<B> {
    /// Create a session for `local` over `backend`.
    pub fn new(backend: B, local: LocalUser, config: SessionConfig) -> Self {
        let presence =
            PresenceTracker::new(local.id.clone(), config.layout.presence_marker(&local.id));
        let notifications = NotificationReconciler::new(config.unread_policy);

        Self {
            backend,
            config,
            local,
            roster: ChannelRoster::new(),
            notifications,
            presence,
            starred: StarredChannels::new(),
            current: None,
            routes: HashMap::new(),
            started: false,
            torn_down: false,
        }
    }

    /// Register the session's subscriptions.
    ///
    /// Calling it again is a no-op. If a subscription is refused, the ones
    /// already made are released and the error is returned.
    pub fn start(&mut self) -> Result<(), SessionError> {
        self.ensure_live()?;
        if self.started {
            tracing::debug!("session already started");
            return Ok(());
        }

        let layout = &self.config.layout;
        let starred = layout.starred_path(&self.local.id);
        let subscriptions = [
            (layout.channels_path(), EventKind::EntryAdded, Route::Channels),
            (layout.users_path(), EventKind::EntryAdded, Route::Directory),
            (layout.connected_path(), EventKind::ConnectionStateChanged, Route::Connection),
            (layout.presence_path(), EventKind::EntryAdded, Route::PresenceAdded),
            (layout.presence_path(), EventKind::EntryRemoved, Route::PresenceRemoved),
            (starred.clone(), EventKind::EntryAdded, Route::StarredAdded),
            (starred, EventKind::EntryRemoved, Route::StarredRemoved),
        ];

        for (path, kind, route) in subscriptions {
            if let Err(e) = self.subscribe(path, kind, route) {
                tracing::warn!(error = %e, "session start failed");
                self.release_subscriptions();
                return Err(e.into());
            }
        }

        self.started = true;
        tracing::info!(user = %self.local.id, "session started");
        Ok(())
    }

    /// Process a backend event and return render actions.
    ///
    /// Events for unknown subscriptions, and all events after teardown, are
    /// dropped.
    pub fn handle(&mut self, event: BackendEvent) -> Vec<AppAction> {
        if self.torn_down {
            tracing::debug!(subscription = %event.subscription, "event after teardown dropped");
            return vec![];
        }
        let Some((_, route)) = self.routes.get(&event.subscription) else {
            tracing::debug!(subscription = %event.subscription, "event for unknown subscription");
            return vec![];
        };

        let snapshot = event.snapshot;
        match route.clone() {
            Route::Channels => self.on_channel_arrived(&snapshot),
            Route::MessageCount(channel_id) => {
                self.on_message_count(&channel_id, snapshot.num_children())
            },
            Route::Directory => self.on_directory_entry(&snapshot),
            Route::Connection => self.on_connection_changed(snapshot.is_true()),
            Route::PresenceAdded => {
                if self.presence.on_presence_registry_entry_added(&snapshot.key) {
                    vec![AppAction::RenderPeerStatus { peer_id: snapshot.key }]
                } else {
                    vec![]
                }
            },
            Route::PresenceRemoved => {
                if self.presence.on_presence_registry_entry_removed(&snapshot.key) {
                    vec![AppAction::RenderPeerStatus { peer_id: snapshot.key }]
                } else {
                    vec![]
                }
            },
            Route::StarredAdded => match decode_channel(&snapshot) {
                Some(channel) => {
                    if self.starred.on_entry_added(channel) {
                        vec![AppAction::RenderStarred]
                    } else {
                        vec![]
                    }
                },
                None => vec![],
            },
            Route::StarredRemoved => {
                // An open bookmark-only channel stays open as a snapshot in
                // `current`.
                if self.starred.on_entry_removed(&snapshot.key) {
                    vec![AppAction::RenderStarred]
                } else {
                    vec![]
                }
            },
        }
    }

    /// Create a channel from the new-channel form.
    ///
    /// Both fields must be non-blank. The channel is written under a fresh
    /// push key and enters the roster once the backend echoes it back.
    /// Returns the new channel id.
    pub fn create_channel(
        &mut self,
        name: &str,
        description: &str,
    ) -> Result<ChannelId, SessionError> {
        self.ensure_live()?;

        let name = name.trim();
        let description = description.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyField { field: "name" }.into());
        }
        if description.is_empty() {
            return Err(ValidationError::EmptyField { field: "description" }.into());
        }

        let parent = self.config.layout.channels_path();
        let key = self.backend.generate_key(&parent);
        let channel = Channel::new(key.clone(), name, description, self.local.as_creator());
        let path = parent.child(&key);

        self.write_logged(&path, channel.to_value())?;
        tracing::info!(channel = %key, name, "channel created");
        Ok(key)
    }

    /// Switch to a channel from the roster or the starred list.
    ///
    /// Resets the channel's unread count, publishes it as the open
    /// conversation, then marks the previous conversation inactive.
    pub fn select_channel(&mut self, channel_id: &str) -> Result<Vec<AppAction>, SessionError> {
        self.ensure_live()?;
        let channel = self
            .roster
            .get(channel_id)
            .or_else(|| self.starred.get(channel_id))
            .ok_or_else(|| SessionError::UnknownChannel(channel_id.to_owned()))?;

        let next = CurrentChannel::public(channel);
        Ok(self.switch_to(next))
    }

    /// Open a direct conversation with a peer from the directory.
    pub fn select_direct_peer(&mut self, peer_id: &str) -> Result<Vec<AppAction>, SessionError> {
        self.ensure_live()?;
        let entry =
            self.presence.entry(peer_id).ok_or_else(|| SessionError::UnknownPeer(peer_id.into()))?;

        let next = CurrentChannel {
            id: direct_channel_id(&self.local.id, peer_id),
            name: entry.profile.name.clone(),
            kind: ChannelKind::Direct { peer: peer_id.to_owned() },
        };
        Ok(self.switch_to(next))
    }

    /// Bookmark a roster channel for the local user.
    pub fn star_channel(&mut self, channel_id: &str) -> Result<(), SessionError> {
        self.ensure_live()?;
        let channel = self
            .roster
            .get(channel_id)
            .ok_or_else(|| SessionError::UnknownChannel(channel_id.to_owned()))?;

        let path = self.config.layout.starred_path(&self.local.id).child(&channel.id);
        let value = channel.to_value();
        self.write_logged(&path, value)
    }

    /// Remove a bookmark.
    pub fn unstar_channel(&mut self, channel_id: &str) -> Result<(), SessionError> {
        self.ensure_live()?;
        if !self.starred.contains(channel_id) {
            return Err(SessionError::UnknownChannel(channel_id.to_owned()));
        }

        let path = self.config.layout.starred_path(&self.local.id).child(channel_id);
        self.backend.remove(&path).map_err(|e| {
            tracing::warn!(%path, error = %e, "unstar failed");
            e.into()
        })
    }

    /// Release every subscription. Idempotent.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.release_subscriptions();
        self.torn_down = true;
        tracing::info!(user = %self.local.id, "session torn down");
    }

    /// Channels in arrival order.
    pub fn channels(&self) -> &[Channel] {
        self.roster.channels()
    }

    /// Channel roster.
    pub fn roster(&self) -> &ChannelRoster {
        &self.roster
    }

    /// Id of the open conversation. `None` until one is selected.
    pub fn active_channel_id(&self) -> Option<&str> {
        self.current.as_ref().map(|c| c.id.as_str())
    }

    /// Open conversation. `None` until one is selected.
    pub fn current_channel(&self) -> Option<&CurrentChannel> {
        self.current.as_ref()
    }

    /// Unread badge count. `None` if zero or the channel is untracked.
    pub fn unread_count(&self, channel_id: &str) -> Option<u64> {
        self.notifications.unread_count(channel_id)
    }

    /// Notification record of a channel. `None` if untracked.
    pub fn notification(&self, channel_id: &str) -> Option<&NotificationRecord> {
        self.notifications.record(channel_id)
    }

    /// Notification reconciler.
    pub fn notifications(&self) -> &NotificationReconciler {
        &self.notifications
    }

    /// Status of a peer. Unknown peers read as offline.
    pub fn peer_status(&self, peer_id: &str) -> PresenceStatus {
        self.presence.status(peer_id)
    }

    /// Peers from the directory, excluding the local user.
    pub fn peers(&self) -> &[PresenceEntry] {
        self.presence.peers()
    }

    /// Starred channels.
    pub fn starred(&self) -> &StarredChannels {
        &self.starred
    }

    /// Signed-in user.
    pub fn local_user(&self) -> &LocalUser {
        &self.local
    }

    /// Session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Number of live subscriptions.
    pub fn subscription_count(&self) -> usize {
        self.routes.len()
    }

    /// True once [`Session::start`] succeeded.
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// True once [`Session::teardown`] ran.
    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Backend the session was built with.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Mutable access to the backend, for drivers that pull events from it.
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    fn on_channel_arrived(&mut self, snapshot: &Snapshot) -> Vec<AppAction> {
        let Some(channel) = decode_channel(snapshot) else {
            return vec![];
        };
        if self.roster.get(&channel.id).is_some() {
            tracing::debug!(channel = %channel.id, "channel already in roster");
            return vec![];
        }

        let channel_id = channel.id.clone();
        let first = self.roster.on_channel_arrived(channel.clone());

        let mut actions = vec![AppAction::RenderChannels];
        if first.is_some() {
            actions.extend(self.switch_to(CurrentChannel::public(&channel)));
        }

        let path = self.config.layout.messages_path(&channel_id);
        let route = Route::MessageCount(channel_id.clone());
        if let Err(e) = self.subscribe(path, EventKind::ValueChanged, route) {
            tracing::warn!(channel = %channel_id, error = %e, "cannot watch message count");
        }
        actions
    }

    fn on_message_count(&mut self, channel_id: &str, total: u64) -> Vec<AppAction> {
        let active = self.current.as_ref().map(|c| c.id.as_str());
        self.notifications.on_message_count_observed(channel_id, total, active);
        vec![AppAction::RenderBadge { channel_id: channel_id.to_owned() }]
    }

    fn on_directory_entry(&mut self, snapshot: &Snapshot) -> Vec<AppAction> {
        let profile: PeerProfile = match snapshot.decode() {
            Ok(profile) => profile,
            Err(e) => {
                tracing::warn!(error = %e, "dropping undecodable directory entry");
                return vec![];
            },
        };
        if self.presence.on_peer_directory_entry_added(&snapshot.key, profile) {
            vec![AppAction::RenderPeers]
        } else {
            vec![]
        }
    }

    fn on_connection_changed(&mut self, connected: bool) -> Vec<AppAction> {
        tracing::info!(connected, "connection state changed");

        for command in self.presence.on_local_session_connected(connected) {
            match command {
                PresenceCommand::Write { path, value } => {
                    if let Err(e) = self.backend.write(&path, value) {
                        tracing::warn!(%path, error = %e, "presence marker write failed");
                    }
                },
                PresenceCommand::ArmDisconnectCleanup { path, action } => {
                    if let Err(e) = self.backend.register_disconnect_cleanup(&path, action) {
                        tracing::warn!(%path, error = %e, "presence cleanup not armed");
                    }
                },
            }
        }
        vec![]
    }

    /// Make `next` the open conversation.
    ///
    /// Order matters to observers: the target's badge is reset first, then
    /// the change is published, then the previous conversation is marked
    /// inactive.
    fn switch_to(&mut self, next: CurrentChannel) -> Vec<AppAction> {
        let previous = self.current.as_ref().map(|c| c.id.clone());
        let mut actions = Vec::new();

        if self.notifications.on_channel_activated(&next.id) {
            actions.push(AppAction::RenderBadge { channel_id: next.id.clone() });
        }

        self.current = Some(next.clone());
        actions.push(AppAction::ActiveChannelChanged(next.clone()));

        let highlighted = match next.kind {
            ChannelKind::Public => self.roster.select(&next.id).is_some(),
            ChannelKind::Direct { .. } => false,
        };
        if !highlighted {
            self.roster.clear_active();
        }
        if let Some(previous) = previous.filter(|p| *p != next.id) {
            if self.notifications.on_channel_deactivated(&previous) {
                actions.push(AppAction::RenderBadge { channel_id: previous });
            }
        }

        actions.extend([AppAction::RenderChannels, AppAction::RenderStarred, AppAction::RenderPeers]);
        actions
    }

    fn subscribe(&mut self, path: DbPath, kind: EventKind, route: Route) -> Result<(), BackendError> {
        let subscription = self.backend.subscribe(&path, kind)?;
        tracing::debug!(%path, ?kind, %subscription, "subscribed");
        self.routes.insert(subscription, (path, route));
        Ok(())
    }

    fn release_subscriptions(&mut self) {
        let mut paths: Vec<DbPath> = self.routes.drain().map(|(_, (path, _))| path).collect();
        paths.sort();
        paths.dedup();
        for path in &paths {
            self.backend.unsubscribe_all(path);
        }
    }

    fn write_logged(&mut self, path: &DbPath, value: serde_json::Value) -> Result<(), SessionError> {
        self.backend.write(path, value).map_err(|e| {
            tracing::warn!(%path, error = %e, "backend write failed");
            e.into()
        })
    }

    fn ensure_live(&self) -> Result<(), SessionError> {
        if self.torn_down { Err(SessionError::TornDown) } else { Ok(()) }
    }
}

/// Decode a channel snapshot; the snapshot key is authoritative for the id.
fn decode_channel(snapshot: &Snapshot) -> Option<Channel> {
    match snapshot.decode::<Channel>() {
        Ok(mut channel) => {
            channel.id.clone_from(&snapshot.key);
            Some(channel)
        },
        Err(e) => {
            tracing::warn!(error = %e, "dropping undecodable channel");
            None
        },
    }
}
