//! Channel roster.
//!
//! Channels are kept in arrival order. The first channel to arrive in a
//! session is selected automatically, once.

use parley_core::{Channel, ChannelId};

/// Outcome of a channel switch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelSwitch {
    /// Channel that was highlighted before. `None` if there was none.
    pub previous: Option<ChannelId>,
    /// Channel highlighted now.
    pub current: ChannelId,
}

/// Ordered channel list plus the highlighted channel.
#[derive(Debug, Clone)]
pub struct ChannelRoster {
    channels: Vec<Channel>,
    active: Option<ChannelId>,
    initial_load: bool,
}

impl Default for ChannelRoster {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelRoster {
    /// Create an empty roster awaiting its first channel.
    pub fn new() -> Self {
        Self { channels: Vec::new(), active: None, initial_load: true }
    }

    /// Append a channel delivered by the backend.
    ///
    /// Returns `Some(id)` when this is the first arrival of the session and
    /// the channel became active. Duplicate ids are ignored.
    pub fn on_channel_arrived(&mut self, channel: Channel) -> Option<ChannelId> {
        if self.get(&channel.id).is_some() {
            tracing::debug!(channel = %channel.id, "duplicate channel arrival ignored");
            return None;
        }

        let id = channel.id.clone();
        self.channels.push(channel);

        if !self.initial_load {
            return None;
        }
        self.initial_load = false;
        self.active = Some(id.clone());
        Some(id)
    }

    /// Highlight `channel_id`. `None` if the channel is not in the roster.
    pub fn select(&mut self, channel_id: &str) -> Option<ChannelSwitch> {
        self.get(channel_id)?;
        let current = channel_id.to_owned();
        let previous = self.active.replace(current.clone());
        Some(ChannelSwitch { previous, current })
    }

    /// Remove the highlight, returning the channel that had it.
    pub fn clear_active(&mut self) -> Option<ChannelId> {
        self.active.take()
    }

    /// Channel by id.
    pub fn get(&self, channel_id: &str) -> Option<&Channel> {
        self.channels.iter().find(|c| c.id == channel_id)
    }

    /// Channels in arrival order.
    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    /// Highlighted channel. `None` before the first arrival or while a
    /// direct conversation is open.
    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Number of channels.
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// True if no channel has arrived.
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use parley_core::Creator;

    use super::*;

    fn channel(id: &str) -> Channel {
        Channel::new(id, id, "", Creator::default())
    }

    #[test]
    fn first_arrival_becomes_active_once() {
        let mut roster = ChannelRoster::new();
        assert_eq!(roster.on_channel_arrived(channel("general")), Some("general".into()));
        assert_eq!(roster.on_channel_arrived(channel("random")), None);

        assert_eq!(roster.active(), Some("general"));
        let ids: Vec<_> = roster.channels().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["general", "random"]);
    }

    #[test]
    fn first_arrival_wins_even_after_clear() {
        let mut roster = ChannelRoster::new();
        roster.on_channel_arrived(channel("general"));
        roster.clear_active();

        assert_eq!(roster.on_channel_arrived(channel("random")), None);
        assert_eq!(roster.active(), None);
    }

    #[test]
    fn duplicate_arrival_ignored() {
        let mut roster = ChannelRoster::new();
        roster.on_channel_arrived(channel("general"));
        roster.on_channel_arrived(channel("general"));
        assert_eq!(roster.len(), 1);
    }

    #[test]
    fn select_reports_previous() {
        let mut roster = ChannelRoster::new();
        roster.on_channel_arrived(channel("general"));
        roster.on_channel_arrived(channel("random"));

        let switch = roster.select("random").unwrap();
        assert_eq!(switch.previous.as_deref(), Some("general"));
        assert_eq!(switch.current, "random");

        // unknown channels are ignored
        assert!(roster.select("missing").is_none());
        assert_eq!(roster.active(), Some("random"));
    }
}
