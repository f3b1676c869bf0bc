//! Starred channel bookmarks, mirrored from the user's `starred` node.

use parley_core::{Channel, ChannelId};

/// Starred channels in the order they were starred.
#[derive(Debug, Clone, Default)]
pub struct StarredChannels {
    channels: Vec<Channel>,
}

impl StarredChannels {
    /// Create an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// A bookmark appeared. Returns `false` if it was already listed.
    pub fn on_entry_added(&mut self, channel: Channel) -> bool {
        if self.contains(&channel.id) {
            return false;
        }
        self.channels.push(channel);
        true
    }

    /// A bookmark disappeared. Returns `false` if it was not listed.
    pub fn on_entry_removed(&mut self, channel_id: &str) -> bool {
        let before = self.channels.len();
        self.channels.retain(|c| c.id != channel_id);
        self.channels.len() != before
    }

    /// True if `channel_id` is starred.
    pub fn contains(&self, channel_id: &str) -> bool {
        self.get(channel_id).is_some()
    }

    /// Starred channel by id.
    pub fn get(&self, channel_id: &str) -> Option<&Channel> {
        self.channels.iter().find(|c| c.id == channel_id)
    }

    /// Starred channels.
    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    /// Ids of starred channels.
    pub fn ids(&self) -> impl Iterator<Item = &ChannelId> {
        self.channels.iter().map(|c| &c.id)
    }

    /// Number of starred channels.
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// True if nothing is starred.
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}
