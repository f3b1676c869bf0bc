//! Render intents produced by the session.
//!
//! This module defines [`AppAction`], the instructions the [`crate::Session`]
//! returns for the UI layer. Each action names the smallest region that
//! needs redrawing.

use parley_core::{ChannelId, PeerId};

use crate::CurrentChannel;

/// Actions produced by the Session state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    /// Redraw the channel list.
    RenderChannels,

    /// Redraw one channel's unread badge.
    RenderBadge {
        /// Channel whose badge changed.
        channel_id: ChannelId,
    },

    /// Redraw the direct-message peer list.
    RenderPeers,

    /// Redraw one peer's status indicator.
    RenderPeerStatus {
        /// Peer whose status changed.
        peer_id: PeerId,
    },

    /// Redraw the starred list.
    RenderStarred,

    /// The open conversation changed.
    ActiveChannelChanged(CurrentChannel),
}
