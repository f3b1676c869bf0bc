//! Observable session state types.
//!
//! View-model structures the UI renders from: who is signed in and which
//! conversation is open.

use parley_core::{Channel, ChannelId, Creator, PeerId};

/// The signed-in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalUser {
    /// Peer id of the user.
    pub id: PeerId,
    /// Display name.
    pub name: String,
    /// Avatar URL. `None` if the user has none.
    pub avatar: Option<String>,
}

impl LocalUser {
    /// Create a local user.
    pub fn new(id: impl Into<PeerId>, name: impl Into<String>) -> Self {
        Self { id: id.into(), name: name.into(), avatar: None }
    }

    /// Set the avatar URL.
    #[must_use]
    pub fn with_avatar(mut self, avatar: impl Into<String>) -> Self {
        self.avatar = Some(avatar.into());
        self
    }

    /// Creator snapshot stamped on channels this user creates.
    pub fn as_creator(&self) -> Creator {
        Creator { name: self.name.clone(), avatar_url: self.avatar.clone() }
    }
}

/// What kind of conversation is open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelKind {
    /// A public channel from the roster or the starred list.
    Public,
    /// A private conversation with one peer.
    Direct {
        /// The other participant.
        peer: PeerId,
    },
}

/// The open conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentChannel {
    /// Channel id (for direct conversations, see [`direct_channel_id`]).
    pub id: ChannelId,
    /// Display name.
    pub name: String,
    /// Public or direct.
    pub kind: ChannelKind,
}

impl CurrentChannel {
    /// Open a public channel.
    pub fn public(channel: &Channel) -> Self {
        Self { id: channel.id.clone(), name: channel.name.clone(), kind: ChannelKind::Public }
    }

    /// True for direct conversations.
    pub fn is_private(&self) -> bool {
        matches!(self.kind, ChannelKind::Direct { .. })
    }
}

/// Channel id shared by both participants of a direct conversation.
///
/// The smaller id (byte order) comes first, so both sides derive the same
/// value.
pub fn direct_channel_id(local: &str, peer: &str) -> ChannelId {
    if peer < local { format!("{peer}/{local}") } else { format!("{local}/{peer}") }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_channel_id_is_symmetric() {
        assert_eq!(direct_channel_id("bob", "alice"), "alice/bob");
        assert_eq!(direct_channel_id("alice", "bob"), "alice/bob");
    }

    #[test]
    fn creator_snapshot_copies_profile() {
        let user = LocalUser::new("u1", "Ada").with_avatar("http://img/ada.png");
        let creator = user.as_creator();

        assert_eq!(creator.name, "Ada");
        assert_eq!(creator.avatar_url.as_deref(), Some("http://img/ada.png"));
    }
}
