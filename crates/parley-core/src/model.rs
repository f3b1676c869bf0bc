//! Channel and peer data model.
//!
//! Field names on the wire follow the layout the hosted database already
//! holds (`desc`, `createdBy`, `avatar`), so existing data decodes unchanged.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Channel identifier (the backend push key).
pub type ChannelId = String;

/// Peer (user) identifier.
pub type PeerId = String;

/// A named conversation stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    /// Unique channel id. Filled from the snapshot key when absent.
    #[serde(default)]
    pub id: ChannelId,
    /// Display name.
    pub name: String,
    /// Free-form description.
    #[serde(rename = "desc", default)]
    pub description: String,
    /// Creator snapshot taken at creation time.
    #[serde(rename = "createdBy", default)]
    pub created_by: Creator,
}

impl Channel {
    /// Create a channel record.
    pub fn new(
        id: impl Into<ChannelId>,
        name: impl Into<String>,
        description: impl Into<String>,
        created_by: Creator,
    ) -> Self {
        Self { id: id.into(), name: name.into(), description: description.into(), created_by }
    }

    /// Database value of the channel, in wire field names.
    pub fn to_value(&self) -> Value {
        let mut creator = Map::new();
        creator.insert("name".into(), Value::String(self.created_by.name.clone()));
        if let Some(avatar) = &self.created_by.avatar_url {
            creator.insert("avatar".into(), Value::String(avatar.clone()));
        }
        json!({
            "id": self.id,
            "name": self.name,
            "desc": self.description,
            "createdBy": creator,
        })
    }
}

/// Who created a channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Creator {
    /// Display name at creation time.
    pub name: String,
    /// Avatar URL at creation time.
    #[serde(rename = "avatar", default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// Directory entry for a peer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerProfile {
    /// Display name.
    #[serde(alias = "displayName")]
    pub name: String,
    /// Avatar URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl PeerProfile {
    /// Profile with a name and no avatar.
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into(), avatar: None }
    }
}

/// Online status of a peer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PresenceStatus {
    /// A presence marker exists for the peer.
    Online,
    /// No presence marker, or the peer was never seen in the registry.
    #[default]
    Offline,
}

impl PresenceStatus {
    /// True for [`PresenceStatus::Online`].
    pub fn is_online(self) -> bool {
        self == Self::Online
    }
}

impl fmt::Display for PresenceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Online => f.write_str("online"),
            Self::Offline => f.write_str("offline"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_uses_wire_field_names() {
        let channel = Channel::new(
            "c1",
            "general",
            "talk",
            Creator { name: "Ada".into(), avatar_url: Some("http://a/x.png".into()) },
        );

        let value = serde_json::to_value(&channel).unwrap();
        assert_eq!(channel.to_value(), value);
        assert_eq!(
            value,
            json!({
                "id": "c1",
                "name": "general",
                "desc": "talk",
                "createdBy": { "name": "Ada", "avatar": "http://a/x.png" }
            })
        );
    }

    #[test]
    fn channel_tolerates_missing_optional_fields() {
        let channel: Channel = serde_json::from_value(json!({ "name": "random" })).unwrap();
        assert_eq!(channel.id, "");
        assert_eq!(channel.description, "");
        assert_eq!(channel.created_by, Creator::default());
    }

    #[test]
    fn profile_accepts_display_name_alias() {
        let profile: PeerProfile =
            serde_json::from_value(json!({ "displayName": "Bob", "starred": {} })).unwrap();
        assert_eq!(profile, PeerProfile::named("Bob"));
    }

    #[test]
    fn unknown_peer_status_defaults_offline() {
        assert_eq!(PresenceStatus::default(), PresenceStatus::Offline);
        assert!(!PresenceStatus::Offline.is_online());
        assert_eq!(PresenceStatus::Online.to_string(), "online");
    }
}
