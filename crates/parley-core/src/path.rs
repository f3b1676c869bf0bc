//! Realtime database paths.

use std::fmt;

/// Location of a node in the realtime database.
///
/// Stored as its segments; empty segments are dropped on construction so
/// `"channels/"`, `"/channels"` and `"channels"` are the same path. A key
/// containing `/` (such as a direct-message channel id) expands into several
/// segments, matching how the hosted database interprets child paths.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DbPath {
    segments: Vec<String>,
}

impl DbPath {
    /// The database root.
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a slash-separated path.
    pub fn new(path: &str) -> Self {
        Self::root().child(path)
    }

    /// Path of a child below this one.
    #[must_use]
    pub fn child(&self, key: impl AsRef<str>) -> Self {
        let mut segments = self.segments.clone();
        segments.extend(key.as_ref().split('/').filter(|s| !s.is_empty()).map(str::to_owned));
        Self { segments }
    }

    /// Path segments from the root.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Last segment. `None` for the root.
    pub fn key(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Parent path. `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        let (_, rest) = self.segments.split_last()?;
        Some(Self { segments: rest.to_vec() })
    }

    /// True for the database root.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// True if `self` equals `ancestor` or lies below it.
    pub fn starts_with(&self, ancestor: &Self) -> bool {
        self.segments.starts_with(&ancestor.segments)
    }
}

impl From<&str> for DbPath {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl fmt::Display for DbPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.segments.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn segment() -> impl Strategy<Value = String> {
        "[a-z0-9.-]{1,8}"
    }

    proptest! {
        #[test]
        fn child_appends_segments(
            base in prop::collection::vec(segment(), 0..4),
            keys in prop::collection::vec(segment(), 1..4),
        ) {
            let parent = DbPath::new(&base.join("/"));
            let path = keys.iter().fold(parent.clone(), |p, k| p.child(k));

            prop_assert_eq!(path.segments().len(), base.len() + keys.len());
            prop_assert_eq!(&path.segments()[..base.len()], parent.segments());
            prop_assert_eq!(path.key(), keys.last().map(String::as_str));
            prop_assert!(path.starts_with(&parent));
            prop_assert_eq!(DbPath::new(&path.to_string()), path);
        }

        #[test]
        fn extra_slashes_never_create_segments(
            keys in prop::collection::vec(segment(), 0..5),
            padding in 1usize..4,
        ) {
            let slashes = "/".repeat(padding);
            let raw = format!("{slashes}{}{slashes}", keys.join(&slashes));

            let path = DbPath::new(&raw);
            prop_assert_eq!(path.segments(), keys.as_slice());
        }
    }

    #[test]
    fn empty_segments_are_dropped() {
        assert_eq!(DbPath::new("/channels//abc/"), DbPath::new("channels/abc"));
        assert_eq!(DbPath::new("").segments().len(), 0);
    }

    #[test]
    fn child_with_slash_expands() {
        let path = DbPath::new("messages").child("alice/bob");
        assert_eq!(path.segments(), ["messages", "alice", "bob"]);
        assert_eq!(path.key(), Some("bob"));
    }

    #[test]
    fn parent_and_ancestry() {
        let path = DbPath::new("users/u1/starred");
        let parent = path.parent();

        assert_eq!(parent, Some(DbPath::new("users/u1")));
        assert!(path.starts_with(&DbPath::new("users")));
        assert!(path.starts_with(&path));
        assert!(!DbPath::new("users").starts_with(&path));
        assert_eq!(DbPath::root().parent(), None);
    }

    #[test]
    fn display_is_rooted() {
        assert_eq!(DbPath::new("presence/u1").to_string(), "/presence/u1");
        assert_eq!(DbPath::root().to_string(), "/");
    }
}
