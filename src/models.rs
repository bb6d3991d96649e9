use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A remote playlist. Identity is the id; the name is only a lookup key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CurrentUser {
    pub id: String,
}

/// One page of a paginated listing. `next` is the service's cursor; `None`
/// means this is the last page.
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(default)]
    pub next: Option<String>,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistItem {
    #[serde(default)]
    pub track: Option<TrackRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackRef {
    #[serde(default)]
    pub id: Option<String>,
}

impl PlaylistItem {
    pub fn with_id(id: &str) -> Self {
        Self {
            track: Some(TrackRef {
                id: Some(id.to_string()),
            }),
        }
    }

    /// Local files and removed tracks come back without an id.
    pub fn track_id(&self) -> Option<&str> {
        self.track.as_ref().and_then(|t| t.id.as_deref())
    }
}

/// Where the copied tracks go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncTarget {
    /// Dated weekly snapshot, contents replaced on every run.
    Weekly,
    /// User-named playlist; only missing tracks are appended.
    Named(String),
}

impl SyncTarget {
    pub fn from_name(name: Option<String>) -> Self {
        match name {
            Some(n) => SyncTarget::Named(n),
            None => SyncTarget::Weekly,
        }
    }
}

/// Track ids in first-seen order with duplicates collapsed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackCollection {
    order: Vec<String>,
    seen: HashSet<String>,
}

impl TrackCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the id was already present.
    pub fn insert(&mut self, id: &str) -> bool {
        if self.seen.contains(id) {
            return false;
        }
        self.seen.insert(id.to_string());
        self.order.push(id.to_string());
        true
    }

    pub fn contains(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.order
    }

    /// Ids of `self` absent from `other`, in `self`'s order.
    pub fn difference(&self, other: &TrackCollection) -> Vec<String> {
        self.order
            .iter()
            .filter(|id| !other.contains(id))
            .cloned()
            .collect()
    }
}

impl<S: AsRef<str>> FromIterator<S> for TrackCollection {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut c = TrackCollection::new();
        for id in iter {
            c.insert(id.as_ref());
        }
        c
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Replaced { count: usize },
    Added { count: usize },
    UpToDate,
}

#[derive(Debug, Clone)]
pub struct SyncReport {
    pub source: Playlist,
    pub target: Playlist,
    pub created: bool,
    pub outcome: SyncOutcome,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_collapses_duplicates_keeping_first_position() {
        let c: TrackCollection = ["a", "b", "a", "c", "b"].into_iter().collect();
        assert_eq!(c.as_slice(), &["a", "b", "c"]);
    }

    #[test]
    fn difference_keeps_source_order() {
        let src: TrackCollection = ["a", "b", "c"].into_iter().collect();
        let existing: TrackCollection = ["b"].into_iter().collect();
        assert_eq!(src.difference(&existing), vec!["a".to_string(), "c".to_string()]);
    }

    #[test]
    fn playlist_item_without_track_has_no_id() {
        let item: PlaylistItem = serde_json::from_str(r#"{"track": null}"#).unwrap();
        assert!(item.track_id().is_none());
        let item: PlaylistItem = serde_json::from_str(r#"{"track": {"id": null}}"#).unwrap();
        assert!(item.track_id().is_none());
    }
}
