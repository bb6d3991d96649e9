use super::MusicService;
use crate::models::{CurrentUser, Page, Playlist, PlaylistItem};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard};
use tracing::info;

/// Every call the mock received, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CurrentUser,
    ListPlaylists { offset: usize, limit: usize },
    ListTracks { playlist_id: String, offset: usize, limit: usize },
    Create { user_id: String, name: String, public: bool },
    Add { playlist_id: String, track_ids: Vec<String> },
    Replace { playlist_id: String, track_ids: Vec<String> },
}

impl Call {
    pub fn is_write(&self) -> bool {
        matches!(self, Call::Add { .. } | Call::Replace { .. } | Call::Create { .. })
    }
}

/// Which operation an injected failure applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailOn {
    CurrentUser,
    ListPlaylists,
    ListTracks,
    Create,
    Add,
    Replace,
}

#[derive(Debug, Clone)]
pub struct MockPlaylist {
    pub id: String,
    pub name: String,
    pub public: bool,
    /// Listed as a `null` entry, the way the API reports playlists it can no
    /// longer resolve.
    pub listed_as_null: bool,
    /// `None` entries stand in for local files without a catalog id.
    pub tracks: Vec<Option<String>>,
}

#[derive(Debug, Default)]
struct MockState {
    playlists: Vec<MockPlaylist>,
    calls: Vec<Call>,
    fail_on: Option<FailOn>,
    next_id: u64,
}

/// An in-memory music service used in tests. Listings are paginated the
/// way the real API does it: a slice of `limit` items from `offset`, with a
/// `next` cursor while more items remain.
pub struct MockService {
    user_id: String,
    state: Mutex<MockState>,
}

impl Default for MockService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockService {
    pub fn new() -> Self {
        Self {
            user_id: "mock_user".into(),
            state: Mutex::new(MockState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Add a playlist with the given tracks and return its id.
    pub fn add_playlist(&self, name: &str, tracks: &[&str]) -> String {
        let tracks = tracks.iter().map(|t| Some(t.to_string())).collect();
        self.add_playlist_entries(name, tracks)
    }

    pub fn add_playlist_entries(&self, name: &str, tracks: Vec<Option<String>>) -> String {
        let mut st = self.state();
        st.next_id += 1;
        let id = format!("mock-playlist-{}", st.next_id);
        st.playlists.push(MockPlaylist {
            id: id.clone(),
            name: name.to_string(),
            public: false,
            listed_as_null: false,
            tracks,
        });
        id
    }

    /// Add `n` library entries that the listing reports as `null`.
    pub fn add_null_playlists(&self, n: usize) {
        let mut st = self.state();
        for _ in 0..n {
            st.next_id += 1;
            let id = format!("mock-playlist-{}", st.next_id);
            st.playlists.push(MockPlaylist {
                id,
                name: String::new(),
                public: false,
                listed_as_null: true,
                tracks: Vec::new(),
            });
        }
    }

    pub fn fail_on(&self, op: FailOn) {
        self.state().fail_on = Some(op);
    }

    pub fn playlist(&self, id: &str) -> Option<MockPlaylist> {
        self.state().playlists.iter().find(|p| p.id == id).cloned()
    }

    pub fn playlists_named(&self, name: &str) -> Vec<MockPlaylist> {
        self.state()
            .playlists
            .iter()
            .filter(|p| p.name == name)
            .cloned()
            .collect()
    }

    /// Track ids of a playlist in stored order, skipping id-less entries.
    pub fn track_ids(&self, id: &str) -> Vec<String> {
        self.playlist(id)
            .map(|p| p.tracks.into_iter().flatten().collect())
            .unwrap_or_default()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    pub fn writes(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_write).collect()
    }

    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    fn record(&self, call: Call, op: FailOn) -> Result<MutexGuard<'_, MockState>> {
        let mut st = self.state();
        st.calls.push(call);
        if st.fail_on == Some(op) {
            return Err(anyhow!("mock failure on {:?}", op));
        }
        Ok(st)
    }
}

fn page_of<T: Clone>(all: &[T], offset: usize, limit: usize) -> Page<T> {
    let start = offset.min(all.len());
    let end = offset.saturating_add(limit).min(all.len());
    let next = if end < all.len() {
        Some(format!("mock://next?offset={}&limit={}", end, limit))
    } else {
        None
    };
    Page {
        items: all[start..end].to_vec(),
        next,
    }
}

#[async_trait]
impl MusicService for MockService {
    fn name(&self) -> &str {
        "mock"
    }

    async fn current_user(&self) -> Result<CurrentUser> {
        let _st = self.record(Call::CurrentUser, FailOn::CurrentUser)?;
        Ok(CurrentUser {
            id: self.user_id.clone(),
        })
    }

    async fn current_user_playlists(
        &self,
        offset: usize,
        limit: usize,
    ) -> Result<Page<Option<Playlist>>> {
        let st = self.record(Call::ListPlaylists { offset, limit }, FailOn::ListPlaylists)?;
        let all: Vec<Option<Playlist>> = st
            .playlists
            .iter()
            .map(|p| {
                (!p.listed_as_null).then(|| Playlist {
                    id: p.id.clone(),
                    name: p.name.clone(),
                })
            })
            .collect();
        Ok(page_of(&all, offset, limit))
    }

    async fn playlist_tracks(
        &self,
        playlist_id: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Page<PlaylistItem>> {
        let call = Call::ListTracks {
            playlist_id: playlist_id.to_string(),
            offset,
            limit,
        };
        let st = self.record(call, FailOn::ListTracks)?;
        let pl = st
            .playlists
            .iter()
            .find(|p| p.id == playlist_id)
            .ok_or_else(|| anyhow!("mock: no playlist {}", playlist_id))?;
        let items: Vec<PlaylistItem> = pl
            .tracks
            .iter()
            .map(|t| match t {
                Some(id) => PlaylistItem::with_id(id),
                None => PlaylistItem { track: None },
            })
            .collect();
        Ok(page_of(&items, offset, limit))
    }

    async fn user_playlist_create(&self, user_id: &str, name: &str, public: bool) -> Result<Playlist> {
        let call = Call::Create {
            user_id: user_id.to_string(),
            name: name.to_string(),
            public,
        };
        let mut st = self.record(call, FailOn::Create)?;
        st.next_id += 1;
        let id = format!("mock-playlist-{}", st.next_id);
        st.playlists.push(MockPlaylist {
            id: id.clone(),
            name: name.to_string(),
            public,
            listed_as_null: false,
            tracks: Vec::new(),
        });
        info!("MockService: created playlist {} ({})", name, id);
        Ok(Playlist {
            id,
            name: name.to_string(),
        })
    }

    async fn playlist_add_items(&self, playlist_id: &str, track_ids: &[String]) -> Result<()> {
        let call = Call::Add {
            playlist_id: playlist_id.to_string(),
            track_ids: track_ids.to_vec(),
        };
        let mut st = self.record(call, FailOn::Add)?;
        let pl = st
            .playlists
            .iter_mut()
            .find(|p| p.id == playlist_id)
            .ok_or_else(|| anyhow!("mock: no playlist {}", playlist_id))?;
        pl.tracks.extend(track_ids.iter().cloned().map(Some));
        Ok(())
    }

    async fn playlist_replace_items(&self, playlist_id: &str, track_ids: &[String]) -> Result<()> {
        let call = Call::Replace {
            playlist_id: playlist_id.to_string(),
            track_ids: track_ids.to_vec(),
        };
        let mut st = self.record(call, FailOn::Replace)?;
        let pl = st
            .playlists
            .iter_mut()
            .find(|p| p.id == playlist_id)
            .ok_or_else(|| anyhow!("mock: no playlist {}", playlist_id))?;
        pl.tracks = track_ids.iter().cloned().map(Some).collect();
        Ok(())
    }
}
