pub mod spotify;
pub mod mock;
pub mod auth;

use crate::models::{CurrentUser, Page, Playlist, PlaylistItem};
use anyhow::Result;

/// The operations a sync needs from the streaming service.
/// Implementations: spotify::SpotifyClient and mock::MockService.
#[async_trait::async_trait]
pub trait MusicService: Send + Sync {
    /// Identity of the authenticated user.
    async fn current_user(&self) -> Result<CurrentUser>;

    /// One page of the current user's playlists. Entries the service returns
    /// as `null` are kept as `None`.
    async fn current_user_playlists(
        &self,
        offset: usize,
        limit: usize,
    ) -> Result<Page<Option<Playlist>>>;

    /// One page of a playlist's entries.
    async fn playlist_tracks(
        &self,
        playlist_id: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Page<PlaylistItem>>;

    async fn user_playlist_create(&self, user_id: &str, name: &str, public: bool) -> Result<Playlist>;

    /// Append track ids to the end of a playlist.
    async fn playlist_add_items(&self, playlist_id: &str, track_ids: &[String]) -> Result<()>;

    /// Replace the full contents of a playlist. An empty list clears it.
    async fn playlist_replace_items(&self, playlist_id: &str, track_ids: &[String]) -> Result<()>;

    /// Return the service's name (for logging)
    fn name(&self) -> &str;
}
