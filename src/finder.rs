use crate::api::MusicService;
use crate::error::SyncError;
use crate::models::Playlist;
use tracing::debug;

/// Page size for the current user's playlist listing.
pub const PLAYLIST_PAGE_SIZE: usize = 50;

/// Find the first playlist in the user's library whose name matches exactly.
///
/// Pages are requested until one comes back empty; only then is the playlist
/// reported missing. The `next` cursor is not consulted here, an empty page
/// is the end of the list. `null` entries count toward the page but never
/// match.
pub async fn find_playlist(service: &dyn MusicService, name: &str) -> Result<Playlist, SyncError> {
    let mut offset = 0;
    loop {
        let page = service
            .current_user_playlists(offset, PLAYLIST_PAGE_SIZE)
            .await?;
        if page.items.is_empty() {
            debug!(name, offset, "playlist listing exhausted");
            return Err(SyncError::PlaylistNotFound(name.to_string()));
        }
        if let Some(found) = page.items.into_iter().flatten().find(|p| p.name == name) {
            debug!(name, id = %found.id, "found playlist");
            return Ok(found);
        }
        offset += PLAYLIST_PAGE_SIZE;
    }
}
