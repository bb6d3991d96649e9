use crate::api::MusicService;
use crate::models::TrackCollection;
use anyhow::Result;
use tracing::debug;

/// Page size for a playlist's track listing.
pub const TRACK_PAGE_SIZE: usize = 100;

/// Fetch every track id of a playlist, following the `next` cursor until the
/// service reports no further page. Duplicates collapse to their first
/// occurrence; entries without an id are skipped.
pub async fn collect_track_ids(service: &dyn MusicService, playlist_id: &str) -> Result<TrackCollection> {
    let mut ids = TrackCollection::new();
    let mut offset = 0;
    loop {
        let page = service
            .playlist_tracks(playlist_id, offset, TRACK_PAGE_SIZE)
            .await?;
        for item in &page.items {
            match item.track_id() {
                Some(id) => {
                    ids.insert(id);
                }
                None => debug!(playlist_id, "skipping playlist entry without a track id"),
            }
        }
        if !page.has_next() {
            break;
        }
        offset += TRACK_PAGE_SIZE;
    }
    debug!(playlist_id, count = ids.len(), "collected track ids");
    Ok(ids)
}
