use crate::api::MusicService;
use crate::collector::collect_track_ids;
use crate::config::Config;
use crate::error::SyncError;
use crate::finder::find_playlist;
use crate::models::{Playlist, SyncOutcome, SyncReport, SyncTarget};
use crate::util::weekly_playlist_name;
use anyhow::Result;
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::info;

pub const DEFAULT_SOURCE_PLAYLIST: &str = "Discover Weekly";

/// Copies the source playlist into a target playlist over a music service.
pub struct PlaylistSync {
    service: Arc<dyn MusicService>,
    source_name: String,
    public: bool,
}

impl PlaylistSync {
    pub fn new(service: Arc<dyn MusicService>) -> Self {
        Self {
            service,
            source_name: DEFAULT_SOURCE_PLAYLIST.to_string(),
            public: false,
        }
    }

    pub fn from_config(service: Arc<dyn MusicService>, cfg: &Config) -> Self {
        Self::new(service)
            .with_source_name(&cfg.source_playlist)
            .with_public(cfg.public)
    }

    pub fn with_source_name(mut self, name: &str) -> Self {
        self.source_name = name.to_string();
        self
    }

    /// Visibility of playlists created by this sync.
    pub fn with_public(mut self, public: bool) -> Self {
        self.public = public;
        self
    }

    /// Resolve the source playlist and sync it into `target`. A missing
    /// source is fatal.
    pub async fn run(&self, target: &SyncTarget, today: NaiveDate) -> Result<SyncReport, SyncError> {
        let source = find_playlist(self.service.as_ref(), &self.source_name).await?;
        info!(
            service = self.service.name(),
            source = %source.name,
            id = %source.id,
            "resolved source playlist"
        );
        self.sync(&source, target, today).await
    }

    /// Weekly targets are overwritten with the source, in source order.
    /// Named targets only gain the source tracks they lack.
    pub async fn sync(
        &self,
        source: &Playlist,
        target: &SyncTarget,
        today: NaiveDate,
    ) -> Result<SyncReport, SyncError> {
        let target_name = match target {
            SyncTarget::Weekly => weekly_playlist_name(today),
            SyncTarget::Named(name) => name.clone(),
        };
        let (target_playlist, created) = self.find_or_create_playlist(&target_name).await?;
        let source_tracks = collect_track_ids(self.service.as_ref(), &source.id).await?;

        let outcome = match target {
            SyncTarget::Weekly => {
                self.service
                    .playlist_replace_items(&target_playlist.id, source_tracks.as_slice())
                    .await?;
                info!(
                    target = %target_playlist.name,
                    count = source_tracks.len(),
                    "replaced playlist contents"
                );
                SyncOutcome::Replaced {
                    count: source_tracks.len(),
                }
            }
            SyncTarget::Named(_) => {
                let existing = collect_track_ids(self.service.as_ref(), &target_playlist.id).await?;
                let missing = source_tracks.difference(&existing);
                if missing.is_empty() {
                    info!(target = %target_playlist.name, "playlist already up to date");
                    SyncOutcome::UpToDate
                } else {
                    self.service
                        .playlist_add_items(&target_playlist.id, &missing)
                        .await?;
                    info!(
                        target = %target_playlist.name,
                        count = missing.len(),
                        "added missing tracks"
                    );
                    SyncOutcome::Added {
                        count: missing.len(),
                    }
                }
            }
        };

        Ok(SyncReport {
            source: source.clone(),
            target: target_playlist,
            created,
            outcome,
        })
    }

    /// Look the playlist up by name and create it for the current user when
    /// absent. The bool is true when a playlist was created.
    pub async fn find_or_create_playlist(&self, name: &str) -> Result<(Playlist, bool), SyncError> {
        match find_playlist(self.service.as_ref(), name).await {
            Ok(p) => Ok((p, false)),
            Err(SyncError::PlaylistNotFound(_)) => {
                let user = self.service.current_user().await?;
                let created = self
                    .service
                    .user_playlist_create(&user.id, name, self.public)
                    .await?;
                info!(name, id = %created.id, public = self.public, "created playlist");
                Ok((created, true))
            }
            Err(e) => Err(e),
        }
    }
}
