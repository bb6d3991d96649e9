use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("playlist not found {0}")]
    PlaylistNotFound(String),
    /// Anything raised by the music service client, passed through as-is.
    #[error(transparent)]
    Service(#[from] anyhow::Error),
}

impl SyncError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, SyncError::PlaylistNotFound(_))
    }
}
