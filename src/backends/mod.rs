//! Playlist backend abstractions and concrete implementations.

pub mod spotify;

use thiserror::Error;

use crate::http_failure::HttpFailureKind;

/// Remote track payload returned by backend adapters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendTrack {
    pub item_id: String,
    pub title: String,
    pub artist: String,
    pub album: String,
    pub cover_url: String,
    pub external_url: String,
}

/// Failure reported by a playlist backend.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("{kind} during {operation}: {message}")]
    Http {
        kind: HttpFailureKind,
        operation: &'static str,
        message: String,
    },
    #[error("invalid response from {operation}: {message}")]
    Decode {
        operation: &'static str,
        message: String,
    },
    #[error("backend credentials missing: {0}")]
    MissingCredentials(String),
}

/// Interface implemented by concrete playlist backends.
pub trait PlaylistBackendAdapter: Send + Sync {
    /// Human-readable backend name used in logs.
    fn name(&self) -> &'static str;

    /// Fetches every playable track of a playlist, following pagination until exhausted.
    fn fetch_playlist_tracks(&self, playlist_id: &str) -> Result<Vec<BackendTrack>, BackendError>;
}
