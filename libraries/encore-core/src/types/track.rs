/// Track domain type
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::types::TrackId;

/// Label used when a tag is missing, matching what the media store reports
pub const UNKNOWN: &str = "<unknown>";

/// A playable track
///
/// Identity and display metadata only. Favorite flag and play count are user
/// state and live in the [`PlaybackStore`](crate::PlaybackStore).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Unique track identifier
    pub id: TrackId,

    /// Track title
    pub title: String,

    /// Artist name
    #[serde(default = "unknown")]
    pub artist: String,

    /// Album name
    #[serde(default = "unknown")]
    pub album: String,

    /// Duration in milliseconds
    #[serde(default)]
    pub duration_ms: u64,

    /// File path or content URI
    pub path: String,

    /// Album art reference (URI), if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub art: Option<String>,
}

fn unknown() -> String {
    UNKNOWN.to_string()
}

impl Track {
    /// Create a track with unknown artist/album and zero duration
    pub fn new(id: TrackId, title: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            artist: unknown(),
            album: unknown(),
            duration_ms: 0,
            path: path.into(),
            art: None,
        }
    }

    /// Set the artist
    #[must_use]
    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = artist.into();
        self
    }

    /// Set the album
    #[must_use]
    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = album.into();
        self
    }

    /// Set the duration
    #[must_use]
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration_ms = duration.as_millis() as u64;
        self
    }

    /// Set the album art reference
    #[must_use]
    pub fn with_art(mut self, art: impl Into<String>) -> Self {
        self.art = Some(art.into());
        self
    }

    /// Track duration
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    /// Whether the path is a URI (`content://`, `http://`, ...) rather than a file
    pub fn is_uri(&self) -> bool {
        self.path.contains("://")
    }

    /// Local file path, or `None` for URIs
    pub fn file_path(&self) -> Option<&Path> {
        if self.is_uri() {
            None
        } else {
            Some(Path::new(&self.path))
        }
    }

    /// Parent folder of a local file, used for folder grouping
    pub fn folder(&self) -> Option<PathBuf> {
        self.file_path()
            .and_then(|p| p.parent())
            .map(Path::to_path_buf)
    }
}
