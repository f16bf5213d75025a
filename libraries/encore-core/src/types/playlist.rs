/// Playlist domain type
use serde::{Deserialize, Serialize};

use crate::types::{ContextKind, PlaybackContext, PlaylistId, Track, TrackId};

/// User playlist
///
/// Tracks are stored by value so a playlist stays playable even if the
/// library is rescanned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    /// Unique playlist identifier
    pub id: PlaylistId,

    /// Playlist name
    pub name: String,

    /// Tracks in playlist order
    #[serde(default)]
    pub tracks: Vec<Track>,
}

impl Playlist {
    /// Create an empty playlist
    pub fn new(id: PlaylistId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            tracks: Vec::new(),
        }
    }

    /// Number of tracks
    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// Check if the playlist contains a track
    pub fn contains(&self, id: TrackId) -> bool {
        self.tracks.iter().any(|t| t.id == id)
    }

    /// Add a track unless it is already present
    ///
    /// Returns `true` if the track was added.
    pub fn add(&mut self, track: Track) -> bool {
        if self.contains(track.id) {
            return false;
        }
        self.tracks.push(track);
        true
    }

    /// Remove every entry for a track
    ///
    /// Returns `true` if anything was removed.
    pub fn remove(&mut self, id: TrackId) -> bool {
        let before = self.tracks.len();
        self.tracks.retain(|t| t.id != id);
        self.tracks.len() != before
    }

    /// Build a playback context over this playlist
    pub fn to_context(&self) -> PlaybackContext {
        PlaybackContext::new(
            ContextKind::Playlist {
                id: self.id,
                name: self.name.clone(),
            },
            self.tracks.clone(),
        )
    }
}
