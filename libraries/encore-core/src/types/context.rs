/// Playback context: the ordered list of tracks currently eligible for playback
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{PlaylistId, Track, TrackId};

/// Where a playback context came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContextKind {
    /// The whole library
    Library,

    /// One album
    Album { name: String },

    /// One artist
    Artist { name: String },

    /// One folder
    Folder { path: String },

    /// One user playlist
    Playlist { id: PlaylistId, name: String },
}

impl fmt::Display for ContextKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextKind::Library => write!(f, "library"),
            ContextKind::Album { name } => write!(f, "album '{}'", name),
            ContextKind::Artist { name } => write!(f, "artist '{}'", name),
            ContextKind::Folder { path } => write!(f, "folder '{}'", path),
            ContextKind::Playlist { name, .. } => write!(f, "playlist '{}'", name),
        }
    }
}

/// An ordered, named sequence of tracks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackContext {
    /// Where the tracks come from
    pub kind: ContextKind,

    /// Tracks in play order (non-shuffled)
    pub tracks: Vec<Track>,
}

impl PlaybackContext {
    /// Create a new context
    pub fn new(kind: ContextKind, tracks: Vec<Track>) -> Self {
        Self { kind, tracks }
    }

    /// Context over the whole library
    pub fn library(tracks: Vec<Track>) -> Self {
        Self::new(ContextKind::Library, tracks)
    }

    /// Display name of the context
    pub fn name(&self) -> &str {
        match &self.kind {
            ContextKind::Library => "Library",
            ContextKind::Album { name }
            | ContextKind::Artist { name }
            | ContextKind::Playlist { name, .. } => name,
            ContextKind::Folder { path } => path,
        }
    }

    /// Number of tracks
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Check if the context has no tracks
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Track at index
    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    /// First index of a track id
    pub fn position_of(&self, id: TrackId) -> Option<usize> {
        self.tracks.iter().position(|t| t.id == id)
    }

    /// Insert a track at `index` (clamped to the end)
    ///
    /// Returns the index the track landed at.
    pub fn insert(&mut self, index: usize, track: Track) -> usize {
        let index = index.min(self.tracks.len());
        self.tracks.insert(index, track);
        index
    }

    /// Append a track, returning its index
    pub fn push(&mut self, track: Track) -> usize {
        self.tracks.push(track);
        self.tracks.len() - 1
    }

    /// Rename every occurrence of a track
    ///
    /// Returns the number of entries updated.
    pub fn rename(&mut self, id: TrackId, title: &str) -> usize {
        let mut updated = 0;
        for track in self.tracks.iter_mut().filter(|t| t.id == id) {
            track.title = title.to_string();
            updated += 1;
        }
        updated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(id: i64) -> Track {
        Track::new(TrackId::new(id), format!("Track {}", id), format!("/music/{}.mp3", id))
    }

    #[test]
    fn context_names() {
        let album = PlaybackContext::new(
            ContextKind::Album {
                name: "Blue".to_string(),
            },
            vec![track(1)],
        );
        assert_eq!(album.name(), "Blue");
        assert_eq!(PlaybackContext::library(vec![]).name(), "Library");
        assert_eq!(album.kind.to_string(), "album 'Blue'");
    }

    #[test]
    fn insert_clamps_to_end() {
        let mut ctx = PlaybackContext::library(vec![track(1), track(2)]);
        assert_eq!(ctx.insert(10, track(3)), 2);
        assert_eq!(ctx.insert(1, track(4)), 1);

        let ids: Vec<i64> = ctx.tracks.iter().map(|t| t.id.get()).collect();
        assert_eq!(ids, vec![1, 4, 2, 3]);
    }

    #[test]
    fn rename_updates_every_occurrence() {
        let mut ctx = PlaybackContext::library(vec![track(1), track(2), track(1)]);
        assert_eq!(ctx.rename(TrackId::new(1), "Renamed"), 2);
        assert_eq!(ctx.tracks[0].title, "Renamed");
        assert_eq!(ctx.tracks[1].title, "Track 2");
        assert_eq!(ctx.tracks[2].title, "Renamed");
    }

    #[test]
    fn kind_serializes_with_tag() {
        let json = serde_json::to_string(&ContextKind::Artist {
            name: "Nina".to_string(),
        })
        .unwrap();
        assert_eq!(json, r#"{"kind":"artist","name":"Nina"}"#);
    }
}
