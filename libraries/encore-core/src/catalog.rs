//! Library catalog
//!
//! Holds the ordered track list supplied by the host's media scan and groups
//! it into album, artist and folder contexts. Grouping keeps library order
//! within each group; groups are sorted by name.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::Result;
use crate::types::{ContextKind, PlaybackContext, Track, TrackId};

/// In-memory track catalog
#[derive(Debug, Clone, Default)]
pub struct LibraryCatalog {
    tracks: Vec<Track>,
}

/// On-disk catalog document
#[derive(Debug, Deserialize)]
struct CatalogFile {
    tracks: Vec<Track>,
}

impl LibraryCatalog {
    /// Create a catalog from tracks in library order
    pub fn new(tracks: Vec<Track>) -> Self {
        Self { tracks }
    }

    /// Load a catalog from a JSON document of the form `{"tracks": [...]}`
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let file: CatalogFile = serde_json::from_str(&contents)?;
        Ok(Self::new(file.tracks))
    }

    /// All tracks in library order
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Number of tracks
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Check if the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Look up a track by id
    pub fn track(&self, id: TrackId) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id == id)
    }

    /// Apply a user rename to the catalog copy of a track
    pub fn rename(&mut self, id: TrackId, title: &str) -> bool {
        let mut found = false;
        for track in self.tracks.iter_mut().filter(|t| t.id == id) {
            track.title = title.to_string();
            found = true;
        }
        found
    }

    /// Context over the whole library
    pub fn library(&self) -> PlaybackContext {
        PlaybackContext::library(self.tracks.clone())
    }

    /// One context per album, sorted by album name
    pub fn albums(&self) -> Vec<PlaybackContext> {
        self.group_by(|t| Some(t.album.clone()), |name| ContextKind::Album { name })
    }

    /// One context per artist, sorted by artist name
    pub fn artists(&self) -> Vec<PlaybackContext> {
        self.group_by(|t| Some(t.artist.clone()), |name| ContextKind::Artist { name })
    }

    /// One context per parent folder, sorted by path
    ///
    /// Tracks addressed by URI have no folder and are left out.
    pub fn folders(&self) -> Vec<PlaybackContext> {
        self.group_by(
            |t| t.folder().map(|p| p.to_string_lossy().into_owned()),
            |path| ContextKind::Folder { path },
        )
    }

    /// Context for one album
    pub fn album(&self, name: &str) -> Option<PlaybackContext> {
        self.albums().into_iter().find(|c| c.name() == name)
    }

    /// Context for one artist
    pub fn artist(&self, name: &str) -> Option<PlaybackContext> {
        self.artists().into_iter().find(|c| c.name() == name)
    }

    /// Context for one folder
    pub fn folder(&self, path: &str) -> Option<PlaybackContext> {
        self.folders().into_iter().find(|c| c.name() == path)
    }

    fn group_by(
        &self,
        key: impl Fn(&Track) -> Option<String>,
        kind: impl Fn(String) -> ContextKind,
    ) -> Vec<PlaybackContext> {
        let mut groups: BTreeMap<String, Vec<Track>> = BTreeMap::new();
        for track in &self.tracks {
            if let Some(k) = key(track) {
                groups.entry(k).or_default().push(track.clone());
            }
        }

        groups
            .into_iter()
            .map(|(name, tracks)| PlaybackContext::new(kind(name), tracks))
            .collect()
    }
}
