//! Store document shared by the memory and JSON implementations

use encore_core::{CoreError, Playlist, PlaylistId, Result, TrackId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Everything a store persists
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct StoreState {
    pub favorites: BTreeSet<TrackId>,
    pub play_counts: BTreeMap<TrackId, u32>,
    pub playlists: Vec<Playlist>,
    pub renamed_titles: BTreeMap<TrackId, String>,
}

impl StoreState {
    pub fn set_favorite(&mut self, id: TrackId, favorite: bool) -> bool {
        if favorite {
            self.favorites.insert(id)
        } else {
            self.favorites.remove(&id)
        }
    }

    pub fn increment_play_count(&mut self, id: TrackId) -> u32 {
        let count = self.play_counts.entry(id).or_insert(0);
        *count = count.saturating_add(1);
        *count
    }

    pub fn play_counts(&self) -> HashMap<TrackId, u32> {
        self.play_counts.iter().map(|(k, v)| (*k, *v)).collect()
    }

    pub fn save_playlist(&mut self, playlist: Playlist) -> Result<()> {
        if playlist.name.trim().is_empty() {
            return Err(CoreError::invalid_input("playlist name cannot be empty"));
        }

        match self.playlists.iter_mut().find(|p| p.id == playlist.id) {
            Some(existing) => *existing = playlist,
            None => self.playlists.push(playlist),
        }
        Ok(())
    }

    pub fn delete_playlists(&mut self, ids: &[PlaylistId]) -> bool {
        let before = self.playlists.len();
        self.playlists.retain(|p| !ids.contains(&p.id));
        self.playlists.len() != before
    }

    pub fn set_renamed_title(&mut self, id: TrackId, title: &str) -> Result<()> {
        let title = title.trim();
        if title.is_empty() {
            return Err(CoreError::invalid_input("title cannot be empty"));
        }
        self.renamed_titles.insert(id, title.to_string());
        Ok(())
    }
}
