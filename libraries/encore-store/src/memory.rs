//! In-memory store

use encore_core::{CoreError, PlaybackStore, Playlist, PlaylistId, Result, TrackId};
use std::collections::{BTreeSet, HashMap};
use std::sync::{Mutex, MutexGuard};

use crate::state::StoreState;

/// Store that keeps everything in process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<StoreState>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreState>> {
        self.state
            .lock()
            .map_err(|_| CoreError::storage("memory store lock poisoned"))
    }
}

impl PlaybackStore for MemoryStore {
    fn is_favorite(&self, id: TrackId) -> Result<bool> {
        Ok(self.lock()?.favorites.contains(&id))
    }

    fn set_favorite(&self, id: TrackId, favorite: bool) -> Result<()> {
        self.lock()?.set_favorite(id, favorite);
        Ok(())
    }

    fn favorites(&self) -> Result<BTreeSet<TrackId>> {
        Ok(self.lock()?.favorites.clone())
    }

    fn play_count(&self, id: TrackId) -> Result<u32> {
        Ok(self.lock()?.play_counts.get(&id).copied().unwrap_or(0))
    }

    fn increment_play_count(&self, id: TrackId) -> Result<u32> {
        Ok(self.lock()?.increment_play_count(id))
    }

    fn play_counts(&self) -> Result<HashMap<TrackId, u32>> {
        Ok(self.lock()?.play_counts())
    }

    fn playlists(&self) -> Result<Vec<Playlist>> {
        Ok(self.lock()?.playlists.clone())
    }

    fn save_playlist(&self, playlist: Playlist) -> Result<()> {
        self.lock()?.save_playlist(playlist)
    }

    fn delete_playlists(&self, ids: &[PlaylistId]) -> Result<()> {
        self.lock()?.delete_playlists(ids);
        Ok(())
    }

    fn renamed_title(&self, id: TrackId) -> Result<Option<String>> {
        Ok(self.lock()?.renamed_titles.get(&id).cloned())
    }

    fn set_renamed_title(&self, id: TrackId, title: &str) -> Result<()> {
        self.lock()?.set_renamed_title(id, title)
    }
}
