//! JSON file store
//!
//! The whole state lives in one document. Every change is written to a sibling
//! temp file which then replaces the document, so readers never observe a
//! half-written file. In-memory state only changes once the write succeeded.
//!
//! Writers are serialized on their own lock, so reads never wait on the disk
//! or on a retry backoff.

use encore_core::{CoreError, PlaybackStore, Playlist, PlaylistId, Result, TrackId};
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

use crate::retry::RetryPolicy;
use crate::state::StoreState;

/// Store persisted as a single JSON document
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    state: Mutex<StoreState>,
    // Held across persist; `state` is only held to copy or commit
    writer: Mutex<()>,
    retry: RetryPolicy,
}

impl JsonFileStore {
    /// Open a store, creating an empty one if the file does not exist yet
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        Self::open_with_retry(path, RetryPolicy::default())
    }

    /// Open a store with a custom write retry policy
    pub fn open_with_retry(path: impl Into<PathBuf>, retry: RetryPolicy) -> Result<Self> {
        let path = path.into();
        let state = if path.exists() {
            let contents = fs::read_to_string(&path)?;
            if contents.trim().is_empty() {
                StoreState::default()
            } else {
                serde_json::from_str(&contents)?
            }
        } else {
            StoreState::default()
        };

        info!(
            path = %path.display(),
            playlists = state.playlists.len(),
            favorites = state.favorites.len(),
            "Opened playback store"
        );

        Ok(Self {
            path,
            state: Mutex::new(state),
            writer: Mutex::new(()),
            retry,
        })
    }

    /// Location of the backing document
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreState>> {
        self.state
            .lock()
            .map_err(|_| CoreError::storage("json store lock poisoned"))
    }

    /// Apply a change to a copy of the state, persist it, then commit it
    fn mutate<T>(&self, change: impl FnOnce(&mut StoreState) -> Result<T>) -> Result<T> {
        let _writer = self
            .writer
            .lock()
            .map_err(|_| CoreError::storage("json store writer lock poisoned"))?;

        let (next, value) = {
            let current = self.lock()?;
            let mut next = current.clone();
            let value = change(&mut next)?;
            if next == *current {
                return Ok(value);
            }
            (next, value)
        };

        self.persist(&next)?;
        *self.lock()? = next;
        Ok(value)
    }

    fn persist(&self, state: &StoreState) -> Result<()> {
        let json = serde_json::to_string_pretty(state)?;
        let tmp = self.tmp_path();

        self.retry.run("store write", |attempt| -> Result<()> {
            if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(&tmp, json.as_bytes())?;
            fs::rename(&tmp, &self.path)?;
            debug!(attempt, path = %self.path.display(), "Persisted playback store");
            Ok(())
        })
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "store.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl PlaybackStore for JsonFileStore {
    fn is_favorite(&self, id: TrackId) -> Result<bool> {
        Ok(self.lock()?.favorites.contains(&id))
    }

    fn set_favorite(&self, id: TrackId, favorite: bool) -> Result<()> {
        self.mutate(|state| {
            state.set_favorite(id, favorite);
            Ok(())
        })
    }

    fn favorites(&self) -> Result<BTreeSet<TrackId>> {
        Ok(self.lock()?.favorites.clone())
    }

    fn play_count(&self, id: TrackId) -> Result<u32> {
        Ok(self.lock()?.play_counts.get(&id).copied().unwrap_or(0))
    }

    fn increment_play_count(&self, id: TrackId) -> Result<u32> {
        self.mutate(|state| Ok(state.increment_play_count(id)))
    }

    fn play_counts(&self) -> Result<HashMap<TrackId, u32>> {
        Ok(self.lock()?.play_counts())
    }

    fn playlists(&self) -> Result<Vec<Playlist>> {
        Ok(self.lock()?.playlists.clone())
    }

    fn save_playlist(&self, playlist: Playlist) -> Result<()> {
        self.mutate(|state| state.save_playlist(playlist))
    }

    fn delete_playlists(&self, ids: &[PlaylistId]) -> Result<()> {
        self.mutate(|state| {
            state.delete_playlists(ids);
            Ok(())
        })
    }

    fn renamed_title(&self, id: TrackId) -> Result<Option<String>> {
        Ok(self.lock()?.renamed_titles.get(&id).cloned())
    }

    fn set_renamed_title(&self, id: TrackId, title: &str) -> Result<()> {
        self.mutate(|state| state.set_renamed_title(id, title))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tmp_path_is_a_sibling() {
        let store = JsonFileStore {
            path: PathBuf::from("/data/encore/state.json"),
            state: Mutex::new(StoreState::default()),
            writer: Mutex::new(()),
            retry: RetryPolicy::none(),
        };
        assert_eq!(
            store.tmp_path(),
            PathBuf::from("/data/encore/state.json.tmp")
        );
    }

    #[test]
    fn rejected_change_is_not_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let store = JsonFileStore::open(&path).unwrap();

        assert!(store.set_renamed_title(TrackId::new(1), "   ").is_err());
        assert!(!path.exists());
    }
}
