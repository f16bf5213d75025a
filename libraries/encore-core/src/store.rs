//! Persistence contract for per-user playback state
//!
//! The playback session reads and bumps user state through this trait but owns
//! none of the storage format. Implementations live in `encore-store`.

use std::collections::{BTreeSet, HashMap};

use crate::error::{CoreError, Result};
use crate::types::{Playlist, PlaylistId, Track, TrackId};

/// Key-value persistence for favorites, play counts, playlists and renames
///
/// Methods take `&self`; implementations provide their own interior locking so
/// a store can be shared between the session and the host.
pub trait PlaybackStore: Send + Sync {
    // ========================================================================
    // Favorites
    // ========================================================================

    /// Check if a track is marked favorite
    fn is_favorite(&self, id: TrackId) -> Result<bool>;

    /// Mark or unmark a track as favorite
    fn set_favorite(&self, id: TrackId, favorite: bool) -> Result<()>;

    /// All favorite track ids
    fn favorites(&self) -> Result<BTreeSet<TrackId>>;

    // ========================================================================
    // Play counts
    // ========================================================================

    /// Times a track has been played
    fn play_count(&self, id: TrackId) -> Result<u32>;

    /// Record one more play, returning the new count
    fn increment_play_count(&self, id: TrackId) -> Result<u32>;

    /// All recorded play counts
    fn play_counts(&self) -> Result<HashMap<TrackId, u32>>;

    // ========================================================================
    // Playlists
    // ========================================================================

    /// All playlists in creation order
    fn playlists(&self) -> Result<Vec<Playlist>>;

    /// Insert or replace a playlist
    fn save_playlist(&self, playlist: Playlist) -> Result<()>;

    /// Delete playlists; unknown ids are ignored
    fn delete_playlists(&self, ids: &[PlaylistId]) -> Result<()>;

    /// Get playlist by ID
    fn playlist(&self, id: PlaylistId) -> Result<Option<Playlist>> {
        Ok(self.playlists()?.into_iter().find(|p| p.id == id))
    }

    /// Add a track to a playlist (no-op if already present)
    fn add_track_to_playlist(&self, id: PlaylistId, track: Track) -> Result<()> {
        let mut playlist = self
            .playlist(id)?
            .ok_or(CoreError::PlaylistNotFound(id))?;
        if playlist.add(track) {
            self.save_playlist(playlist)?;
        }
        Ok(())
    }

    /// Remove a track from a playlist
    fn remove_track_from_playlist(&self, id: PlaylistId, track_id: TrackId) -> Result<()> {
        let mut playlist = self
            .playlist(id)?
            .ok_or(CoreError::PlaylistNotFound(id))?;
        if playlist.remove(track_id) {
            self.save_playlist(playlist)?;
        }
        Ok(())
    }

    // ========================================================================
    // Renamed titles
    // ========================================================================

    /// User-assigned title for a track, if renamed
    fn renamed_title(&self, id: TrackId) -> Result<Option<String>>;

    /// Record a user rename
    fn set_renamed_title(&self, id: TrackId, title: &str) -> Result<()>;
}
