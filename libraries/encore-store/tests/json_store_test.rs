//! Integration tests for the JSON file store
//!
//! Every test reopens the store from disk to verify what was actually persisted.

use encore_core::{PlaybackStore, Playlist, PlaylistId, Track, TrackId};
use encore_store::{JsonFileStore, RetryPolicy};
use std::sync::Arc;
use std::time::{Duration, Instant};

fn track(id: i64) -> Track {
    Track::new(TrackId::new(id), format!("Track {}", id), format!("/music/{}.mp3", id))
        .with_artist("Artist")
        .with_album("Album")
}

#[test]
fn state_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");

    {
        let store = JsonFileStore::open(&path).unwrap();
        store.set_favorite(TrackId::new(1), true).unwrap();
        store.increment_play_count(TrackId::new(1)).unwrap();
        store.increment_play_count(TrackId::new(1)).unwrap();
        store.set_renamed_title(TrackId::new(2), "Better Name").unwrap();

        let mut playlist = Playlist::new(PlaylistId::new(10), "Evening");
        playlist.add(track(1));
        playlist.add(track(2));
        store.save_playlist(playlist).unwrap();
    }

    let store = JsonFileStore::open(&path).unwrap();
    assert!(store.is_favorite(TrackId::new(1)).unwrap());
    assert_eq!(store.play_count(TrackId::new(1)).unwrap(), 2);
    assert_eq!(
        store.renamed_title(TrackId::new(2)).unwrap().as_deref(),
        Some("Better Name")
    );

    let playlist = store.playlist(PlaylistId::new(10)).unwrap().unwrap();
    assert_eq!(playlist.name, "Evening");
    assert_eq!(playlist.track_count(), 2);
}

#[test]
fn save_playlist_replaces_by_id() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::open(dir.path().join("state.json")).unwrap();

    store
        .save_playlist(Playlist::new(PlaylistId::new(1), "Draft"))
        .unwrap();
    store
        .save_playlist(Playlist::new(PlaylistId::new(1), "Final"))
        .unwrap();

    let playlists = store.playlists().unwrap();
    assert_eq!(playlists.len(), 1);
    assert_eq!(playlists[0].name, "Final");
}

#[test]
fn delete_playlists_removes_only_listed_ids() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    let store = JsonFileStore::open(&path).unwrap();

    for id in 1..=3 {
        store
            .save_playlist(Playlist::new(PlaylistId::new(id), format!("List {}", id)))
            .unwrap();
    }
    store
        .delete_playlists(&[PlaylistId::new(1), PlaylistId::new(3), PlaylistId::new(99)])
        .unwrap();

    let reopened = JsonFileStore::open(&path).unwrap();
    let ids: Vec<i64> = reopened
        .playlists()
        .unwrap()
        .iter()
        .map(|p| p.id.get())
        .collect();
    assert_eq!(ids, vec![2]);
}

#[test]
fn playlist_track_edits_are_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    let store = JsonFileStore::open(&path).unwrap();
    let id = PlaylistId::new(4);

    store.save_playlist(Playlist::new(id, "Mix")).unwrap();
    store.add_track_to_playlist(id, track(1)).unwrap();
    store.add_track_to_playlist(id, track(2)).unwrap();
    store.remove_track_from_playlist(id, TrackId::new(1)).unwrap();

    let reopened = JsonFileStore::open(&path).unwrap();
    let playlist = reopened.playlist(id).unwrap().unwrap();
    assert_eq!(playlist.tracks.len(), 1);
    assert_eq!(playlist.tracks[0].id, TrackId::new(2));
}

#[test]
fn creates_missing_parent_directories() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("deeper").join("state.json");

    let store = JsonFileStore::open_with_retry(&path, RetryPolicy::none()).unwrap();
    store.set_favorite(TrackId::new(3), true).unwrap();

    assert!(path.exists());
    assert!(!path.with_file_name("state.json.tmp").exists());
}

#[test]
fn empty_file_opens_as_empty_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    std::fs::write(&path, "").unwrap();

    let store = JsonFileStore::open(&path).unwrap();
    assert!(store.favorites().unwrap().is_empty());
    assert!(store.playlists().unwrap().is_empty());
}

#[test]
fn corrupt_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    std::fs::write(&path, "{ not json").unwrap();

    assert!(JsonFileStore::open(&path).is_err());
}

/// Store whose temp file path is a directory, so every write fails
fn unwritable(dir: &std::path::Path, retry: RetryPolicy) -> JsonFileStore {
    let path = dir.join("state.json");
    std::fs::create_dir(dir.join("state.json.tmp")).unwrap();
    JsonFileStore::open_with_retry(&path, retry).unwrap()
}

#[test]
fn failed_write_leaves_state_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let store = unwritable(dir.path(), RetryPolicy::none());

    assert!(store.increment_play_count(TrackId::new(1)).is_err());
    assert_eq!(store.play_count(TrackId::new(1)).unwrap(), 0);
}

#[test]
fn reads_do_not_wait_for_a_retrying_write() {
    let dir = tempfile::tempdir().unwrap();
    let retry = RetryPolicy {
        max_attempts: 4,
        initial_backoff: Duration::from_millis(200),
        ..RetryPolicy::default()
    };
    let store = Arc::new(unwritable(dir.path(), retry));

    let writer = {
        let store = Arc::clone(&store);
        std::thread::spawn(move || store.increment_play_count(TrackId::new(1)))
    };
    std::thread::sleep(Duration::from_millis(50));

    let started = Instant::now();
    assert_eq!(store.play_count(TrackId::new(1)).unwrap(), 0);
    assert!(!store.is_favorite(TrackId::new(2)).unwrap());
    assert!(
        started.elapsed() < Duration::from_millis(150),
        "read waited {:?}",
        started.elapsed()
    );

    assert!(writer.join().unwrap().is_err());
}
