//! Pre-load file check
//!
//! Local files are opened once before the engine sees them so that a missing
//! or unreadable file is reported as such rather than as an opaque decoder
//! failure. Content URIs are left to the engine.

use encore_core::Track;
use std::fs::File;
use std::io::ErrorKind;

use crate::error::{PlaybackError, Result};

/// Check that a track's local file exists and can be opened
pub fn check_readable(track: &Track) -> Result<()> {
    let Some(path) = track.file_path() else {
        return Ok(());
    };

    let unreadable = |reason: String| PlaybackError::TrackUnreadable {
        path: track.path.clone(),
        reason,
    };

    let metadata = std::fs::metadata(path).map_err(|e| unreadable(describe(e.kind(), &e)))?;
    if !metadata.is_file() {
        return Err(unreadable("not a regular file".to_string()));
    }

    File::open(path).map_err(|e| unreadable(describe(e.kind(), &e)))?;
    Ok(())
}

fn describe(kind: ErrorKind, err: &std::io::Error) -> String {
    match kind {
        ErrorKind::NotFound => "file not found".to_string(),
        ErrorKind::PermissionDenied => "permission denied".to_string(),
        _ => err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use encore_core::TrackId;

    fn track_at(path: &std::path::Path) -> Track {
        Track::new(TrackId::new(1), "Song", path.to_string_lossy().into_owned())
    }

    #[test]
    fn existing_file_is_readable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("song.mp3");
        std::fs::write(&path, b"ID3").unwrap();

        assert!(check_readable(&track_at(&path)).is_ok());
    }

    #[test]
    fn missing_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.mp3");

        match check_readable(&track_at(&path)) {
            Err(PlaybackError::TrackUnreadable { reason, .. }) => {
                assert_eq!(reason, "file not found");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn directory_is_not_playable() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            check_readable(&track_at(dir.path())),
            Err(PlaybackError::TrackUnreadable { .. })
        ));
    }

    #[test]
    fn uris_are_not_checked() {
        let track = Track::new(TrackId::new(2), "Stream", "content://media/external/audio/2");
        assert!(check_readable(&track).is_ok());
    }
}
