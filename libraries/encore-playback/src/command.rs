//! Session commands
//!
//! Closed set of operations a host can ask of the session. Commands are
//! serializable so hosts can accept them from a wire protocol unchanged.

use encore_core::{PlaybackContext, Track, TrackId};
use serde::{Deserialize, Serialize};

use crate::types::RepeatMode;

/// Command accepted by the session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum SessionCommand {
    /// Replace the active context and play one of its tracks
    PlayAt {
        context: PlaybackContext,
        index: usize,
    },

    /// Pause when playing, resume when paused
    TogglePlayPause,

    /// Move forward under the navigation policy
    Next,

    /// Move backward under the navigation policy
    Previous,

    /// Turn shuffle on or off
    SetShuffle { enabled: bool },

    /// Set the repeat mode
    SetRepeat { mode: RepeatMode },

    /// Mute or unmute
    SetMuted { muted: bool },

    /// Set playback speed (> 0)
    SetSpeed { speed: f32 },

    /// Set per-channel volume (0.0..=1.0)
    SetVolume { left: f32, right: f32 },

    /// Seek within the loaded track
    SeekTo { position_ms: u64 },

    /// Stop and drop the context
    Stop,

    /// Insert a track right after the current one
    PlayNext { track: Track },

    /// Append a track to the active context
    AddToQueue { track: Track },

    /// Change a track's title wherever it appears in the context
    RenameTrack { id: TrackId, title: String },
}

impl SessionCommand {
    /// Short name for logging
    pub fn name(&self) -> &'static str {
        match self {
            SessionCommand::PlayAt { .. } => "play_at",
            SessionCommand::TogglePlayPause => "toggle_play_pause",
            SessionCommand::Next => "next",
            SessionCommand::Previous => "previous",
            SessionCommand::SetShuffle { .. } => "set_shuffle",
            SessionCommand::SetRepeat { .. } => "set_repeat",
            SessionCommand::SetMuted { .. } => "set_muted",
            SessionCommand::SetSpeed { .. } => "set_speed",
            SessionCommand::SetVolume { .. } => "set_volume",
            SessionCommand::SeekTo { .. } => "seek_to",
            SessionCommand::Stop => "stop",
            SessionCommand::PlayNext { .. } => "play_next",
            SessionCommand::AddToQueue { .. } => "add_to_queue",
            SessionCommand::RenameTrack { .. } => "rename_track",
        }
    }
}
