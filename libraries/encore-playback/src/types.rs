//! Core types for the playback session

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Repeat mode
///
/// Converts to and from the primitive ordinal used on the wire
/// (`None = 0`, `All = 1`, `One = 2`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatMode {
    /// Stop when the context ends
    #[default]
    None,

    /// Loop the entire context
    All,

    /// Loop the current track only
    One,
}

impl RepeatMode {
    /// Wire ordinal
    pub fn ordinal(self) -> u8 {
        match self {
            RepeatMode::None => 0,
            RepeatMode::All => 1,
            RepeatMode::One => 2,
        }
    }

    /// Next mode in the None → All → One → None cycle
    pub fn cycle(self) -> Self {
        match self {
            RepeatMode::None => RepeatMode::All,
            RepeatMode::All => RepeatMode::One,
            RepeatMode::One => RepeatMode::None,
        }
    }
}

impl TryFrom<u8> for RepeatMode {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(RepeatMode::None),
            1 => Ok(RepeatMode::All),
            2 => Ok(RepeatMode::One),
            other => Err(other),
        }
    }
}

impl From<RepeatMode> for u8 {
    fn from(mode: RepeatMode) -> Self {
        mode.ordinal()
    }
}

impl fmt::Display for RepeatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepeatMode::None => write!(f, "none"),
            RepeatMode::All => write!(f, "all"),
            RepeatMode::One => write!(f, "one"),
        }
    }
}

/// Session status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// No context loaded
    #[default]
    Idle,

    /// Waiting for the engine to report ready
    Loading,

    /// Currently playing
    Playing,

    /// Paused mid-track
    Paused,

    /// Context exhausted with no repeat
    Ended,

    /// File or engine failure
    Error,
}

impl SessionStatus {
    /// Whether a track is loaded in the engine
    pub fn is_loaded(self) -> bool {
        matches!(self, SessionStatus::Playing | SessionStatus::Paused)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionStatus::Idle => "idle",
            SessionStatus::Loading => "loading",
            SessionStatus::Playing => "playing",
            SessionStatus::Paused => "paused",
            SessionStatus::Ended => "ended",
            SessionStatus::Error => "in error",
        };
        f.write_str(name)
    }
}

/// Per-channel volume, each level in `0.0..=1.0`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StereoVolume {
    /// Left channel level
    pub left: f32,

    /// Right channel level
    pub right: f32,
}

impl StereoVolume {
    /// Both channels at full level
    pub const FULL: Self = Self {
        left: 1.0,
        right: 1.0,
    };

    /// Both channels silent
    pub const SILENT: Self = Self {
        left: 0.0,
        right: 0.0,
    };

    /// Create a volume, clamping each level into range
    ///
    /// NaN levels are treated as silence.
    pub fn new(left: f32, right: f32) -> Self {
        Self {
            left: clamp_level(left),
            right: clamp_level(right),
        }
    }

    /// Whether both channels are silent
    pub fn is_silent(self) -> bool {
        self.left <= 0.0 && self.right <= 0.0
    }
}

impl Default for StereoVolume {
    fn default() -> Self {
        Self::FULL
    }
}

fn clamp_level(level: f32) -> f32 {
    if level.is_nan() {
        0.0
    } else {
        level.clamp(0.0, 1.0)
    }
}

/// Configuration for a playback session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Initial repeat mode (default: None)
    pub repeat: RepeatMode,

    /// Initial shuffle flag (default: false)
    pub shuffle: bool,

    /// Initial speed (default: 1.0)
    pub speed: f32,

    /// Initial volume (default: full on both channels)
    pub volume: StereoVolume,

    /// Check local files are readable before handing them to the engine (default: true)
    pub check_files: bool,

    /// Position poll interval while playing (default: 500)
    pub poll_interval_ms: u64,

    /// Event bus buffer per subscriber (default: 256)
    pub event_capacity: usize,

    /// Fixed seed for shuffle orders, for reproducible runs
    pub shuffle_seed: Option<u64>,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            repeat: RepeatMode::None,
            shuffle: false,
            speed: 1.0,
            volume: StereoVolume::FULL,
            check_files: true,
            poll_interval_ms: 500,
            event_capacity: 256,
            shuffle_seed: None,
        }
    }
}

impl PlaybackConfig {
    /// Poll interval as a duration, never zero
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

/// Whether a speed value is accepted by the session
pub fn is_valid_speed(speed: f32) -> bool {
    speed.is_finite() && speed > 0.0
}
