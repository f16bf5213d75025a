//! Error types for playback management

use thiserror::Error;

use crate::engine::EngineError;
use crate::types::SessionStatus;

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// File missing or unreadable, detected before the engine was asked to load
    #[error("Track unreadable: {path}: {reason}")]
    TrackUnreadable { path: String, reason: String },

    /// The engine reported a failure while loading or playing
    #[error("Playback failed: {0}")]
    EngineLoadFailed(String),

    /// Requested index is outside the context
    #[error("Index {index} out of range for a context of {len} tracks")]
    InvalidIndex { index: usize, len: usize },

    /// Context has no tracks
    #[error("Context has no tracks")]
    EmptyContext,

    /// Next/previous has no destination under the current policy
    ///
    /// Not a fault: the session turns it into the `Ended` transition.
    #[error("No track to move to")]
    NoTarget,

    /// Nothing is loaded
    #[error("Nothing loaded")]
    NothingLoaded,

    /// Operation not valid in the current status
    #[error("Cannot {operation} while {status}")]
    InvalidState {
        operation: &'static str,
        status: SessionStatus,
    },

    /// Speed must be finite and greater than zero
    #[error("Invalid playback speed: {0}")]
    InvalidSpeed(f32),

    /// Transport error from the engine (pause, seek, volume, ...)
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// The session actor is gone
    #[error("Playback session closed")]
    SessionClosed,
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
