//! Session events
//!
//! The session queues events while it handles a command or engine callback;
//! the actor drains them and publishes them on the [`EventBus`] in order.
//! Every state-affecting operation ends with a [`SessionEvent::StateChanged`]
//! snapshot.

use encore_core::TrackId;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::types::{RepeatMode, SessionStatus};

/// Snapshot of the session as seen by the UI
///
/// Taken in one step from the session, so track fields and flags always
/// belong to the same moment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatePayload {
    pub track_id: Option<TrackId>,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album_art: Option<String>,
    pub status: SessionStatus,
    pub is_playing: bool,
    pub is_shuffle_enabled: bool,
    pub repeat_mode: RepeatMode,
    pub is_muted: bool,
    pub speed: f32,
    pub position_ms: u64,
    pub duration_ms: Option<u64>,
    pub context_name: Option<String>,
    pub context_index: Option<usize>,
    pub context_len: usize,
    pub is_favorite: bool,
    pub play_count: u32,
    /// Reason for the last failure while in the `Error` status
    pub error: Option<String>,
}

/// Events emitted by the playback session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    /// Full state snapshot
    StateChanged(StatePayload),

    /// A different track started loading
    TrackChanged {
        /// The new (current) track
        track_id: TrackId,
        /// The track it replaced, if any
        previous_track_id: Option<TrackId>,
    },

    /// Periodic position while playing
    Position {
        /// Engine position
        position_ms: u64,
        /// Duration, if known
        duration_ms: Option<u64>,
    },

    /// Context exhausted without repeat
    Ended,

    /// Load or playback failure
    Error {
        /// Human-readable reason
        reason: String,
    },
}

impl SessionEvent {
    /// Short name for logging
    pub fn name(&self) -> &'static str {
        match self {
            SessionEvent::StateChanged(_) => "state_changed",
            SessionEvent::TrackChanged { .. } => "track_changed",
            SessionEvent::Position { .. } => "position",
            SessionEvent::Ended => "ended",
            SessionEvent::Error { .. } => "error",
        }
    }
}

/// Fan-out of session events to every subscriber
///
/// Subscribers that fall more than `capacity` events behind observe a lag
/// error from their receiver and continue from the oldest retained event.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<SessionEvent>,
}

impl EventBus {
    /// Create a bus buffering up to `capacity` events per subscriber
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribe to the event stream
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }

    /// Publish an event; returns how many subscribers received it
    pub fn publish(&self, event: SessionEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    /// Number of live subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
