//! Playback engine contract
//!
//! The engine owns the single underlying audio player. Commands are
//! synchronous calls; transitions that finish later (ready, ended, failure)
//! come back as [`EngineEvent`]s posted through an [`EngineNotifier`], each
//! tagged with the [`LoadToken`] of the load that produced it.

use encore_core::TrackId;
use std::fmt;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::debug;

use crate::actor::Envelope;

/// Identifies one load request
///
/// Tokens increase monotonically per session. A callback carrying any token
/// other than the session's current one is stale and ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoadToken(u64);

impl LoadToken {
    /// Wrap a raw token value
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Raw value
    pub fn get(self) -> u64 {
        self.0
    }

    /// The token after this one
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for LoadToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What to load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    /// Token to echo back in every callback for this load
    pub token: LoadToken,

    /// Track being loaded
    pub track_id: TrackId,

    /// File path or content URI
    pub uri: String,

    /// Duration from the catalog, 0 if unknown
    pub duration_hint_ms: u64,
}

/// Asynchronous engine transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEventKind {
    /// Loaded and ready to play
    Ready {
        /// Duration reported by the decoder, if known
        duration_ms: Option<u64>,
    },

    /// Reached the end of the track
    Ended,

    /// Load or playback failed
    Failed {
        /// Human-readable reason
        reason: String,
    },
}

/// Engine callback tagged with its load token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineEvent {
    /// Load this event belongs to
    pub token: LoadToken,

    /// What happened
    pub kind: EngineEventKind,
}

impl EngineEvent {
    /// Ready callback
    pub fn ready(token: LoadToken, duration_ms: Option<u64>) -> Self {
        Self {
            token,
            kind: EngineEventKind::Ready { duration_ms },
        }
    }

    /// End-of-track callback
    pub fn ended(token: LoadToken) -> Self {
        Self {
            token,
            kind: EngineEventKind::Ended,
        }
    }

    /// Failure callback
    pub fn failed(token: LoadToken, reason: impl Into<String>) -> Self {
        Self {
            token,
            kind: EngineEventKind::Failed {
                reason: reason.into(),
            },
        }
    }
}

/// Synchronous engine errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The engine refused the load request outright
    #[error("load rejected: {0}")]
    LoadRejected(String),

    /// A transport command failed
    #[error("{0}")]
    Transport(String),

    /// The underlying player has been released
    #[error("engine unavailable")]
    Unavailable,
}

/// The underlying audio player
///
/// `load` replaces whatever is currently loaded. All other commands must be
/// accepted at any time; with nothing loaded they only update settings.
#[cfg_attr(test, mockall::automock)]
pub trait PlaybackEngine: Send {
    /// Start loading a track; completion is reported through the notifier
    fn load(&mut self, request: LoadRequest) -> Result<(), EngineError>;

    /// Start or resume playback
    fn play(&mut self) -> Result<(), EngineError>;

    /// Pause playback
    fn pause(&mut self) -> Result<(), EngineError>;

    /// Stop and release the loaded track, including one still loading
    fn stop(&mut self);

    /// Seek within the loaded track
    fn seek_to(&mut self, position_ms: u64) -> Result<(), EngineError>;

    /// Set playback speed
    fn set_speed(&mut self, speed: f32) -> Result<(), EngineError>;

    /// Set per-channel volume
    fn set_volume(&mut self, left: f32, right: f32) -> Result<(), EngineError>;

    /// Current position in milliseconds
    fn current_position(&self) -> u64;

    /// Duration of the loaded track, if known
    fn duration(&self) -> Option<u64>;
}

/// Posts engine callbacks into a session's mailbox
///
/// Cheap to clone and safe to call from any thread. Holding a notifier does
/// not keep the session alive; once it is gone, notifications are dropped.
#[derive(Clone)]
pub struct EngineNotifier {
    mailbox: mpsc::WeakUnboundedSender<Envelope>,
}

impl EngineNotifier {
    pub(crate) fn new(mailbox: mpsc::WeakUnboundedSender<Envelope>) -> Self {
        Self { mailbox }
    }

    /// Post a callback; returns false if the session is gone
    pub fn notify(&self, event: EngineEvent) -> bool {
        let Some(mailbox) = self.mailbox.upgrade() else {
            debug!(token = %event.token, "Session gone, dropping engine callback");
            return false;
        };
        mailbox.send(Envelope::Engine(event)).is_ok()
    }

    /// Report that the load for `token` is ready
    pub fn ready(&self, token: LoadToken, duration_ms: Option<u64>) -> bool {
        self.notify(EngineEvent::ready(token, duration_ms))
    }

    /// Report that the track for `token` ended
    pub fn ended(&self, token: LoadToken) -> bool {
        self.notify(EngineEvent::ended(token))
    }

    /// Report that the load or playback for `token` failed
    pub fn failed(&self, token: LoadToken, reason: impl Into<String>) -> bool {
        self.notify(EngineEvent::failed(token, reason))
    }
}

impl fmt::Debug for EngineNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineNotifier")
            .field("connected", &(self.mailbox.strong_count() > 0))
            .finish()
    }
}
