//! Encore - Playback Session
//!
//! The single authority over what is playing: one active context, an optional
//! shuffle order over it, repeat and transport state, and the engine that
//! renders the audio.
//!
//! This crate provides:
//! - The session state machine (`Idle`, `Loading`, `Playing`, `Paused`,
//!   `Ended`, `Error`)
//! - Next/previous policy with repeat None/All/One and shuffle
//! - Load tokens, so callbacks from abandoned loads are ignored
//! - A pre-load file check for local paths
//! - An actor that serializes commands and engine callbacks, polls the
//!   position while playing and fans events out to subscribers
//!
//! # Architecture
//!
//! `encore-playback` knows nothing about a concrete audio backend or storage:
//! - The engine is a [`PlaybackEngine`] trait object owned by the session
//! - Favorites and play counts come from an injected
//!   [`PlaybackStore`](encore_core::PlaybackStore)
//! - Hosts talk to the session through a [`SessionHandle`] and observe it
//!   through [`SessionEvent`]s
//!
//! # Example: Driving a session directly
//!
//! ```rust
//! use encore_core::{PlaybackContext, Track, TrackId};
//! use encore_playback::{
//!     EngineError, EngineEvent, LoadRequest, PlaybackConfig, PlaybackEngine,
//!     PlaybackSession, SessionStatus,
//! };
//! use encore_store::MemoryStore;
//! use std::sync::Arc;
//!
//! #[derive(Default)]
//! struct SilentEngine;
//!
//! impl PlaybackEngine for SilentEngine {
//!     fn load(&mut self, _request: LoadRequest) -> Result<(), EngineError> { Ok(()) }
//!     fn play(&mut self) -> Result<(), EngineError> { Ok(()) }
//!     fn pause(&mut self) -> Result<(), EngineError> { Ok(()) }
//!     fn stop(&mut self) {}
//!     fn seek_to(&mut self, _position_ms: u64) -> Result<(), EngineError> { Ok(()) }
//!     fn set_speed(&mut self, _speed: f32) -> Result<(), EngineError> { Ok(()) }
//!     fn set_volume(&mut self, _left: f32, _right: f32) -> Result<(), EngineError> { Ok(()) }
//!     fn current_position(&self) -> u64 { 0 }
//!     fn duration(&self) -> Option<u64> { None }
//! }
//!
//! let config = PlaybackConfig { check_files: false, ..PlaybackConfig::default() };
//! let mut session = PlaybackSession::new(
//!     &config,
//!     Box::new(SilentEngine),
//!     Arc::new(MemoryStore::new()),
//! );
//!
//! let context = PlaybackContext::library(vec![
//!     Track::new(TrackId::new(1), "Intro", "/music/01.mp3"),
//!     Track::new(TrackId::new(2), "Outro", "/music/02.mp3"),
//! ]);
//! session.play_at(context, 0).unwrap();
//! session.handle_engine_event(EngineEvent::ready(session.token(), None));
//! assert_eq!(session.status(), SessionStatus::Playing);
//!
//! session.next().unwrap();
//! assert_eq!(session.current_index(), Some(1));
//! ```

mod access;
pub mod actor;
mod command;
pub mod engine;
mod error;
pub mod events;
pub mod navigation;
mod session;
pub mod shuffle;
pub mod types;

// Public exports
pub use access::check_readable;
pub use actor::{channel, SessionHandle, SessionInbox};
pub use command::SessionCommand;
pub use engine::{
    EngineError, EngineEvent, EngineEventKind, EngineNotifier, LoadRequest, LoadToken,
    PlaybackEngine,
};
pub use error::{PlaybackError, Result};
pub use events::{EventBus, SessionEvent, StatePayload};
pub use session::PlaybackSession;
pub use shuffle::ShuffleOrder;
pub use types::{PlaybackConfig, RepeatMode, SessionStatus, StereoVolume};
