//! Playback session state machine
//!
//! Owns the active context, the shuffle order and the engine. All mutation
//! happens through `&mut self`; the actor guarantees commands and engine
//! callbacks arrive one at a time. Events are queued while an operation runs
//! and drained by the host afterwards.
//!
//! ```text
//! Idle ──play_at──▶ Loading ──ready──▶ Playing ⇄ Paused
//!                      │                  │
//!                      └──failure──▶ Error   └──no target──▶ Ended
//! ```
//! `Ended` and `Error` accept a new `play_at` (or next/previous).

use encore_core::{PlaybackContext, PlaybackStore, Track, TrackId};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{debug, error, info, warn};

use crate::access;
use crate::command::SessionCommand;
use crate::engine::{EngineEvent, EngineEventKind, LoadRequest, LoadToken, PlaybackEngine};
use crate::error::{PlaybackError, Result};
use crate::events::{SessionEvent, StatePayload};
use crate::navigation::{self, Direction};
use crate::shuffle::ShuffleOrder;
use crate::types::{is_valid_speed, PlaybackConfig, RepeatMode, SessionStatus, StereoVolume};

/// Playback session
pub struct PlaybackSession {
    engine: Box<dyn PlaybackEngine>,
    store: Arc<dyn PlaybackStore>,
    check_files: bool,
    rng: StdRng,

    status: SessionStatus,
    context: Option<PlaybackContext>,
    current: Option<usize>,
    shuffle_enabled: bool,
    shuffle: Option<ShuffleOrder>,
    repeat: RepeatMode,
    muted: bool,
    speed: f32,
    // Last audible volume, restored on unmute
    volume: StereoVolume,
    duration_ms: Option<u64>,
    last_error: Option<String>,
    token: LoadToken,
    // Count published for a play whose write is still in flight
    recorded_play: Option<(TrackId, u32)>,

    pending_events: Vec<SessionEvent>,
}

impl PlaybackSession {
    /// Create an idle session
    pub fn new(
        config: &PlaybackConfig,
        engine: Box<dyn PlaybackEngine>,
        store: Arc<dyn PlaybackStore>,
    ) -> Self {
        let rng = config
            .shuffle_seed
            .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);

        let speed = if is_valid_speed(config.speed) {
            config.speed
        } else {
            warn!(speed = config.speed, "Invalid initial speed, using 1.0");
            1.0
        };

        let volume = StereoVolume::new(config.volume.left, config.volume.right);
        let muted = volume.is_silent();

        Self {
            engine,
            store,
            check_files: config.check_files,
            rng,
            status: SessionStatus::Idle,
            context: None,
            current: None,
            shuffle_enabled: config.shuffle,
            shuffle: None,
            repeat: config.repeat,
            muted,
            speed,
            volume: if muted { StereoVolume::FULL } else { volume },
            duration_ms: None,
            last_error: None,
            token: LoadToken::default(),
            recorded_play: None,
            pending_events: Vec::new(),
        }
    }

    /// Apply a command
    pub fn apply(&mut self, command: SessionCommand) -> Result<()> {
        match command {
            SessionCommand::PlayAt { context, index } => self.play_at(context, index),
            SessionCommand::TogglePlayPause => self.toggle_play_pause(),
            SessionCommand::Next => self.next(),
            SessionCommand::Previous => self.previous(),
            SessionCommand::SetShuffle { enabled } => {
                self.set_shuffle_enabled(enabled);
                Ok(())
            }
            SessionCommand::SetRepeat { mode } => {
                self.set_repeat_mode(mode);
                Ok(())
            }
            SessionCommand::SetMuted { muted } => self.set_muted(muted),
            SessionCommand::SetSpeed { speed } => self.set_speed(speed),
            SessionCommand::SetVolume { left, right } => self.set_volume(left, right),
            SessionCommand::SeekTo { position_ms } => self.seek_to(position_ms),
            SessionCommand::Stop => {
                self.stop();
                Ok(())
            }
            SessionCommand::PlayNext { track } => self.play_next(track),
            SessionCommand::AddToQueue { track } => self.add_to_queue(track),
            SessionCommand::RenameTrack { id, title } => {
                self.rename_track(id, &title);
                Ok(())
            }
        }
    }

    // ===== Transport =====

    /// Replace the active context and start loading `context[index]`
    pub fn play_at(&mut self, context: PlaybackContext, index: usize) -> Result<()> {
        if context.is_empty() {
            return Err(PlaybackError::EmptyContext);
        }
        if index >= context.len() {
            return Err(PlaybackError::InvalidIndex {
                index,
                len: context.len(),
            });
        }

        info!(
            context = %context.kind,
            index,
            tracks = context.len(),
            "Switching playback context"
        );

        let previous = self.current_track_id();
        self.shuffle = if self.shuffle_enabled {
            Some(ShuffleOrder::generate(context.len(), Some(index), &mut self.rng))
        } else {
            None
        };
        self.context = Some(context);
        self.load_index(index, previous);
        Ok(())
    }

    /// Pause when playing, resume when paused
    pub fn toggle_play_pause(&mut self) -> Result<()> {
        match self.status {
            SessionStatus::Playing => {
                self.engine.pause()?;
                self.status = SessionStatus::Paused;
                debug!("Paused");
            }
            SessionStatus::Paused => {
                self.engine.play()?;
                self.status = SessionStatus::Playing;
                debug!("Resumed");
            }
            SessionStatus::Idle => return Err(PlaybackError::NothingLoaded),
            status => {
                return Err(PlaybackError::InvalidState {
                    operation: "toggle play/pause",
                    status,
                })
            }
        }
        self.publish_state();
        Ok(())
    }

    /// Move to the next track under the navigation policy
    pub fn next(&mut self) -> Result<()> {
        self.advance(Direction::Next)
    }

    /// Move to the previous track under the navigation policy
    pub fn previous(&mut self) -> Result<()> {
        self.advance(Direction::Previous)
    }

    /// Seek within the loaded track, clamped to its duration when known
    pub fn seek_to(&mut self, position_ms: u64) -> Result<()> {
        if !self.status.is_loaded() {
            return Err(PlaybackError::NothingLoaded);
        }

        let target = self
            .duration_ms
            .map_or(position_ms, |duration| position_ms.min(duration));
        self.engine.seek_to(target)?;
        debug!(position_ms = target, "Seeked");
        self.publish_state();
        Ok(())
    }

    /// Stop playback and drop the active context
    pub fn stop(&mut self) {
        info!("Stopping playback");
        self.token = self.token.next();
        self.engine.stop();

        self.status = SessionStatus::Idle;
        self.context = None;
        self.current = None;
        self.shuffle = None;
        self.duration_ms = None;
        self.last_error = None;
        self.publish_state();
    }

    // ===== Modes and levels =====

    /// Turn shuffle on or off
    ///
    /// Enabling generates a new order with the current track first; disabling
    /// keeps the current track and returns to context order.
    pub fn set_shuffle_enabled(&mut self, enabled: bool) {
        self.shuffle_enabled = enabled;
        self.shuffle = match (&self.context, enabled) {
            (Some(context), true) => Some(ShuffleOrder::generate(
                context.len(),
                self.current,
                &mut self.rng,
            )),
            _ => None,
        };
        debug!(enabled, "Shuffle changed");
        self.publish_state();
    }

    /// Set the repeat mode
    pub fn set_repeat_mode(&mut self, mode: RepeatMode) {
        self.repeat = mode;
        debug!(mode = %mode, "Repeat changed");
        self.publish_state();
    }

    /// Mute or unmute; unmuting restores the last audible volume
    pub fn set_muted(&mut self, muted: bool) -> Result<()> {
        let volume = if muted {
            StereoVolume::SILENT
        } else {
            self.volume
        };
        self.engine.set_volume(volume.left, volume.right)?;
        self.muted = muted;
        self.publish_state();
        Ok(())
    }

    /// Set per-channel volume
    ///
    /// Silence on both channels mutes; any audible level unmutes.
    pub fn set_volume(&mut self, left: f32, right: f32) -> Result<()> {
        let volume = StereoVolume::new(left, right);
        self.engine.set_volume(volume.left, volume.right)?;

        if volume.is_silent() {
            self.muted = true;
        } else {
            self.muted = false;
            self.volume = volume;
        }
        self.publish_state();
        Ok(())
    }

    /// Set playback speed
    pub fn set_speed(&mut self, speed: f32) -> Result<()> {
        if !is_valid_speed(speed) {
            return Err(PlaybackError::InvalidSpeed(speed));
        }
        self.engine.set_speed(speed)?;
        self.speed = speed;
        self.publish_state();
        Ok(())
    }

    // ===== Context edits =====

    /// Insert a track right after the current one
    ///
    /// With nothing loaded the track is played on its own.
    pub fn play_next(&mut self, track: Track) -> Result<()> {
        let Some(current) = self.current.filter(|_| self.context.is_some()) else {
            return self.play_at(PlaybackContext::library(vec![track]), 0);
        };

        let index = self
            .context
            .as_mut()
            .map(|context| context.insert(current + 1, track));
        if let (Some(index), Some(order)) = (index, self.shuffle.as_mut()) {
            order.insert_after_cursor(index);
        }

        debug!(index = ?index, "Track scheduled to play next");
        self.publish_state();
        Ok(())
    }

    /// Append a track to the active context
    ///
    /// With nothing loaded the track is played on its own.
    pub fn add_to_queue(&mut self, track: Track) -> Result<()> {
        if self.context.is_none() {
            return self.play_at(PlaybackContext::library(vec![track]), 0);
        }

        let index = self.context.as_mut().map(|context| context.push(track));
        if let (Some(index), Some(order)) = (index, self.shuffle.as_mut()) {
            order.push_back(index);
        }

        debug!(index = ?index, "Track added to queue");
        self.publish_state();
        Ok(())
    }

    /// Update a track's title everywhere it appears in the active context
    pub fn rename_track(&mut self, id: TrackId, title: &str) {
        let updated = self
            .context
            .as_mut()
            .map_or(0, |context| context.rename(id, title));
        if updated == 0 {
            return;
        }

        debug!(track = %id, updated, "Track renamed");
        if self.current_track_id() == Some(id) {
            self.publish_state();
        }
    }

    // ===== Engine callbacks =====

    /// Handle an engine callback
    ///
    /// Callbacks for any load other than the latest are ignored.
    pub fn handle_engine_event(&mut self, event: EngineEvent) {
        if event.token != self.token {
            debug!(
                token = %event.token,
                current = %self.token,
                "Ignoring stale engine callback"
            );
            return;
        }

        match event.kind {
            EngineEventKind::Ready { duration_ms } => self.on_ready(duration_ms),
            EngineEventKind::Ended => self.on_ended(),
            EngineEventKind::Failed { reason } => {
                if matches!(
                    self.status,
                    SessionStatus::Loading | SessionStatus::Playing | SessionStatus::Paused
                ) {
                    self.fail(PlaybackError::EngineLoadFailed(reason));
                }
            }
        }
    }

    /// Publish the engine position (called by the poller while playing)
    pub fn poll_position(&mut self) {
        if self.status != SessionStatus::Playing {
            return;
        }
        let position_ms = self.engine.current_position();
        let duration_ms = self.engine.duration().or(self.duration_ms);
        self.pending_events.push(SessionEvent::Position {
            position_ms,
            duration_ms,
        });
        self.publish_state();
    }

    /// Release the engine before the session is dropped
    pub fn shutdown(&mut self) {
        debug!("Shutting down playback session");
        self.token = self.token.next();
        self.engine.stop();
    }

    // ===== Queries =====

    /// Take the events queued since the last drain
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Current status
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Whether audio is playing
    pub fn is_playing(&self) -> bool {
        self.status == SessionStatus::Playing
    }

    /// Active context
    pub fn context(&self) -> Option<&PlaybackContext> {
        self.context.as_ref()
    }

    /// Index of the current track in the active context
    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    /// Current track
    pub fn current_track(&self) -> Option<&Track> {
        self.context.as_ref()?.get(self.current?)
    }

    /// Shuffle order, while shuffle is active
    pub fn shuffle_order(&self) -> Option<&ShuffleOrder> {
        self.shuffle.as_ref()
    }

    /// Whether shuffle is enabled
    pub fn is_shuffle_enabled(&self) -> bool {
        self.shuffle_enabled
    }

    /// Repeat mode
    pub fn repeat_mode(&self) -> RepeatMode {
        self.repeat
    }

    /// Whether output is muted
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Playback speed
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Volume currently applied to the engine
    pub fn volume(&self) -> StereoVolume {
        if self.muted {
            StereoVolume::SILENT
        } else {
            self.volume
        }
    }

    /// Token of the latest load
    pub fn token(&self) -> LoadToken {
        self.token
    }

    /// Whether `next` has somewhere to go
    pub fn has_next(&self) -> bool {
        self.is_navigable(Direction::Next)
    }

    /// Whether `previous` has somewhere to go
    pub fn has_previous(&self) -> bool {
        self.is_navigable(Direction::Previous)
    }

    /// Engine position, 0 unless a track is loaded
    pub fn position_ms(&self) -> u64 {
        if self.status.is_loaded() {
            self.engine.current_position()
        } else {
            0
        }
    }

    /// Snapshot of the whole session
    pub fn payload(&self) -> StatePayload {
        let track = self.current_track();
        let (is_favorite, play_count) = track.map_or((false, 0), |t| self.user_state(t.id));

        StatePayload {
            track_id: track.map(|t| t.id),
            title: track.map(|t| t.title.clone()),
            artist: track.map(|t| t.artist.clone()),
            album_art: track.and_then(|t| t.art.clone()),
            status: self.status,
            is_playing: self.is_playing(),
            is_shuffle_enabled: self.shuffle_enabled,
            repeat_mode: self.repeat,
            is_muted: self.muted,
            speed: self.speed,
            position_ms: self.position_ms(),
            duration_ms: self.duration_ms,
            context_name: self.context.as_ref().map(|c| c.name().to_string()),
            context_index: self.current,
            context_len: self.context.as_ref().map_or(0, PlaybackContext::len),
            is_favorite,
            play_count,
            error: if self.status == SessionStatus::Error {
                self.last_error.clone()
            } else {
                None
            },
        }
    }

    // ===== Internals =====

    fn current_track_id(&self) -> Option<TrackId> {
        self.current_track().map(|t| t.id)
    }

    fn is_navigable(&self, direction: Direction) -> bool {
        match (&self.context, self.current) {
            (Some(context), Some(current)) => navigation::is_available(
                direction,
                current,
                context.len(),
                self.repeat,
                self.shuffle.as_ref(),
            ),
            _ => false,
        }
    }

    fn advance(&mut self, direction: Direction) -> Result<()> {
        let (Some(len), Some(current)) = (self.context.as_ref().map(PlaybackContext::len), self.current)
        else {
            return Err(PlaybackError::NothingLoaded);
        };

        match navigation::resolve(direction, current, len, self.repeat, self.shuffle.as_ref()) {
            Ok(target) => {
                let previous = self.current_track_id();
                self.load_index(target, previous);
                Ok(())
            }
            Err(PlaybackError::NoTarget) => {
                self.end();
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    /// Start loading `context[index]` under a fresh token
    fn load_index(&mut self, index: usize, previous: Option<TrackId>) {
        let Some(track) = self.context.as_ref().and_then(|c| c.get(index)).cloned() else {
            warn!(index, "Load target is not in the context");
            return;
        };

        if self.status == SessionStatus::Loading {
            debug!(token = %self.token, "Cancelling in-flight load");
            self.engine.stop();
        }

        self.token = self.token.next();
        self.current = Some(index);
        if let Some(order) = self.shuffle.as_mut() {
            order.seek_to_index(index);
        }
        self.duration_ms = (track.duration_ms > 0).then_some(track.duration_ms);
        self.last_error = None;

        if previous != Some(track.id) {
            self.pending_events.push(SessionEvent::TrackChanged {
                track_id: track.id,
                previous_track_id: previous,
            });
        }

        if self.check_files {
            if let Err(err) = access::check_readable(&track) {
                self.fail(err);
                return;
            }
        }

        info!(
            token = %self.token,
            track = %track.id,
            title = %track.title,
            index,
            "Loading track"
        );

        let request = LoadRequest {
            token: self.token,
            track_id: track.id,
            uri: track.path,
            duration_hint_ms: track.duration_ms,
        };
        match self.engine.load(request) {
            Ok(()) => {
                self.status = SessionStatus::Loading;
                self.publish_state();
            }
            Err(err) => self.fail(PlaybackError::EngineLoadFailed(err.to_string())),
        }
    }

    fn on_ready(&mut self, duration_ms: Option<u64>) {
        if self.status != SessionStatus::Loading {
            debug!(status = %self.status, "Ready outside of a load, ignoring");
            return;
        }
        if let Some(duration) = duration_ms.filter(|&d| d > 0) {
            self.duration_ms = Some(duration);
        }

        if let Err(err) = self.apply_engine_settings() {
            warn!(error = %err, "Failed to apply speed/volume to the engine");
        }
        if let Err(err) = self.engine.play() {
            self.fail(PlaybackError::EngineLoadFailed(err.to_string()));
            return;
        }

        self.status = SessionStatus::Playing;
        info!(token = %self.token, duration_ms = ?self.duration_ms, "Playback started");
        self.record_play();
        self.publish_state();
    }

    fn on_ended(&mut self) {
        if !self.status.is_loaded() {
            debug!(status = %self.status, "Track end outside of playback, ignoring");
            return;
        }
        debug!("Track ended, advancing");
        if let Err(err) = self.advance(Direction::Next) {
            warn!(error = %err, "Auto-advance failed");
        }
    }

    fn apply_engine_settings(&mut self) -> Result<()> {
        self.engine.set_speed(self.speed)?;
        let volume = self.volume();
        self.engine.set_volume(volume.left, volume.right)?;
        Ok(())
    }

    fn end(&mut self) {
        info!("Reached the end of the context");
        self.token = self.token.next();
        self.engine.stop();
        self.status = SessionStatus::Ended;
        self.pending_events.push(SessionEvent::Ended);
        self.publish_state();
    }

    fn fail(&mut self, err: PlaybackError) {
        let reason = err.to_string();
        error!(token = %self.token, "{}", reason);

        self.token = self.token.next();
        self.engine.stop();
        self.status = SessionStatus::Error;
        self.last_error = Some(reason.clone());
        self.pending_events.push(SessionEvent::Error { reason });
        self.publish_state();
    }

    /// Count a play of the current track
    ///
    /// Inside a tokio runtime the write runs on the blocking pool, since a
    /// store may touch the disk and back off between attempts.
    fn record_play(&mut self) {
        let Some(id) = self.current_track_id() else {
            return;
        };

        let Ok(runtime) = Handle::try_current() else {
            write_play(self.store.as_ref(), id);
            return;
        };

        if let Ok(stored) = self.store.play_count(id) {
            self.recorded_play = Some((id, self.play_count_for(id, stored) + 1));
        }
        let store = Arc::clone(&self.store);
        drop(runtime.spawn_blocking(move || write_play(store.as_ref(), id)));
    }

    fn play_count_for(&self, id: TrackId, stored: u32) -> u32 {
        match self.recorded_play {
            Some((recorded, count)) if recorded == id => stored.max(count),
            _ => stored,
        }
    }

    fn user_state(&self, id: TrackId) -> (bool, u32) {
        let is_favorite = self.store.is_favorite(id).unwrap_or_else(|err| {
            warn!(track = %id, error = %err, "Failed to read favorite flag");
            false
        });
        let play_count = self.store.play_count(id).map_or_else(
            |err| {
                warn!(track = %id, error = %err, "Failed to read play count");
                0
            },
            |stored| self.play_count_for(id, stored),
        );
        (is_favorite, play_count)
    }

    fn publish_state(&mut self) {
        let payload = self.payload();
        self.pending_events.push(SessionEvent::StateChanged(payload));
    }
}

fn write_play(store: &dyn PlaybackStore, id: TrackId) {
    match store.increment_play_count(id) {
        Ok(count) => debug!(track = %id, count, "Play recorded"),
        Err(err) => warn!(track = %id, error = %err, "Failed to record play"),
    }
}
