//! Simulated playback engine
//!
//! Plays nothing, but keeps time like a real player: loads become ready after
//! a short delay, position advances with the speed while playing, and the end
//! of the track is reported through the notifier. Content URIs containing
//! `unavailable` fail to load, which lets failure paths be exercised by hand.

use encore_playback::{EngineError, EngineNotifier, LoadRequest, LoadToken, PlaybackEngine};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

use crate::config::EngineSettings;

#[derive(Debug, Clone, Copy)]
struct Loaded {
    token: LoadToken,
    duration_ms: u64,
}

pub struct SimulatedEngine {
    notifier: EngineNotifier,
    runtime: Handle,
    load_delay: Duration,
    fallback_duration_ms: u64,

    loaded: Option<Loaded>,
    // Position at the last start/pause/seek, and when playback resumed
    offset_ms: u64,
    playing_since: Option<Instant>,
    speed: f32,
    volume: (f32, f32),

    pending: Option<JoinHandle<()>>,
}

impl SimulatedEngine {
    /// Create an engine; must be called from within a tokio runtime
    pub fn new(notifier: EngineNotifier, settings: &EngineSettings) -> Self {
        Self {
            notifier,
            runtime: Handle::current(),
            load_delay: Duration::from_millis(settings.load_delay_ms),
            fallback_duration_ms: settings.fallback_duration_ms,
            loaded: None,
            offset_ms: 0,
            playing_since: None,
            speed: 1.0,
            volume: (1.0, 1.0),
            pending: None,
        }
    }

    /// Volume last applied by the session
    pub fn volume(&self) -> (f32, f32) {
        self.volume
    }

    fn cancel_pending(&mut self) {
        if let Some(task) = self.pending.take() {
            task.abort();
        }
    }

    /// Fold elapsed play time into the offset
    fn settle(&mut self) {
        self.offset_ms = self.position_now();
        if self.playing_since.is_some() {
            self.playing_since = Some(Instant::now());
        }
    }

    fn position_now(&self) -> u64 {
        let elapsed = self.playing_since.map_or(0.0, |since| {
            since.elapsed().as_millis() as f64 * f64::from(self.speed)
        });
        let position = self.offset_ms.saturating_add(elapsed as u64);
        self.loaded
            .map_or(position, |loaded| position.min(loaded.duration_ms))
    }

    /// Schedule the end-of-track callback from the current position
    ///
    /// A pending load callback is left alone while nothing is playing.
    fn schedule_end(&mut self) {
        let Some(loaded) = self.loaded else {
            return;
        };
        if self.playing_since.is_none() {
            return;
        }
        self.cancel_pending();

        let remaining = loaded.duration_ms.saturating_sub(self.offset_ms);
        let wall = Duration::from_millis((remaining as f64 / f64::from(self.speed)) as u64);
        let notifier = self.notifier.clone();
        self.pending = Some(self.runtime.spawn(async move {
            tokio::time::sleep(wall).await;
            notifier.ended(loaded.token);
        }));
    }
}

impl PlaybackEngine for SimulatedEngine {
    fn load(&mut self, request: LoadRequest) -> Result<(), EngineError> {
        self.cancel_pending();
        self.playing_since = None;
        self.offset_ms = 0;

        let duration_ms = if request.duration_hint_ms > 0 {
            request.duration_hint_ms
        } else {
            self.fallback_duration_ms
        };
        self.loaded = Some(Loaded {
            token: request.token,
            duration_ms,
        });

        debug!(token = %request.token, uri = %request.uri, "Simulating load");
        let unavailable = request.uri.contains("unavailable");
        let notifier = self.notifier.clone();
        let delay = self.load_delay;
        let token = request.token;
        self.pending = Some(self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            if unavailable {
                notifier.failed(token, "source unavailable");
            } else {
                notifier.ready(token, Some(duration_ms));
            }
        }));
        Ok(())
    }

    fn play(&mut self) -> Result<(), EngineError> {
        if self.loaded.is_none() {
            return Err(EngineError::Transport("nothing loaded".to_string()));
        }
        if self.playing_since.is_none() {
            self.playing_since = Some(Instant::now());
        }
        self.schedule_end();
        Ok(())
    }

    fn pause(&mut self) -> Result<(), EngineError> {
        self.settle();
        self.playing_since = None;
        self.cancel_pending();
        Ok(())
    }

    fn stop(&mut self) {
        self.cancel_pending();
        self.loaded = None;
        self.playing_since = None;
        self.offset_ms = 0;
    }

    fn seek_to(&mut self, position_ms: u64) -> Result<(), EngineError> {
        let Some(loaded) = self.loaded else {
            return Err(EngineError::Transport("nothing loaded".to_string()));
        };
        self.offset_ms = position_ms.min(loaded.duration_ms);
        if self.playing_since.is_some() {
            self.playing_since = Some(Instant::now());
            self.schedule_end();
        }
        Ok(())
    }

    fn set_speed(&mut self, speed: f32) -> Result<(), EngineError> {
        self.settle();
        self.speed = speed;
        self.schedule_end();
        Ok(())
    }

    fn set_volume(&mut self, left: f32, right: f32) -> Result<(), EngineError> {
        self.volume = (left, right);
        Ok(())
    }

    fn current_position(&self) -> u64 {
        self.position_now()
    }

    fn duration(&self) -> Option<u64> {
        self.loaded.map(|loaded| loaded.duration_ms)
    }
}

impl Drop for SimulatedEngine {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}
