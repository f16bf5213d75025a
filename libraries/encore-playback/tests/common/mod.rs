//! Shared helpers for session and actor tests

#![allow(dead_code)]

use encore_core::{PlaybackContext, Track, TrackId};
use encore_playback::{
    EngineError, EngineEvent, EngineNotifier, LoadRequest, PlaybackConfig, PlaybackEngine,
    PlaybackSession, SessionEvent,
};
use encore_store::MemoryStore;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ===== Fake engine =====

/// Engine call, as recorded by [`FakeEngine`]
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Load(LoadRequest),
    Play,
    Pause,
    Stop,
    Seek(u64),
    Speed(f32),
    Volume(f32, f32),
}

/// Shared view of what an engine was asked to do
#[derive(Debug, Clone, Default)]
pub struct EngineLog {
    calls: Arc<Mutex<Vec<Call>>>,
    position_ms: Arc<AtomicU64>,
}

impl EngineLog {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn loads(&self) -> Vec<LoadRequest> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Load(request) => Some(request),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, call: &Call) -> usize {
        self.calls().iter().filter(|c| *c == call).count()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn set_position(&self, position_ms: u64) {
        self.position_ms.store(position_ms, Ordering::SeqCst);
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

/// Engine that records calls and optionally reports ready immediately
pub struct FakeEngine {
    log: EngineLog,
    notifier: Option<EngineNotifier>,
}

impl FakeEngine {
    /// Engine whose loads are answered by the test
    pub fn manual() -> (Self, EngineLog) {
        let log = EngineLog::default();
        (
            Self {
                log: log.clone(),
                notifier: None,
            },
            log,
        )
    }

    /// Engine that reports every load ready through `notifier`
    pub fn auto_ready(notifier: EngineNotifier) -> (Self, EngineLog) {
        let log = EngineLog::default();
        (
            Self {
                log: log.clone(),
                notifier: Some(notifier),
            },
            log,
        )
    }
}

impl PlaybackEngine for FakeEngine {
    fn load(&mut self, request: LoadRequest) -> Result<(), EngineError> {
        let token = request.token;
        let duration = (request.duration_hint_ms > 0).then_some(request.duration_hint_ms);
        self.log.record(Call::Load(request));
        if let Some(notifier) = &self.notifier {
            notifier.ready(token, duration);
        }
        Ok(())
    }

    fn play(&mut self) -> Result<(), EngineError> {
        self.log.record(Call::Play);
        Ok(())
    }

    fn pause(&mut self) -> Result<(), EngineError> {
        self.log.record(Call::Pause);
        Ok(())
    }

    fn stop(&mut self) {
        self.log.record(Call::Stop);
    }

    fn seek_to(&mut self, position_ms: u64) -> Result<(), EngineError> {
        self.log.record(Call::Seek(position_ms));
        self.log.set_position(position_ms);
        Ok(())
    }

    fn set_speed(&mut self, speed: f32) -> Result<(), EngineError> {
        self.log.record(Call::Speed(speed));
        Ok(())
    }

    fn set_volume(&mut self, left: f32, right: f32) -> Result<(), EngineError> {
        self.log.record(Call::Volume(left, right));
        Ok(())
    }

    fn current_position(&self) -> u64 {
        self.log.position_ms.load(Ordering::SeqCst)
    }

    fn duration(&self) -> Option<u64> {
        None
    }
}

// ===== Fixtures =====

pub fn track(id: i64) -> Track {
    Track::new(TrackId::new(id), format!("Track {}", id), format!("/music/{}.mp3", id))
        .with_artist("Artist")
        .with_album("Album")
        .with_duration(Duration::from_secs(200))
}

/// Context of `len` tracks with ids `0..len`
pub fn context(len: i64) -> PlaybackContext {
    PlaybackContext::library((0..len).map(track).collect())
}

/// Context of `len` tracks with ids offset by `base`
pub fn context_from(base: i64, len: i64) -> PlaybackContext {
    PlaybackContext::library((base..base + len).map(track).collect())
}

pub fn config() -> PlaybackConfig {
    PlaybackConfig {
        check_files: false,
        shuffle_seed: Some(2024),
        ..PlaybackConfig::default()
    }
}

pub fn session() -> (PlaybackSession, EngineLog) {
    let (engine, log) = FakeEngine::manual();
    let session = PlaybackSession::new(&config(), Box::new(engine), Arc::new(MemoryStore::new()));
    (session, log)
}

/// Answer the latest load as ready
pub fn ready(session: &mut PlaybackSession) {
    let token = session.token();
    session.handle_engine_event(EngineEvent::ready(token, None));
}

pub fn states(events: &[SessionEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, SessionEvent::StateChanged(_)))
        .count()
}
