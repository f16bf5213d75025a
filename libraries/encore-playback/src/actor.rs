//! Session actor
//!
//! Hosts one [`PlaybackSession`] on a tokio task. Commands from any number of
//! [`SessionHandle`]s and callbacks from the engine share a single mailbox, so
//! the session only ever sees one message at a time. After each message the
//! queued session events are published on the [`EventBus`].
//!
//! The position poller ticks only while the session is playing and restarts
//! its period whenever playback (re)starts.

use std::time::Duration;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use encore_core::{PlaybackContext, Track, TrackId};

use crate::command::SessionCommand;
use crate::engine::{EngineEvent, EngineNotifier};
use crate::error::{PlaybackError, Result};
use crate::events::{EventBus, SessionEvent, StatePayload};
use crate::session::PlaybackSession;
use crate::types::{PlaybackConfig, RepeatMode};

/// Mailbox message
pub(crate) enum Envelope {
    Command {
        command: SessionCommand,
        reply: Option<oneshot::Sender<Result<()>>>,
    },
    Engine(EngineEvent),
    Snapshot(oneshot::Sender<StatePayload>),
    Shutdown,
}

impl std::fmt::Debug for Envelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Envelope::Command { command, .. } => write!(f, "Command({})", command.name()),
            Envelope::Engine(event) => write!(f, "Engine({:?})", event),
            Envelope::Snapshot(_) => write!(f, "Snapshot"),
            Envelope::Shutdown => write!(f, "Shutdown"),
        }
    }
}

/// Receiving half of a session mailbox, waiting for its session
///
/// Created before the engine so the engine can be given a notifier.
pub struct SessionInbox {
    rx: mpsc::UnboundedReceiver<Envelope>,
    bus: EventBus,
    poll_interval: Duration,
}

/// Create a mailbox and its handle
pub fn channel(config: &PlaybackConfig) -> (SessionHandle, SessionInbox) {
    let (tx, rx) = mpsc::unbounded_channel();
    let bus = EventBus::new(config.event_capacity);

    let handle = SessionHandle {
        tx,
        bus: bus.clone(),
    };
    let inbox = SessionInbox {
        rx,
        bus,
        poll_interval: config.poll_interval(),
    };
    (handle, inbox)
}

impl SessionInbox {
    /// Start serving the mailbox with `session`
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(self, session: PlaybackSession) -> JoinHandle<()> {
        let actor = SessionActor {
            session,
            rx: self.rx,
            bus: self.bus,
            poll_interval: self.poll_interval,
        };
        tokio::spawn(actor.run())
    }
}

struct SessionActor {
    session: PlaybackSession,
    rx: mpsc::UnboundedReceiver<Envelope>,
    bus: EventBus,
    poll_interval: Duration,
}

impl SessionActor {
    async fn run(mut self) {
        info!(poll_ms = self.poll_interval.as_millis() as u64, "Playback session started");

        let mut ticker = interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut was_playing = false;

        loop {
            let playing = self.session.is_playing();
            if playing && !was_playing {
                ticker.reset();
            }
            was_playing = playing;

            tokio::select! {
                envelope = self.rx.recv() => match envelope {
                    Some(Envelope::Command { command, reply }) => {
                        self.handle_command(command, reply);
                    }
                    Some(Envelope::Engine(event)) => {
                        self.session.handle_engine_event(event);
                    }
                    Some(Envelope::Snapshot(reply)) => {
                        let _ = reply.send(self.session.payload());
                    }
                    Some(Envelope::Shutdown) | None => {
                        self.session.shutdown();
                        self.flush();
                        break;
                    }
                },
                _ = ticker.tick(), if playing => {
                    self.session.poll_position();
                }
            }

            self.flush();
        }

        info!("Playback session stopped");
    }

    fn handle_command(&mut self, command: SessionCommand, reply: Option<oneshot::Sender<Result<()>>>) {
        let name = command.name();
        debug!(command = name, "Applying command");

        let result = self.session.apply(command);
        if let Err(err) = &result {
            warn!(command = name, error = %err, "Command rejected");
        }
        if let Some(reply) = reply {
            let _ = reply.send(result);
        }
    }

    fn flush(&mut self) {
        for event in self.session.drain_events() {
            self.bus.publish(event);
        }
    }
}

/// Command intake for a running session
///
/// Cheap to clone. Once every handle is dropped the session shuts down.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    tx: mpsc::UnboundedSender<Envelope>,
    bus: EventBus,
}

impl SessionHandle {
    /// Send a command and wait for its outcome
    pub async fn send(&self, command: SessionCommand) -> Result<()> {
        let (reply, outcome) = oneshot::channel();
        self.tx
            .send(Envelope::Command {
                command,
                reply: Some(reply),
            })
            .map_err(|_| PlaybackError::SessionClosed)?;
        outcome.await.map_err(|_| PlaybackError::SessionClosed)?
    }

    /// Send a command without waiting; rejections are only logged
    pub fn dispatch(&self, command: SessionCommand) -> Result<()> {
        self.tx
            .send(Envelope::Command {
                command,
                reply: None,
            })
            .map_err(|_| PlaybackError::SessionClosed)
    }

    /// Current state snapshot
    pub async fn snapshot(&self) -> Result<StatePayload> {
        let (reply, payload) = oneshot::channel();
        self.tx
            .send(Envelope::Snapshot(reply))
            .map_err(|_| PlaybackError::SessionClosed)?;
        payload.await.map_err(|_| PlaybackError::SessionClosed)
    }

    /// Subscribe to session events
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.bus.subscribe()
    }

    /// Notifier for the engine driving this session
    pub fn notifier(&self) -> EngineNotifier {
        EngineNotifier::new(self.tx.downgrade())
    }

    /// Whether the session task is still running
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Stop the engine and end the session task
    pub fn shutdown(&self) {
        if self.tx.send(Envelope::Shutdown).is_err() {
            debug!("Session already closed");
        }
    }

    // ===== Convenience wrappers =====

    /// Play `context[index]`
    pub async fn play_at(&self, context: PlaybackContext, index: usize) -> Result<()> {
        self.send(SessionCommand::PlayAt { context, index }).await
    }

    /// Pause or resume
    pub async fn toggle_play_pause(&self) -> Result<()> {
        self.send(SessionCommand::TogglePlayPause).await
    }

    /// Next track
    pub async fn next(&self) -> Result<()> {
        self.send(SessionCommand::Next).await
    }

    /// Previous track
    pub async fn previous(&self) -> Result<()> {
        self.send(SessionCommand::Previous).await
    }

    /// Turn shuffle on or off
    pub async fn set_shuffle_enabled(&self, enabled: bool) -> Result<()> {
        self.send(SessionCommand::SetShuffle { enabled }).await
    }

    /// Set repeat mode
    pub async fn set_repeat_mode(&self, mode: RepeatMode) -> Result<()> {
        self.send(SessionCommand::SetRepeat { mode }).await
    }

    /// Mute or unmute
    pub async fn set_muted(&self, muted: bool) -> Result<()> {
        self.send(SessionCommand::SetMuted { muted }).await
    }

    /// Set playback speed
    pub async fn set_speed(&self, speed: f32) -> Result<()> {
        self.send(SessionCommand::SetSpeed { speed }).await
    }

    /// Set per-channel volume
    pub async fn set_volume(&self, left: f32, right: f32) -> Result<()> {
        self.send(SessionCommand::SetVolume { left, right }).await
    }

    /// Seek within the loaded track
    pub async fn seek_to(&self, position_ms: u64) -> Result<()> {
        self.send(SessionCommand::SeekTo { position_ms }).await
    }

    /// Stop and drop the context
    pub async fn stop(&self) -> Result<()> {
        self.send(SessionCommand::Stop).await
    }

    /// Insert a track after the current one
    pub async fn play_next(&self, track: Track) -> Result<()> {
        self.send(SessionCommand::PlayNext { track }).await
    }

    /// Append a track to the context
    pub async fn add_to_queue(&self, track: Track) -> Result<()> {
        self.send(SessionCommand::AddToQueue { track }).await
    }

    /// Rename a track in the active context
    pub async fn rename_track(&self, id: TrackId, title: impl Into<String>) -> Result<()> {
        self.send(SessionCommand::RenameTrack {
            id,
            title: title.into(),
        })
        .await
    }
}
