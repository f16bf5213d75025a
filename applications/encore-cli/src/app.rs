//! Terminal application
//!
//! Resolves parsed input against the catalog and the store, forwards session
//! commands through the [`SessionHandle`] and renders replies as text.

use encore_core::{CoreError, LibraryCatalog, PlaybackContext, PlaybackStore, Playlist, PlaylistId, TrackId};
use encore_playback::{SessionEvent, SessionHandle, SessionStatus, StatePayload};
use std::fmt::Write as _;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{CliError, Result};
use crate::repl::{Input, Listing, PlaylistAction, Source, HELP};

/// Result of one input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Text to show the user
    Message(String),
    /// Nothing to show; events report the outcome
    Quiet,
    Quit,
}

pub struct App {
    catalog: LibraryCatalog,
    store: Arc<dyn PlaybackStore>,
    handle: SessionHandle,
}

impl App {
    /// Create the application, applying stored renames to the catalog
    pub fn new(
        mut catalog: LibraryCatalog,
        store: Arc<dyn PlaybackStore>,
        handle: SessionHandle,
    ) -> Result<Self> {
        let mut renamed = Vec::new();
        for track in catalog.tracks() {
            if let Some(title) = store.renamed_title(track.id)? {
                renamed.push((track.id, title));
            }
        }
        for (id, title) in &renamed {
            catalog.rename(*id, title);
        }
        if !renamed.is_empty() {
            debug!(count = renamed.len(), "Applied stored track renames");
        }

        Ok(Self {
            catalog,
            store,
            handle,
        })
    }

    pub fn catalog(&self) -> &LibraryCatalog {
        &self.catalog
    }

    pub fn handle(&self) -> &SessionHandle {
        &self.handle
    }

    /// Execute one parsed input line
    pub async fn execute(&mut self, input: Input) -> Result<Reply> {
        match input {
            Input::Play { source, index } => {
                let context = self.resolve(&source)?;
                info!(context = %context.kind, index, "Starting playback");
                self.handle.play_at(context, index).await?;
            }
            Input::Toggle => self.handle.toggle_play_pause().await?,
            Input::Next => self.handle.next().await?,
            Input::Previous => self.handle.previous().await?,
            Input::Shuffle(enabled) => self.handle.set_shuffle_enabled(enabled).await?,
            Input::Repeat(mode) => {
                let mode = match mode {
                    Some(mode) => mode,
                    None => self.handle.snapshot().await?.repeat_mode.cycle(),
                };
                self.handle.set_repeat_mode(mode).await?;
                return Ok(Reply::Message(format!("repeat {}", mode)));
            }
            Input::Mute(muted) => self.handle.set_muted(muted).await?,
            Input::Speed(speed) => self.handle.set_speed(speed).await?,
            Input::Volume { left, right } => self.handle.set_volume(left, right).await?,
            Input::Seek { position_ms } => self.handle.seek_to(position_ms).await?,
            Input::Stop => self.handle.stop().await?,
            Input::Queue(id) => {
                let track = self.track(id)?;
                self.handle.add_to_queue(track).await?;
            }
            Input::PlayNext(id) => {
                let track = self.track(id)?;
                self.handle.play_next(track).await?;
            }
            Input::Favorite(id) => return self.toggle_favorite(id).await,
            Input::Rename { id, title } => {
                self.track(id)?;
                self.store.set_renamed_title(id, &title)?;
                self.catalog.rename(id, &title);
                self.handle.rename_track(id, title.clone()).await?;
                return Ok(Reply::Message(format!("renamed {} to '{}'", id, title)));
            }
            Input::Status => {
                let state = self.handle.snapshot().await?;
                return Ok(Reply::Message(render_status(&state)));
            }
            Input::List(listing) => return Ok(Reply::Message(self.list(listing)?)),
            Input::Playlist(action) => return self.edit_playlist(action),
            Input::Help => return Ok(Reply::Message(HELP.to_string())),
            Input::Quit => return Ok(Reply::Quit),
        }
        Ok(Reply::Quiet)
    }

    /// Build the context a `play` input refers to
    pub fn resolve(&self, source: &Source) -> Result<PlaybackContext> {
        let context = match source {
            Source::Library => Some(self.catalog.library()),
            Source::Album(name) => self.catalog.album(name),
            Source::Artist(name) => self.catalog.artist(name),
            Source::Folder(path) => self.catalog.folder(path),
            Source::Playlist(id) => self.store.playlist(*id)?.map(|p| p.to_context()),
        };

        context.ok_or_else(|| {
            let what = match source {
                Source::Library => "library".to_string(),
                Source::Album(name) => format!("album '{}'", name),
                Source::Artist(name) => format!("artist '{}'", name),
                Source::Folder(path) => format!("folder '{}'", path),
                Source::Playlist(id) => format!("playlist {}", id),
            };
            CliError::NotFound(what)
        })
    }

    fn track(&self, id: TrackId) -> Result<encore_core::Track> {
        self.catalog
            .track(id)
            .cloned()
            .ok_or(CliError::Core(CoreError::TrackNotFound(id)))
    }

    async fn toggle_favorite(&self, id: Option<TrackId>) -> Result<Reply> {
        let id = match id {
            Some(id) => id,
            None => self
                .handle
                .snapshot()
                .await?
                .track_id
                .ok_or_else(|| CliError::NotFound("current track".to_string()))?,
        };

        let favorite = !self.store.is_favorite(id)?;
        self.store.set_favorite(id, favorite)?;
        let verb = if favorite { "added to" } else { "removed from" };
        Ok(Reply::Message(format!("{} {} favorites", id, verb)))
    }

    fn edit_playlist(&self, action: PlaylistAction) -> Result<Reply> {
        let message = match action {
            PlaylistAction::Create(name) => {
                let next_id = self
                    .store
                    .playlists()?
                    .iter()
                    .map(|p| p.id.get())
                    .max()
                    .unwrap_or(0)
                    + 1;
                let playlist = Playlist::new(PlaylistId::new(next_id), name);
                let message = format!("created playlist {} '{}'", playlist.id, playlist.name);
                self.store.save_playlist(playlist)?;
                message
            }
            PlaylistAction::Add { playlist, track } => {
                let track = self.track(track)?;
                let id = track.id;
                self.store.add_track_to_playlist(playlist, track)?;
                format!("added {} to playlist {}", id, playlist)
            }
            PlaylistAction::Remove { playlist, track } => {
                self.store.remove_track_from_playlist(playlist, track)?;
                format!("removed {} from playlist {}", track, playlist)
            }
            PlaylistAction::Delete(id) => {
                if self.store.playlist(id)?.is_none() {
                    return Err(CoreError::PlaylistNotFound(id).into());
                }
                self.store.delete_playlists(&[id])?;
                format!("deleted playlist {}", id)
            }
        };
        Ok(Reply::Message(message))
    }

    fn list(&self, listing: Listing) -> Result<String> {
        let mut out = String::new();
        match listing {
            Listing::Tracks => {
                for track in self.catalog.tracks() {
                    let _ = writeln!(out, "{:>5}  {} - {}", track.id, track.artist, track.title);
                }
            }
            Listing::Albums => list_contexts(&mut out, &self.catalog.albums()),
            Listing::Artists => list_contexts(&mut out, &self.catalog.artists()),
            Listing::Folders => list_contexts(&mut out, &self.catalog.folders()),
            Listing::Playlists => {
                for playlist in self.store.playlists()? {
                    let _ = writeln!(
                        out,
                        "{:>5}  {} ({} tracks)",
                        playlist.id,
                        playlist.name,
                        playlist.track_count()
                    );
                }
            }
        }

        if out.is_empty() {
            out.push_str("(nothing)");
        }
        Ok(out.trim_end().to_string())
    }
}

fn list_contexts(out: &mut String, contexts: &[PlaybackContext]) {
    for context in contexts {
        let _ = writeln!(out, "{} ({} tracks)", context.name(), context.len());
    }
}

fn format_time(ms: u64) -> String {
    let seconds = ms / 1000;
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// One-line status summary
pub fn render_status(state: &StatePayload) -> String {
    let mut line = format!("[{}]", state.status);

    if let (Some(title), Some(artist)) = (&state.title, &state.artist) {
        let _ = write!(line, " {} - {}", artist, title);
    }
    if let Some(duration) = state.duration_ms {
        let _ = write!(
            line,
            " {}/{}",
            format_time(state.position_ms),
            format_time(duration)
        );
    }
    if let (Some(name), Some(index)) = (&state.context_name, state.context_index) {
        let _ = write!(line, " ({} {}/{})", name, index + 1, state.context_len);
    }

    let _ = write!(line, " repeat:{}", state.repeat_mode);
    if state.is_shuffle_enabled {
        line.push_str(" shuffle");
    }
    if state.is_muted {
        line.push_str(" muted");
    }
    if (state.speed - 1.0).abs() > f32::EPSILON {
        let _ = write!(line, " x{}", state.speed);
    }
    if state.is_favorite {
        line.push_str(" *");
    }
    if let Some(error) = &state.error {
        let _ = write!(line, " error: {}", error);
    }
    line
}

/// Turns the event stream into terminal notices
///
/// Only changes of track or status are shown; periodic positions and
/// repeated snapshots stay silent.
#[derive(Debug, Default)]
pub struct EventPrinter {
    last: Option<(Option<TrackId>, SessionStatus)>,
}

impl EventPrinter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(&mut self, event: &SessionEvent) -> Option<String> {
        match event {
            SessionEvent::StateChanged(state) => {
                let key = (state.track_id, state.status);
                if self.last == Some(key) || state.status == SessionStatus::Loading {
                    return None;
                }
                self.last = Some(key);
                match state.status {
                    SessionStatus::Playing | SessionStatus::Paused | SessionStatus::Idle => {
                        Some(render_status(state))
                    }
                    // Reported by their own events
                    SessionStatus::Ended | SessionStatus::Error | SessionStatus::Loading => None,
                }
            }
            SessionEvent::Ended => Some("-- end of context --".to_string()),
            SessionEvent::Error { reason } => Some(format!("!! {}", reason)),
            SessionEvent::TrackChanged { .. } | SessionEvent::Position { .. } => None,
        }
    }

    /// Catch up from a fresh snapshot after the bus skipped events
    ///
    /// Ended and error states are shown here too, since the events that
    /// would have reported them may be among the skipped ones.
    pub fn resync(&mut self, state: &StatePayload) -> Option<String> {
        let key = (state.track_id, state.status);
        if self.last == Some(key) {
            return None;
        }
        self.last = Some(key);
        Some(render_status(state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use encore_playback::RepeatMode;

    fn state(status: SessionStatus, track: Option<i64>) -> StatePayload {
        StatePayload {
            track_id: track.map(TrackId::new),
            title: track.map(|n| format!("Song {}", n)),
            artist: track.map(|_| "Band".to_string()),
            album_art: None,
            status,
            is_playing: status == SessionStatus::Playing,
            is_shuffle_enabled: false,
            repeat_mode: RepeatMode::All,
            is_muted: false,
            speed: 1.0,
            position_ms: 65_000,
            duration_ms: track.map(|_| 200_000),
            context_name: track.map(|_| "Library".to_string()),
            context_index: track.map(|_| 0),
            context_len: 3,
            is_favorite: false,
            play_count: 1,
            error: None,
        }
    }

    #[test]
    fn status_line_shows_track_time_and_modes() {
        let mut payload = state(SessionStatus::Playing, Some(1));
        payload.is_shuffle_enabled = true;
        payload.speed = 1.5;

        let line = render_status(&payload);
        assert_eq!(
            line,
            "[playing] Band - Song 1 1:05/3:20 (Library 1/3) repeat:all shuffle x1.5"
        );
    }

    #[test]
    fn resync_reports_states_the_bus_skipped() {
        let mut printer = EventPrinter::new();
        printer.render(&SessionEvent::StateChanged(state(SessionStatus::Playing, Some(1))));

        let mut failed = state(SessionStatus::Error, Some(2));
        failed.error = Some("file not found".to_string());
        let line = printer.resync(&failed).unwrap();
        assert!(line.starts_with("[in error] Band - Song 2"));
        assert!(line.ends_with("error: file not found"));

        assert!(printer.resync(&failed).is_none());
    }

    #[test]
    fn printer_reports_changes_only() {
        let mut printer = EventPrinter::new();
        let playing = SessionEvent::StateChanged(state(SessionStatus::Playing, Some(1)));

        assert!(printer.render(&playing).is_some());
        assert!(printer.render(&playing).is_none());
        assert!(printer
            .render(&SessionEvent::Position {
                position_ms: 1,
                duration_ms: None,
            })
            .is_none());
        assert!(printer
            .render(&SessionEvent::StateChanged(state(SessionStatus::Loading, Some(2))))
            .is_none());
        assert!(printer
            .render(&SessionEvent::StateChanged(state(SessionStatus::Playing, Some(2))))
            .is_some());
        assert_eq!(
            printer.render(&SessionEvent::Error {
                reason: "file not found".to_string(),
            }),
            Some("!! file not found".to_string())
        );
    }
}
