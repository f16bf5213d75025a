//! End-to-end tests for the terminal application
//!
//! Drives `App` against the simulated engine and an in-memory store on a
//! paused tokio clock, so load delays and track ends happen deterministically.

use encore_cli::config::EngineSettings;
use encore_cli::repl::{Input, Listing, PlaylistAction, Source};
use encore_cli::{App, CliError, EventPrinter, Reply, SimulatedEngine};
use encore_core::{LibraryCatalog, PlaybackStore, PlaylistId, Track, TrackId};
use encore_playback::{channel, PlaybackConfig, PlaybackSession, SessionStatus};
use encore_store::MemoryStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;

// ===== Helpers =====

const TRACK_MS: u64 = 10_000;

fn track(id: i64, album: &str) -> Track {
    Track::new(TrackId::new(id), format!("Track {}", id), format!("/music/{}/{:02}.flac", album, id))
        .with_artist("Band")
        .with_album(album)
        .with_duration(Duration::from_millis(TRACK_MS))
}

fn catalog() -> LibraryCatalog {
    LibraryCatalog::new(vec![
        track(1, "First"),
        track(2, "First"),
        track(3, "Second"),
        Track::new(TrackId::new(4), "Stream", "https://radio.example/unavailable.mp3"),
    ])
}

fn config() -> PlaybackConfig {
    PlaybackConfig {
        check_files: false,
        shuffle_seed: Some(7),
        ..PlaybackConfig::default()
    }
}

fn start(store: Arc<dyn PlaybackStore>) -> App {
    start_with(config(), store)
}

fn start_with(config: PlaybackConfig, store: Arc<dyn PlaybackStore>) -> App {
    let (handle, inbox) = channel(&config);
    let engine = SimulatedEngine::new(handle.notifier(), &EngineSettings::default());
    inbox.spawn(PlaybackSession::new(&config, Box::new(engine), Arc::clone(&store)));
    App::new(catalog(), store, handle).unwrap()
}

async fn run(app: &mut App, line: &str) -> Reply {
    let input = Input::parse(line).unwrap().unwrap();
    app.execute(input).await.unwrap()
}

async fn advance(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

// ===== Tests =====

#[tokio::test(start_paused = true)]
async fn album_plays_through_and_ends() {
    let mut app = start(Arc::new(MemoryStore::new()));

    assert_eq!(run(&mut app, "play album First").await, Reply::Quiet);
    let state = app.handle().snapshot().await.unwrap();
    assert_eq!(state.status, SessionStatus::Loading);

    // Load delay, then three seconds of playback
    advance(150 + 3_000).await;
    let state = app.handle().snapshot().await.unwrap();
    assert_eq!(state.status, SessionStatus::Playing);
    assert_eq!(state.context_name.as_deref(), Some("First"));
    assert_eq!(state.duration_ms, Some(TRACK_MS));
    assert!((2_900..=3_000).contains(&state.position_ms));
    assert_eq!(state.play_count, 1);

    // First track ends, second loads and plays
    advance(7_000 + 200).await;
    let state = app.handle().snapshot().await.unwrap();
    assert_eq!(state.context_index, Some(1));
    assert_eq!(state.status, SessionStatus::Playing);

    // Last track ends without repeat
    advance(TRACK_MS + 100).await;
    let state = app.handle().snapshot().await.unwrap();
    assert_eq!(state.status, SessionStatus::Ended);
    assert!(!state.is_playing);
}

#[tokio::test(start_paused = true)]
async fn speed_shortens_the_remaining_time() {
    let mut app = start(Arc::new(MemoryStore::new()));
    run(&mut app, "play album First").await;
    advance(200).await;

    run(&mut app, "speed 2").await;
    // 10 s of track at double speed
    advance(5_100).await;
    let state = app.handle().snapshot().await.unwrap();
    assert_eq!(state.context_index, Some(1));
    assert_eq!(state.speed, 2.0);
}

#[tokio::test(start_paused = true)]
async fn paused_tracks_do_not_end() {
    let mut app = start(Arc::new(MemoryStore::new()));
    run(&mut app, "play library").await;
    advance(200).await;

    run(&mut app, "toggle").await;
    advance(TRACK_MS * 3).await;
    let state = app.handle().snapshot().await.unwrap();
    assert_eq!(state.status, SessionStatus::Paused);
    assert_eq!(state.context_index, Some(0));

    run(&mut app, "seek 9").await;
    run(&mut app, "toggle").await;
    advance(1_200).await;
    let state = app.handle().snapshot().await.unwrap();
    assert_eq!(state.context_index, Some(1));
}

#[tokio::test(start_paused = true)]
async fn unavailable_source_moves_to_error() {
    let mut app = start(Arc::new(MemoryStore::new()));
    run(&mut app, "play library @4").await;
    advance(200).await;

    let state = app.handle().snapshot().await.unwrap();
    assert_eq!(state.status, SessionStatus::Error);
    assert!(state
        .error
        .as_deref()
        .is_some_and(|e| e.contains("source unavailable")));

    match run(&mut app, "status").await {
        Reply::Message(line) => assert!(line.starts_with("[in error]")),
        other => panic!("expected a status line, got {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn renames_persist_and_reach_the_session() {
    let store: Arc<dyn PlaybackStore> = Arc::new(MemoryStore::new());
    let mut app = start(Arc::clone(&store));
    run(&mut app, "play album First").await;
    advance(200).await;

    run(&mut app, "rename 1 Opening Number").await;
    let state = app.handle().snapshot().await.unwrap();
    assert_eq!(state.title.as_deref(), Some("Opening Number"));
    assert_eq!(
        store.renamed_title(TrackId::new(1)).unwrap().as_deref(),
        Some("Opening Number")
    );

    // A fresh app picks the stored title up
    let restarted = start(store);
    assert_eq!(
        restarted.catalog().track(TrackId::new(1)).map(|t| t.title.as_str()),
        Some("Opening Number")
    );
}

#[tokio::test(start_paused = true)]
async fn favorite_toggles_the_current_track() {
    let store: Arc<dyn PlaybackStore> = Arc::new(MemoryStore::new());
    let mut app = start(Arc::clone(&store));

    let err = app.execute(Input::Favorite(None)).await.unwrap_err();
    assert!(matches!(err, CliError::NotFound(_)));

    run(&mut app, "play album Second").await;
    advance(200).await;
    run(&mut app, "fav").await;
    assert!(store.is_favorite(TrackId::new(3)).unwrap());
    run(&mut app, "fav 3").await;
    assert!(!store.is_favorite(TrackId::new(3)).unwrap());
}

#[tokio::test(start_paused = true)]
async fn playlists_are_built_and_played() {
    let store: Arc<dyn PlaybackStore> = Arc::new(MemoryStore::new());
    let mut app = start(Arc::clone(&store));

    assert_eq!(
        run(&mut app, "playlist new Mix").await,
        Reply::Message("created playlist 1 'Mix'".to_string())
    );
    run(&mut app, "playlist add 1 3").await;
    run(&mut app, "playlist add 1 1").await;

    let playlist = store.playlist(PlaylistId::new(1)).unwrap().unwrap();
    assert_eq!(playlist.track_count(), 2);

    app.execute(Input::Play {
        source: Source::Playlist(PlaylistId::new(1)),
        index: 1,
    })
    .await
    .unwrap();
    advance(200).await;
    let state = app.handle().snapshot().await.unwrap();
    assert_eq!(state.track_id, Some(TrackId::new(1)));
    assert_eq!(state.context_name.as_deref(), Some("Mix"));

    run(&mut app, "playlist delete 1").await;
    let err = app
        .execute(Input::Playlist(PlaylistAction::Delete(PlaylistId::new(1))))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Playlist not found"));
}

#[tokio::test(start_paused = true)]
async fn queue_extends_the_running_context() {
    let mut app = start(Arc::new(MemoryStore::new()));
    run(&mut app, "play album Second").await;
    advance(200).await;

    run(&mut app, "queue 2").await;
    let state = app.handle().snapshot().await.unwrap();
    assert_eq!(state.context_len, 2);

    run(&mut app, "next").await;
    advance(200).await;
    let state = app.handle().snapshot().await.unwrap();
    assert_eq!(state.track_id, Some(TrackId::new(2)));
}

#[tokio::test(start_paused = true)]
async fn unknown_targets_are_reported() {
    let mut app = start(Arc::new(MemoryStore::new()));

    let err = app
        .execute(Input::Play {
            source: Source::Album("Missing".to_string()),
            index: 0,
        })
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Not found: album 'Missing'");

    let err = app.execute(Input::Queue(TrackId::new(99))).await.unwrap_err();
    assert!(matches!(err, CliError::Core(_)));
}

#[tokio::test(start_paused = true)]
async fn listings_render_the_catalog() {
    let mut app = start(Arc::new(MemoryStore::new()));

    match app.execute(Input::List(Listing::Albums)).await.unwrap() {
        Reply::Message(text) => {
            assert!(text.contains("First (2 tracks)"));
            assert!(text.contains("Second (1 tracks)"));
        }
        other => panic!("expected a listing, got {:?}", other),
    }

    assert_eq!(
        app.execute(Input::List(Listing::Playlists)).await.unwrap(),
        Reply::Message("(nothing)".to_string())
    );
    assert_eq!(run(&mut app, "quit").await, Reply::Quit);
}

#[tokio::test(start_paused = true)]
async fn lagging_printer_catches_up_from_a_snapshot() {
    let config = PlaybackConfig {
        event_capacity: 4,
        ..config()
    };
    let mut app = start_with(config, Arc::new(MemoryStore::new()));
    let mut events = app.handle().subscribe();

    // Two tracks of position updates overflow the bus, Ended included
    run(&mut app, "play album First").await;
    advance(2 * TRACK_MS + 1_000).await;

    let skipped = loop {
        match events.recv().await {
            Err(RecvError::Lagged(skipped)) => break skipped,
            Ok(_) => continue,
            Err(RecvError::Closed) => panic!("bus closed"),
        }
    };
    assert!(skipped > 0);

    let state = app.handle().snapshot().await.unwrap();
    assert_eq!(state.status, SessionStatus::Ended);
    let mut printer = EventPrinter::new();
    let line = printer.resync(&state).unwrap();
    assert!(line.starts_with("[ended]"));
}
