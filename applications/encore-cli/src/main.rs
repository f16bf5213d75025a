/// Encore - terminal music player
use anyhow::Context as _;
use clap::{Parser, Subcommand};
use encore_cli::{
    app::{App, EventPrinter, Reply},
    config::EncoreConfig,
    engine::SimulatedEngine,
    repl::Input,
};
use encore_core::{LibraryCatalog, PlaybackStore};
use encore_playback::{channel, PlaybackSession, SessionEvent, SessionStatus};
use encore_store::{JsonFileStore, MemoryStore, RetryPolicy};
use std::{path::PathBuf, sync::Arc};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "encore")]
#[command(about = "Encore terminal music player", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "ENCORE_CONFIG")]
    config: Option<PathBuf>,

    /// Track catalog (JSON), overrides library.catalog
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Keep favorites, counts and playlists in memory only
    #[arg(long)]
    memory: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive session (default)
    Repl,
    /// Print part of the catalog
    List {
        /// tracks, albums, artists, folders or playlists
        #[arg(default_value = "tracks")]
        what: String,
    },
    /// Play a context until it ends
    Play {
        /// e.g. `album Abbey Road @3`
        #[arg(trailing_var_arg = true)]
        target: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "encore=info,encore_playback=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = EncoreConfig::load(cli.config.as_deref())?;
    if cli.catalog.is_some() {
        config.library.catalog = cli.catalog.clone();
    }
    if cli.memory {
        config.store.in_memory = true;
    }
    config.validate()?;

    let mut app = start(&config)?;

    match cli.command.unwrap_or(Commands::Repl) {
        Commands::Repl => repl(&mut app).await?,
        Commands::List { what } => {
            let line = format!("list {}", what);
            if let Some(input @ Input::List(_)) = Input::parse(&line)? {
                print_reply(app.execute(input).await?);
            }
        }
        Commands::Play { target } => play_through(&mut app, &target.join(" ")).await?,
    }

    app.handle().shutdown();
    Ok(())
}

/// Build the store, catalog and session, and spawn the session task
fn start(config: &EncoreConfig) -> anyhow::Result<App> {
    let store: Arc<dyn PlaybackStore> = if config.store.in_memory {
        tracing::info!("Using in-memory store");
        Arc::new(MemoryStore::new())
    } else {
        let retry = RetryPolicy {
            max_attempts: config.store.write_attempts,
            ..RetryPolicy::default()
        };
        let store = JsonFileStore::open_with_retry(config.store.path.clone(), retry)
            .with_context(|| format!("opening store at {}", config.store.path.display()))?;
        tracing::info!("Store: {}", store.path().display());
        Arc::new(store)
    };

    let catalog = match &config.library.catalog {
        Some(path) => LibraryCatalog::from_json_file(path)
            .with_context(|| format!("reading catalog {}", path.display()))?,
        None => {
            tracing::warn!("No catalog configured; the library is empty");
            LibraryCatalog::default()
        }
    };
    tracing::info!("Catalog: {} tracks", catalog.len());

    let (handle, inbox) = channel(&config.playback);
    let engine = SimulatedEngine::new(handle.notifier(), &config.engine);
    let session = PlaybackSession::new(&config.playback, Box::new(engine), Arc::clone(&store));
    inbox.spawn(session);

    Ok(App::new(catalog, store, handle)?)
}

async fn repl(app: &mut App) -> anyhow::Result<()> {
    let mut events = app.handle().subscribe();
    let handle = app.handle().clone();
    let printer = tokio::spawn(async move {
        let mut printer = EventPrinter::new();
        loop {
            match events.recv().await {
                Ok(event) => {
                    tracing::debug!(event = event.name(), "Session event");
                    if let Some(text) = printer.render(&event) {
                        println!("{}", text);
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "Event printer lagged, resyncing");
                    let Ok(state) = handle.snapshot().await else {
                        break;
                    };
                    if let Some(text) = printer.resync(&state) {
                        println!("{}", text);
                    }
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    println!("encore: {} tracks. Type 'help' for commands.", app.catalog().len());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let input = match Input::parse(&line) {
            Ok(Some(input)) => input,
            Ok(None) => continue,
            Err(err) => {
                println!("{}", err);
                continue;
            }
        };

        match app.execute(input).await {
            Ok(Reply::Quit) => break,
            Ok(reply) => print_reply(reply),
            Err(err) => println!("error: {}", err),
        }
    }

    printer.abort();
    Ok(())
}

/// Start one context and wait for it to end, fail, or be interrupted
async fn play_through(app: &mut App, target: &str) -> anyhow::Result<()> {
    let mut events = app.handle().subscribe();
    let input = Input::parse(&format!("play {}", target))?
        .context("nothing to play")?;
    app.execute(input).await?;

    let mut printer = EventPrinter::new();
    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => {
                    tracing::debug!(event = event.name(), "Session event");
                    if let Some(text) = printer.render(&event) {
                        println!("{}", text);
                    }
                    if matches!(event, SessionEvent::Ended | SessionEvent::Error { .. }) {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "Event stream lagged, resyncing");
                    let state = app.handle().snapshot().await?;
                    if let Some(text) = printer.resync(&state) {
                        println!("{}", text);
                    }
                    if matches!(state.status, SessionStatus::Ended | SessionStatus::Error) {
                        break;
                    }
                }
                Err(RecvError::Closed) => break,
            },
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted");
                break;
            }
        }
    }

    print_reply(app.execute(Input::Status).await?);
    Ok(())
}

fn print_reply(reply: Reply) {
    if let Reply::Message(text) = reply {
        println!("{}", text);
    }
}

