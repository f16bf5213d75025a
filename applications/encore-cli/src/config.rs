/// CLI configuration
use crate::error::{CliError, Result};
use encore_playback::{types::is_valid_speed, PlaybackConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file, read from the working directory when present
pub const DEFAULT_CONFIG_FILE: &str = "encore.toml";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct EncoreConfig {
    #[serde(default)]
    pub playback: PlaybackConfig,

    #[serde(default)]
    pub library: LibrarySettings,

    #[serde(default = "default_store")]
    pub store: StoreSettings,

    #[serde(default = "default_engine")]
    pub engine: EngineSettings,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LibrarySettings {
    /// JSON catalog (`{"tracks": [...]}`)
    pub catalog: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreSettings {
    /// Keep favorites, counts and playlists in memory only
    #[serde(default)]
    pub in_memory: bool,

    #[serde(default = "default_store_path")]
    pub path: PathBuf,

    #[serde(default = "default_write_attempts")]
    pub write_attempts: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EngineSettings {
    /// Simulated time to open a track
    #[serde(default = "default_load_delay_ms")]
    pub load_delay_ms: u64,

    /// Length used for tracks without a known duration
    #[serde(default = "default_fallback_duration_ms")]
    pub fallback_duration_ms: u64,
}

impl EncoreConfig {
    /// Load configuration from file and environment
    ///
    /// An explicit `path` must exist; otherwise `encore.toml` is read if
    /// present. `ENCORE_`-prefixed variables override both, with `__`
    /// between nested keys (`ENCORE_PLAYBACK__POLL_INTERVAL_MS=250`).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path).required(true));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        settings = settings.add_source(
            config::Environment::with_prefix("ENCORE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let playback = &self.playback;

        if playback.poll_interval_ms == 0 {
            return Err(CliError::Config(
                "playback.poll_interval_ms must be greater than 0".to_string(),
            ));
        }

        if !is_valid_speed(playback.speed) {
            return Err(CliError::Config(format!(
                "playback.speed must be a positive number, got {}",
                playback.speed
            )));
        }

        if playback.event_capacity == 0 {
            return Err(CliError::Config(
                "playback.event_capacity must be greater than 0".to_string(),
            ));
        }

        if let Some(catalog) = &self.library.catalog {
            if !catalog.exists() {
                return Err(CliError::Config(format!(
                    "Catalog not found at {:?}",
                    catalog
                )));
            }
        }

        Ok(())
    }
}

// Default values
fn default_store() -> StoreSettings {
    StoreSettings {
        in_memory: false,
        path: default_store_path(),
        write_attempts: default_write_attempts(),
    }
}

fn default_store_path() -> PathBuf {
    PathBuf::from("./data/encore-state.json")
}

fn default_write_attempts() -> u32 {
    3
}

fn default_engine() -> EngineSettings {
    EngineSettings {
        load_delay_ms: default_load_delay_ms(),
        fallback_duration_ms: default_fallback_duration_ms(),
    }
}

fn default_load_delay_ms() -> u64 {
    150
}

fn default_fallback_duration_ms() -> u64 {
    180_000
}

impl Default for StoreSettings {
    fn default() -> Self {
        default_store()
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        default_engine()
    }
}
