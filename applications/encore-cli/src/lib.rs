//! Encore CLI Library
//!
//! Terminal host for the playback session: configuration, a simulated
//! engine, the line parser and the application glue.
//!
//! This library exposes the components for testing purposes.

pub mod app;
pub mod config;
pub mod engine;
pub mod error;
pub mod repl;

// Re-export commonly used types for convenience
pub use app::{App, EventPrinter, Reply};
pub use config::EncoreConfig;
pub use engine::SimulatedEngine;
pub use error::{CliError, Result};
pub use repl::Input;
