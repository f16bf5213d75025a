//! Encore Core
//!
//! Platform-agnostic domain types, library grouping and the persistence
//! contract shared by the playback session and its hosts.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Track`, `PlaybackContext`, `Playlist` and their ids
//! - **Catalog**: `LibraryCatalog`, which groups an ordered track list into
//!   album, artist and folder contexts
//! - **Persistence Contract**: the `PlaybackStore` trait (favorites, play
//!   counts, playlists, renamed titles)
//! - **Error Handling**: unified `CoreError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use encore_core::{LibraryCatalog, Track, TrackId};
//!
//! let tracks = vec![
//!     Track::new(TrackId::new(1), "Intro", "/music/a/01.mp3").with_album("A"),
//!     Track::new(TrackId::new(2), "Outro", "/music/a/02.mp3").with_album("A"),
//! ];
//!
//! let catalog = LibraryCatalog::new(tracks);
//! let album = catalog.album("A").expect("album exists");
//! assert_eq!(album.len(), 2);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod catalog;
pub mod error;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use catalog::LibraryCatalog;
pub use error::{CoreError, Result};
pub use store::PlaybackStore;
pub use types::{ContextKind, PlaybackContext, Playlist, PlaylistId, Track, TrackId};
