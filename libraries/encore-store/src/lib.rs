//! Encore Store
//!
//! Implementations of [`encore_core::PlaybackStore`]:
//! - [`MemoryStore`]: process-lifetime state, used by tests and ephemeral hosts
//! - [`JsonFileStore`]: the whole state as one JSON document, rewritten on
//!   every change through a temp file and guarded by a [`RetryPolicy`]
//!
//! # Example
//!
//! ```rust
//! use encore_core::{PlaybackStore, TrackId};
//! use encore_store::MemoryStore;
//!
//! let store = MemoryStore::new();
//! store.set_favorite(TrackId::new(1), true).unwrap();
//! assert_eq!(store.increment_play_count(TrackId::new(1)).unwrap(), 1);
//! assert!(store.is_favorite(TrackId::new(1)).unwrap());
//! ```

mod json;
mod memory;
pub mod retry;
mod state;

pub use json::JsonFileStore;
pub use memory::MemoryStore;
pub use retry::RetryPolicy;
