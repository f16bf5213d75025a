mod context;
mod ids;
mod playlist;
mod track;

pub use context::{ContextKind, PlaybackContext};
pub use ids::{PlaylistId, TrackId};
pub use playlist::Playlist;
pub use track::{Track, UNKNOWN};
