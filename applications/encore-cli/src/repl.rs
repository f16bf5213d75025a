//! Line-oriented command parser
//!
//! Every line read from the terminal becomes one [`Input`]. Names may contain
//! spaces; `play` takes an optional trailing `@N` (1-based) start position.

use crate::error::{CliError, Result};
use encore_core::{PlaylistId, TrackId};
use encore_playback::RepeatMode;

/// What to play
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Library,
    Album(String),
    Artist(String),
    Folder(String),
    Playlist(PlaylistId),
}

/// Catalog listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Listing {
    Tracks,
    Albums,
    Artists,
    Folders,
    Playlists,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaylistAction {
    Create(String),
    Add { playlist: PlaylistId, track: TrackId },
    Remove { playlist: PlaylistId, track: TrackId },
    Delete(PlaylistId),
}

/// One parsed terminal line
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Play { source: Source, index: usize },
    Toggle,
    Next,
    Previous,
    Shuffle(bool),
    /// `None` cycles to the next mode
    Repeat(Option<RepeatMode>),
    Mute(bool),
    Speed(f32),
    Volume { left: f32, right: f32 },
    Seek { position_ms: u64 },
    Stop,
    Queue(TrackId),
    PlayNext(TrackId),
    /// `None` toggles the current track
    Favorite(Option<TrackId>),
    Rename { id: TrackId, title: String },
    Status,
    List(Listing),
    Playlist(PlaylistAction),
    Help,
    Quit,
}

pub const HELP: &str = "\
play library|album <name>|artist <name>|folder <path>|playlist <id> [@N]
toggle | next | prev | stop | status
shuffle on|off        repeat none|all|one|cycle
mute on|off           speed <rate>        volume <left> [right]
seek <seconds>        queue <track>       playnext <track>
fav [track]           rename <track> <title>
list tracks|albums|artists|folders|playlists
playlist new <name> | add <playlist> <track> | remove <playlist> <track> | delete <playlist>
help | quit";

impl Input {
    /// Parse one line; blank lines yield `None`
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((&verb, args)) = words.split_first() else {
            return Ok(None);
        };

        let input = match verb.to_ascii_lowercase().as_str() {
            "play" | "p" => parse_play(args)?,
            "toggle" | "pause" | "resume" => Input::Toggle,
            "next" | "n" => Input::Next,
            "prev" | "previous" => Input::Previous,
            "shuffle" => Input::Shuffle(switch(args)?),
            "repeat" => Input::Repeat(parse_repeat(args)?),
            "mute" => Input::Mute(switch(args)?),
            "speed" => Input::Speed(number(one(args, "speed <rate>")?)?),
            "volume" | "vol" => parse_volume(args)?,
            "seek" => {
                let seconds: f64 = number(one(args, "seek <seconds>")?)?;
                if !seconds.is_finite() || seconds < 0.0 {
                    return Err(CliError::parse("seek position must be zero or more"));
                }
                Input::Seek {
                    position_ms: (seconds * 1000.0) as u64,
                }
            }
            "stop" => Input::Stop,
            "queue" => Input::Queue(track_id(one(args, "queue <track>")?)?),
            "playnext" => Input::PlayNext(track_id(one(args, "playnext <track>")?)?),
            "fav" | "favorite" => match args {
                [] => Input::Favorite(None),
                [id] => Input::Favorite(Some(track_id(id)?)),
                _ => return Err(CliError::parse("usage: fav [track]")),
            },
            "rename" => match args {
                [id, title @ ..] if !title.is_empty() => Input::Rename {
                    id: track_id(id)?,
                    title: title.join(" "),
                },
                _ => return Err(CliError::parse("usage: rename <track> <title>")),
            },
            "status" | "s" => Input::Status,
            "list" | "ls" => Input::List(parse_listing(args)?),
            "playlist" | "pl" => Input::Playlist(parse_playlist(args)?),
            "help" | "?" => Input::Help,
            "quit" | "exit" | "q" => Input::Quit,
            other => return Err(CliError::parse(format!("unknown command '{}'", other))),
        };

        Ok(Some(input))
    }
}

fn parse_play(args: &[&str]) -> Result<Input> {
    let (args, index) = match args.split_last() {
        Some((last, rest)) if last.starts_with('@') => {
            let position: usize = number(&last[1..])?;
            if position == 0 {
                return Err(CliError::parse("positions start at @1"));
            }
            (rest, position - 1)
        }
        _ => (args, 0),
    };

    let Some((&kind, name)) = args.split_first() else {
        return Ok(Input::Play {
            source: Source::Library,
            index,
        });
    };
    let name = name.join(" ");
    let needs_name = |what: &str| -> Result<String> {
        if name.is_empty() {
            Err(CliError::parse(format!("usage: play {} <name>", what)))
        } else {
            Ok(name.clone())
        }
    };

    let source = match kind {
        "library" | "all" => Source::Library,
        "album" => Source::Album(needs_name("album")?),
        "artist" => Source::Artist(needs_name("artist")?),
        "folder" => Source::Folder(needs_name("folder")?),
        "playlist" => Source::Playlist(playlist_id(&needs_name("playlist")?)?),
        other => {
            return Err(CliError::parse(format!(
                "cannot play '{}': expected library, album, artist, folder or playlist",
                other
            )))
        }
    };

    Ok(Input::Play { source, index })
}

fn parse_repeat(args: &[&str]) -> Result<Option<RepeatMode>> {
    match args {
        [] | ["cycle"] => Ok(None),
        ["none" | "off"] => Ok(Some(RepeatMode::None)),
        ["all"] => Ok(Some(RepeatMode::All)),
        ["one"] => Ok(Some(RepeatMode::One)),
        _ => Err(CliError::parse("usage: repeat none|all|one|cycle")),
    }
}

fn parse_volume(args: &[&str]) -> Result<Input> {
    match args {
        [level] => {
            let level = number(level)?;
            Ok(Input::Volume {
                left: level,
                right: level,
            })
        }
        [left, right] => Ok(Input::Volume {
            left: number(left)?,
            right: number(right)?,
        }),
        _ => Err(CliError::parse("usage: volume <left> [right]")),
    }
}

fn parse_listing(args: &[&str]) -> Result<Listing> {
    match args {
        [] | ["tracks"] => Ok(Listing::Tracks),
        ["albums"] => Ok(Listing::Albums),
        ["artists"] => Ok(Listing::Artists),
        ["folders"] => Ok(Listing::Folders),
        ["playlists"] => Ok(Listing::Playlists),
        _ => Err(CliError::parse(
            "usage: list tracks|albums|artists|folders|playlists",
        )),
    }
}

fn parse_playlist(args: &[&str]) -> Result<PlaylistAction> {
    match args {
        ["new", name @ ..] if !name.is_empty() => Ok(PlaylistAction::Create(name.join(" "))),
        ["add", playlist, track] => Ok(PlaylistAction::Add {
            playlist: playlist_id(playlist)?,
            track: track_id(track)?,
        }),
        ["remove", playlist, track] => Ok(PlaylistAction::Remove {
            playlist: playlist_id(playlist)?,
            track: track_id(track)?,
        }),
        ["delete", playlist] => Ok(PlaylistAction::Delete(playlist_id(playlist)?)),
        _ => Err(CliError::parse(
            "usage: playlist new <name> | add <playlist> <track> | remove <playlist> <track> | delete <playlist>",
        )),
    }
}

fn switch(args: &[&str]) -> Result<bool> {
    match args {
        ["on" | "true" | "yes"] => Ok(true),
        ["off" | "false" | "no"] => Ok(false),
        _ => Err(CliError::parse("expected on or off")),
    }
}

fn one<'a>(args: &[&'a str], usage: &str) -> Result<&'a str> {
    match args {
        [value] => Ok(value),
        _ => Err(CliError::parse(format!("usage: {}", usage))),
    }
}

fn number<T: std::str::FromStr>(value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| CliError::parse(format!("'{}' is not a number", value)))
}

fn track_id(value: &str) -> Result<TrackId> {
    number(value).map(TrackId::new)
}

fn playlist_id(value: &str) -> Result<PlaylistId> {
    number(value).map(PlaylistId::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Input {
        Input::parse(line).unwrap().unwrap()
    }

    #[test]
    fn blank_lines_are_skipped() {
        assert!(Input::parse("   ").unwrap().is_none());
    }

    #[test]
    fn play_names_keep_their_spaces() {
        assert_eq!(
            parse("play album Abbey Road @3"),
            Input::Play {
                source: Source::Album("Abbey Road".to_string()),
                index: 2,
            }
        );
        assert_eq!(
            parse("play"),
            Input::Play {
                source: Source::Library,
                index: 0,
            }
        );
        assert_eq!(
            parse("play playlist 7"),
            Input::Play {
                source: Source::Playlist(PlaylistId::new(7)),
                index: 0,
            }
        );
    }

    #[test]
    fn play_rejects_bad_targets() {
        assert!(Input::parse("play album").is_err());
        assert!(Input::parse("play library @0").is_err());
        assert!(Input::parse("play genre Jazz").is_err());
    }

    #[test]
    fn modes_and_levels() {
        assert_eq!(parse("repeat"), Input::Repeat(None));
        assert_eq!(parse("repeat one"), Input::Repeat(Some(RepeatMode::One)));
        assert_eq!(parse("shuffle on"), Input::Shuffle(true));
        assert_eq!(parse("mute off"), Input::Mute(false));
        assert_eq!(parse("speed 1.5"), Input::Speed(1.5));
        assert_eq!(
            parse("volume 0.5"),
            Input::Volume {
                left: 0.5,
                right: 0.5,
            }
        );
        assert_eq!(parse("seek 12.5"), Input::Seek { position_ms: 12_500 });
        assert!(Input::parse("seek -1").is_err());
        assert!(Input::parse("shuffle maybe").is_err());
    }

    #[test]
    fn track_and_playlist_edits() {
        assert_eq!(
            parse("rename 4 A New Title"),
            Input::Rename {
                id: TrackId::new(4),
                title: "A New Title".to_string(),
            }
        );
        assert_eq!(parse("fav"), Input::Favorite(None));
        assert_eq!(parse("queue 9"), Input::Queue(TrackId::new(9)));
        assert_eq!(
            parse("playlist add 2 9"),
            Input::Playlist(PlaylistAction::Add {
                playlist: PlaylistId::new(2),
                track: TrackId::new(9),
            })
        );
        assert_eq!(
            parse("playlist new Road Trip"),
            Input::Playlist(PlaylistAction::Create("Road Trip".to_string()))
        );
        assert!(Input::parse("rename 4").is_err());
        assert!(Input::parse("queue x").is_err());
    }

    #[test]
    fn unknown_verbs_are_errors() {
        let err = Input::parse("dance").unwrap_err();
        assert_eq!(err.to_string(), "unknown command 'dance'");
    }
}
