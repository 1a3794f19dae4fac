//! Music-service state as the compositor sees it.
//!
//! Pages never hold domain data. They read snapshots from a [`MusicService`]
//! on every render pass; nothing here pushes notifications. A service exposes
//! a [`revision`](MusicService::revision) counter that increases whenever a
//! snapshot would read differently, which the render loop polls to decide
//! whether a repaint is due.

use std::fmt;
use std::time::Duration;
use thiserror::Error;

mod library;

pub use library::LocalLibrary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackStatus {
    Playing,
    Paused,
    #[default]
    Stopped,
}

impl PlaybackStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaybackStatus::Playing => "playing",
            PlaybackStatus::Paused => "paused",
            PlaybackStatus::Stopped => "stopped",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub duration: Duration,
}

impl Track {
    pub fn new(title: &str, artist: &str, album: &str, secs: u64) -> Self {
        Self {
            title: title.to_string(),
            artist: artist.to_string(),
            album: album.to_string(),
            duration: Duration::from_secs(secs),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlaybackSnapshot {
    pub status: PlaybackStatus,
    pub track: Option<Track>,
    pub position: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueueSnapshot {
    pub entries: Vec<Track>,
    pub current: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchSnapshot {
    pub query: String,
    pub songs: Vec<Track>,
    pub albums: Vec<String>,
    pub artists: Vec<String>,
    pub playlists: Vec<String>,
}

impl SearchSnapshot {
    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
            && self.albums.is_empty()
            && self.artists.is_empty()
            && self.playlists.is_empty()
    }
}

/// What a modal detail view shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DetailKind {
    Song,
    Album,
    Artist,
    Playlist,
    Recommendation,
    Station,
}

impl DetailKind {
    pub const ALL: [DetailKind; 6] = [
        DetailKind::Song,
        DetailKind::Album,
        DetailKind::Artist,
        DetailKind::Playlist,
        DetailKind::Recommendation,
        DetailKind::Station,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DetailKind::Song => "song",
            DetailKind::Album => "album",
            DetailKind::Artist => "artist",
            DetailKind::Playlist => "playlist",
            DetailKind::Recommendation => "recommendation",
            DetailKind::Station => "station",
        }
    }

    /// Case-insensitive; accepts the `rec` shorthand.
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.to_ascii_lowercase();
        if lower == "rec" {
            return Some(DetailKind::Recommendation);
        }
        Self::ALL.into_iter().find(|k| k.as_str() == lower)
    }
}

impl fmt::Display for DetailKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailSnapshot {
    pub kind: DetailKind,
    pub title: String,
    pub subtitle: String,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("queue is empty")]
    EmptyQueue,
    #[error("end of queue")]
    EndOfQueue,
    #[error("no {kind} at index {index}")]
    NoSuchItem { kind: DetailKind, index: usize },
}

/// Domain collaborator. Reads are cheap snapshots; the command methods are
/// the only mutations the compositor triggers.
pub trait MusicService {
    fn playback(&self) -> PlaybackSnapshot;
    fn queue(&self) -> QueueSnapshot;
    fn search_results(&self) -> SearchSnapshot;
    fn detail(&self, kind: DetailKind, index: usize) -> Result<DetailSnapshot, ServiceError>;
    fn revision(&self) -> u64;

    fn play(&mut self) -> Result<(), ServiceError>;
    fn pause(&mut self);
    fn toggle(&mut self) -> Result<(), ServiceError>;
    fn next(&mut self) -> Result<(), ServiceError>;
    fn prev(&mut self) -> Result<(), ServiceError>;
    fn search(&mut self, query: &str) -> usize;

    /// Advance playback clocks by `elapsed`. Services that track time
    /// elsewhere can ignore it.
    fn tick(&mut self, _elapsed: Duration) {}
}

/// `m:ss`, or `h:mm:ss` past one hour.
pub fn format_time(d: Duration) -> String {
    let secs = d.as_secs();
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m}:{s:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_kind_names() {
        assert_eq!(DetailKind::from_name("Album"), Some(DetailKind::Album));
        assert_eq!(DetailKind::from_name("rec"), Some(DetailKind::Recommendation));
        assert_eq!(DetailKind::from_name("podcast"), None);
        assert_eq!(DetailKind::Station.to_string(), "station");
    }

    #[test]
    fn formats_times() {
        assert_eq!(format_time(Duration::from_secs(0)), "0:00");
        assert_eq!(format_time(Duration::from_secs(217)), "3:37");
        assert_eq!(format_time(Duration::from_secs(3725)), "1:02:05");
    }

    #[test]
    fn service_error_messages() {
        let err = ServiceError::NoSuchItem {
            kind: DetailKind::Playlist,
            index: 4,
        };
        assert_eq!(err.to_string(), "no playlist at index 4");
    }
}
