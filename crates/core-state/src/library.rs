//! In-memory music library.
//!
//! Albums and artists are derived from the track list (grouped in first-seen
//! order); playlists, recommendations and stations are added explicitly.
//! Playback is simulated: `tick` advances the position and rolls over to the
//! next queued track.

use crate::{
    DetailKind, DetailSnapshot, MusicService, PlaybackSnapshot, PlaybackStatus, QueueSnapshot,
    SearchSnapshot, ServiceError, Track, format_time,
};
use std::time::Duration;
use tracing::debug;

/// `prev` within this much of a track's start goes to the previous track;
/// later it restarts the current one.
const RESTART_THRESHOLD: Duration = Duration::from_secs(3);

#[derive(Debug, Clone)]
struct Collection {
    name: String,
    subtitle: String,
    tracks: Vec<usize>,
}

#[derive(Debug, Clone, Default)]
struct Hits {
    query: String,
    songs: Vec<usize>,
    albums: Vec<usize>,
    artists: Vec<usize>,
    playlists: Vec<usize>,
}

#[derive(Debug, Clone)]
pub struct LocalLibrary {
    tracks: Vec<Track>,
    albums: Vec<Collection>,
    artists: Vec<Collection>,
    playlists: Vec<Collection>,
    recommendations: Vec<Collection>,
    stations: Vec<Collection>,
    queue: Vec<usize>,
    current: Option<usize>,
    status: PlaybackStatus,
    position: Duration,
    hits: Hits,
    revision: u64,
}

fn group_by(tracks: &[Track], key: impl Fn(&Track) -> &str, subtitle: impl Fn(&Track) -> String) -> Vec<Collection> {
    let mut out: Vec<Collection> = Vec::new();
    for (idx, track) in tracks.iter().enumerate() {
        match out.iter_mut().find(|c| c.name == key(track)) {
            Some(c) => c.tracks.push(idx),
            None => out.push(Collection {
                name: key(track).to_string(),
                subtitle: subtitle(track),
                tracks: vec![idx],
            }),
        }
    }
    out
}

impl LocalLibrary {
    /// Library whose queue holds every track in order.
    pub fn new(tracks: Vec<Track>) -> Self {
        let albums = group_by(&tracks, |t| t.album.as_str(), |t| t.artist.clone());
        let artists = group_by(&tracks, |t| t.artist.as_str(), |_| "artist".to_string());
        let queue = (0..tracks.len()).collect();
        Self {
            tracks,
            albums,
            artists,
            playlists: Vec::new(),
            recommendations: Vec::new(),
            stations: Vec::new(),
            queue,
            current: None,
            status: PlaybackStatus::Stopped,
            position: Duration::ZERO,
            hits: Hits::default(),
            revision: 0,
        }
    }

    fn collection(name: &str, subtitle: &str, tracks: &[usize]) -> Collection {
        Collection {
            name: name.to_string(),
            subtitle: subtitle.to_string(),
            tracks: tracks.to_vec(),
        }
    }

    pub fn with_playlist(mut self, name: &str, tracks: &[usize]) -> Self {
        self.playlists.push(Self::collection(name, "playlist", tracks));
        self
    }

    pub fn with_recommendation(mut self, name: &str, reason: &str, tracks: &[usize]) -> Self {
        self.recommendations.push(Self::collection(name, reason, tracks));
        self
    }

    pub fn with_station(mut self, name: &str, genre: &str, tracks: &[usize]) -> Self {
        self.stations.push(Self::collection(name, genre, tracks));
        self
    }

    /// Small built-in catalog used when no external service is wired in.
    pub fn demo() -> Self {
        let tracks = vec![
            Track::new("Blue Hour", "Harbor Lights", "Tidewater", 214),
            Track::new("Salt Roads", "Harbor Lights", "Tidewater", 187),
            Track::new("Lantern", "Harbor Lights", "Tidewater", 242),
            Track::new("Static Bloom", "Night Transit", "Overpass", 201),
            Track::new("Signal Fade", "Night Transit", "Overpass", 256),
            Track::new("Paper Moons", "Juniper Vale", "Field Notes", 173),
            Track::new("Long Grass", "Juniper Vale", "Field Notes", 229),
            Track::new("Small Hours", "Juniper Vale", "Field Notes", 310),
        ];
        Self::new(tracks)
            .with_playlist("Late Drive", &[3, 4, 0])
            .with_playlist("Quiet Morning", &[5, 6, 2])
            .with_recommendation("Because you played Tidewater", "similar artists", &[5, 7])
            .with_station("Coastal Radio", "ambient folk", &[0, 1, 5, 6])
    }

    fn bump(&mut self) {
        self.revision += 1;
    }

    fn current_track(&self) -> Option<&Track> {
        self.current
            .and_then(|i| self.queue.get(i))
            .and_then(|t| self.tracks.get(*t))
    }

    fn start(&mut self, queue_index: usize) {
        self.current = Some(queue_index);
        self.position = Duration::ZERO;
    }

    fn collections(&self, kind: DetailKind) -> &[Collection] {
        match kind {
            DetailKind::Album => &self.albums,
            DetailKind::Artist => &self.artists,
            DetailKind::Playlist => &self.playlists,
            DetailKind::Recommendation => &self.recommendations,
            DetailKind::Station => &self.stations,
            DetailKind::Song => &[],
        }
    }

    /// Catalog index of the `index`-th visible item of `kind`. After a search
    /// the visible items are the search hits; otherwise the whole catalog.
    fn resolve(&self, kind: DetailKind, index: usize) -> Option<usize> {
        let searched = !self.hits.query.is_empty();
        let hits = match kind {
            DetailKind::Song => Some(&self.hits.songs),
            DetailKind::Album => Some(&self.hits.albums),
            DetailKind::Artist => Some(&self.hits.artists),
            DetailKind::Playlist => Some(&self.hits.playlists),
            DetailKind::Recommendation | DetailKind::Station => None,
        };
        match hits {
            Some(list) if searched => list.get(index).copied(),
            _ => {
                let len = match kind {
                    DetailKind::Song => self.tracks.len(),
                    other => self.collections(other).len(),
                };
                (index < len).then_some(index)
            }
        }
    }

    fn song_detail(&self, idx: usize) -> DetailSnapshot {
        let track = &self.tracks[idx];
        let queued = self.queue.iter().position(|t| *t == idx);
        DetailSnapshot {
            kind: DetailKind::Song,
            title: track.title.clone(),
            subtitle: format!("{} / {}", track.artist, track.album),
            lines: vec![
                format!("Length   {}", format_time(track.duration)),
                match queued {
                    Some(pos) => format!("Queue    #{}", pos + 1),
                    None => "Queue    not queued".to_string(),
                },
            ],
        }
    }

    fn collection_detail(&self, kind: DetailKind, collection: &Collection) -> DetailSnapshot {
        let mut lines: Vec<String> = collection
            .tracks
            .iter()
            .filter_map(|t| self.tracks.get(*t))
            .enumerate()
            .map(|(n, t)| format!("{:>2}. {} ({})", n + 1, t.title, format_time(t.duration)))
            .collect();
        let total: Duration = collection
            .tracks
            .iter()
            .filter_map(|t| self.tracks.get(*t))
            .map(|t| t.duration)
            .sum();
        lines.push(format!("{} tracks, {}", collection.tracks.len(), format_time(total)));
        DetailSnapshot {
            kind,
            title: collection.name.clone(),
            subtitle: collection.subtitle.clone(),
            lines,
        }
    }
}

impl MusicService for LocalLibrary {
    fn playback(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            status: self.status,
            track: self.current_track().cloned(),
            position: self.position,
        }
    }

    fn queue(&self) -> QueueSnapshot {
        QueueSnapshot {
            entries: self
                .queue
                .iter()
                .filter_map(|t| self.tracks.get(*t).cloned())
                .collect(),
            current: self.current,
        }
    }

    fn search_results(&self) -> SearchSnapshot {
        let names = |list: &[usize], from: &[Collection]| -> Vec<String> {
            list.iter()
                .filter_map(|i| from.get(*i).map(|c| c.name.clone()))
                .collect()
        };
        SearchSnapshot {
            query: self.hits.query.clone(),
            songs: self
                .hits
                .songs
                .iter()
                .filter_map(|i| self.tracks.get(*i).cloned())
                .collect(),
            albums: names(&self.hits.albums, &self.albums),
            artists: names(&self.hits.artists, &self.artists),
            playlists: names(&self.hits.playlists, &self.playlists),
        }
    }

    fn detail(&self, kind: DetailKind, index: usize) -> Result<DetailSnapshot, ServiceError> {
        let idx = self
            .resolve(kind, index)
            .ok_or(ServiceError::NoSuchItem { kind, index })?;
        Ok(match kind {
            DetailKind::Song => self.song_detail(idx),
            other => self.collection_detail(other, &self.collections(other)[idx]),
        })
    }

    fn revision(&self) -> u64 {
        self.revision
    }

    fn play(&mut self) -> Result<(), ServiceError> {
        if self.queue.is_empty() {
            return Err(ServiceError::EmptyQueue);
        }
        if self.current.is_none() {
            self.start(0);
        }
        self.status = PlaybackStatus::Playing;
        self.bump();
        Ok(())
    }

    fn pause(&mut self) {
        if self.status == PlaybackStatus::Playing {
            self.status = PlaybackStatus::Paused;
            self.bump();
        }
    }

    fn toggle(&mut self) -> Result<(), ServiceError> {
        if self.status == PlaybackStatus::Playing {
            self.pause();
            Ok(())
        } else {
            self.play()
        }
    }

    fn next(&mut self) -> Result<(), ServiceError> {
        if self.queue.is_empty() {
            return Err(ServiceError::EmptyQueue);
        }
        let next = self.current.map_or(0, |i| i + 1);
        if next >= self.queue.len() {
            return Err(ServiceError::EndOfQueue);
        }
        self.start(next);
        self.bump();
        Ok(())
    }

    fn prev(&mut self) -> Result<(), ServiceError> {
        if self.queue.is_empty() {
            return Err(ServiceError::EmptyQueue);
        }
        match self.current {
            Some(i) if i > 0 && self.position < RESTART_THRESHOLD => self.start(i - 1),
            Some(i) => self.start(i),
            None => self.start(0),
        }
        self.bump();
        Ok(())
    }

    fn search(&mut self, query: &str) -> usize {
        let needle = query.trim().to_lowercase();
        let matches = |s: &str| !needle.is_empty() && s.to_lowercase().contains(&needle);
        let collection_hits = |from: &[Collection]| -> Vec<usize> {
            from.iter()
                .enumerate()
                .filter(|(_, c)| matches(&c.name))
                .map(|(i, _)| i)
                .collect()
        };
        let hits = Hits {
            query: query.trim().to_string(),
            songs: self
                .tracks
                .iter()
                .enumerate()
                .filter(|(_, t)| matches(&t.title) || matches(&t.artist) || matches(&t.album))
                .map(|(i, _)| i)
                .collect(),
            albums: collection_hits(&self.albums),
            artists: collection_hits(&self.artists),
            playlists: collection_hits(&self.playlists),
        };
        let total = hits.songs.len() + hits.albums.len() + hits.artists.len() + hits.playlists.len();
        debug!(target: "state.search", query_len = needle.len(), total, "search");
        self.hits = hits;
        self.bump();
        total
    }

    fn tick(&mut self, elapsed: Duration) {
        if self.status != PlaybackStatus::Playing {
            return;
        }
        let Some(length) = self.current_track().map(|t| t.duration) else {
            return;
        };
        let before = self.position.as_secs();
        self.position += elapsed;
        if self.position >= length {
            match self.current {
                Some(i) if i + 1 < self.queue.len() => self.start(i + 1),
                _ => {
                    self.current = None;
                    self.position = Duration::ZERO;
                    self.status = PlaybackStatus::Stopped;
                }
            }
            self.bump();
        } else if self.position.as_secs() != before {
            self.bump();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lib() -> LocalLibrary {
        LocalLibrary::demo()
    }

    #[test]
    fn derives_albums_and_artists() {
        let l = lib();
        assert_eq!(l.albums.len(), 3);
        assert_eq!(l.artists.len(), 3);
        let album = l.detail(DetailKind::Album, 0).unwrap();
        assert_eq!(album.title, "Tidewater");
        assert_eq!(album.subtitle, "Harbor Lights");
        assert_eq!(album.lines.len(), 4);
    }

    #[test]
    fn play_starts_first_track_and_bumps_revision() {
        let mut l = lib();
        let rev = l.revision();
        l.play().unwrap();
        let snap = l.playback();
        assert_eq!(snap.status, PlaybackStatus::Playing);
        assert_eq!(snap.track.unwrap().title, "Blue Hour");
        assert!(l.revision() > rev);
    }

    #[test]
    fn empty_queue_errors() {
        let mut l = LocalLibrary::new(Vec::new());
        assert_eq!(l.play(), Err(ServiceError::EmptyQueue));
        assert_eq!(l.next(), Err(ServiceError::EmptyQueue));
    }

    #[test]
    fn next_stops_at_end_and_prev_restarts_late() {
        let mut l = lib();
        for _ in 0..8 {
            l.next().unwrap();
        }
        assert_eq!(l.next(), Err(ServiceError::EndOfQueue));
        assert_eq!(l.queue().current, Some(7));
        l.play().unwrap();
        l.tick(Duration::from_secs(10));
        l.prev().unwrap();
        assert_eq!(l.queue().current, Some(7), "restart when past threshold");
        l.prev().unwrap();
        assert_eq!(l.queue().current, Some(6));
    }

    #[test]
    fn tick_rolls_over_and_stops_after_last() {
        let mut l = LocalLibrary::new(vec![
            Track::new("a", "x", "y", 2),
            Track::new("b", "x", "y", 2),
        ]);
        l.play().unwrap();
        l.tick(Duration::from_secs(2));
        assert_eq!(l.queue().current, Some(1));
        assert_eq!(l.playback().position, Duration::ZERO);
        l.tick(Duration::from_secs(3));
        assert_eq!(l.playback().status, PlaybackStatus::Stopped);
        assert!(l.playback().track.is_none());
    }

    #[test]
    fn tick_only_bumps_on_whole_seconds() {
        let mut l = lib();
        l.play().unwrap();
        let rev = l.revision();
        l.tick(Duration::from_millis(400));
        assert_eq!(l.revision(), rev);
        l.tick(Duration::from_millis(700));
        assert_eq!(l.revision(), rev + 1);
    }

    #[test]
    fn search_scopes_detail_indices() {
        let mut l = lib();
        let total = l.search("juniper");
        let results = l.search_results();
        assert_eq!(results.songs.len(), 3);
        assert_eq!(results.artists, vec!["Juniper Vale".to_string()]);
        assert_eq!(total, 4);
        assert_eq!(l.detail(DetailKind::Song, 0).unwrap().title, "Paper Moons");
        assert_eq!(l.detail(DetailKind::Artist, 0).unwrap().title, "Juniper Vale");
        assert!(l.detail(DetailKind::Album, 0).is_err());
        assert_eq!(l.detail(DetailKind::Station, 0).unwrap().title, "Coastal Radio");
    }

    #[test]
    fn out_of_range_detail_is_an_error() {
        let l = lib();
        assert_eq!(
            l.detail(DetailKind::Playlist, 9),
            Err(ServiceError::NoSuchItem {
                kind: DetailKind::Playlist,
                index: 9
            })
        );
    }
}
