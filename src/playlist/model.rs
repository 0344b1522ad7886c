use std::path::PathBuf;

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::library::LibraryEntry;

/// Ordered list of songs under a unique name.
///
/// The same (path, title) pair is never stored twice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playlist {
    name: String,
    songs: Vec<LibraryEntry>,
}

impl Playlist {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            songs: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn songs(&self) -> &[LibraryEntry] {
        &self.songs
    }

    /// Append `entry` unless it is already present. Returns whether it was added.
    pub fn add(&mut self, entry: LibraryEntry) -> bool {
        if self.songs.contains(&entry) {
            return false;
        }
        self.songs.push(entry);
        true
    }

    pub fn remove(&mut self, index: usize) -> Option<LibraryEntry> {
        (index < self.songs.len()).then(|| self.songs.remove(index))
    }

    pub fn clear(&mut self) {
        self.songs.clear();
    }

    pub fn get(&self, index: usize) -> Option<&LibraryEntry> {
        self.songs.get(index)
    }

    /// Uniformly random reorder, in place.
    pub fn shuffle(&mut self) {
        self.songs.shuffle(&mut rand::rng());
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    pub(super) fn replace_songs(&mut self, songs: Vec<LibraryEntry>) {
        self.songs = songs;
    }

    pub(super) fn into_songs(self) -> Vec<LibraryEntry> {
        self.songs
    }

    pub fn to_record(&self) -> PlaylistRecord {
        PlaylistRecord {
            name: self.name.clone(),
            songs: self
                .songs
                .iter()
                .map(|s| SongRecord {
                    path: s.path().to_path_buf(),
                    title: s.title().to_string(),
                })
                .collect(),
        }
    }

    /// Rebuild a playlist, silently dropping songs whose file no longer exists.
    pub fn from_record(record: PlaylistRecord) -> Self {
        let mut playlist = Self::new(record.name);
        for song in record.songs {
            if song.path.exists() {
                playlist.add(LibraryEntry::new(song.path, song.title));
            }
        }
        playlist
    }
}

/// On-disk form of a playlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistRecord {
    pub name: String,
    #[serde(default)]
    pub songs: Vec<SongRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongRecord {
    pub path: PathBuf,
    pub title: String,
}
