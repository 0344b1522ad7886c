use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::error::PlaylistError;

use super::model::{Playlist, PlaylistRecord};

const RECORD_EXTENSION: &str = "json";

/// Directory of `<name>.json` playlist records.
#[derive(Debug, Clone)]
pub struct PlaylistStore {
    dir: PathBuf,
}

impl PlaylistStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Record file used for the playlist called `name`.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir
            .join(format!("{}.{RECORD_EXTENSION}", file_stem_for(name)))
    }

    /// Write `playlist`, creating the directory if needed.
    pub fn save(&self, playlist: &Playlist) -> Result<PathBuf, PlaylistError> {
        let path = self.path_for(playlist.name());
        fs::create_dir_all(&self.dir).map_err(|source| PlaylistError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let json = serde_json::to_string_pretty(&playlist.to_record()).map_err(|source| {
            PlaylistError::Json {
                path: path.clone(),
                source,
            }
        })?;
        fs::write(&path, json).map_err(|source| PlaylistError::Io {
            path: path.clone(),
            source,
        })?;

        info!(
            "saved playlist '{}' ({} songs) to {}",
            playlist.name(),
            playlist.len(),
            path.display()
        );
        Ok(path)
    }

    /// Read the playlist called `name`. Songs whose file is gone are dropped.
    pub fn load(&self, name: &str) -> Result<Playlist, PlaylistError> {
        let path = self.path_for(name);
        match read_record(&path) {
            Err(PlaylistError::Io { source, .. }) if source.kind() == ErrorKind::NotFound => {
                Err(PlaylistError::NotFound {
                    name: name.to_string(),
                    path,
                })
            }
            other => other,
        }
    }

    /// Every readable record in the directory, ordered by file name.
    ///
    /// Unreadable or malformed records are logged and skipped. A missing
    /// directory yields nothing.
    pub fn load_all(&self) -> Vec<Playlist> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                if e.kind() != ErrorKind::NotFound {
                    warn!("cannot list playlists in {}: {e}", self.dir.display());
                }
                return Vec::new();
            }
        };

        let mut files: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|e| e.path())
            .filter(|p| {
                p.is_file()
                    && p.extension()
                        .and_then(|e| e.to_str())
                        .is_some_and(|e| e.eq_ignore_ascii_case(RECORD_EXTENSION))
            })
            .collect();
        files.sort();

        files
            .iter()
            .filter_map(|path| match read_record(path) {
                Ok(playlist) => Some(playlist),
                Err(e) => {
                    warn!("skipping playlist: {e}");
                    None
                }
            })
            .collect()
    }

    /// Remove the record for `name`. Returns `false` when there was none.
    pub fn delete(&self, name: &str) -> Result<bool, PlaylistError> {
        let path = self.path_for(name);
        match fs::remove_file(&path) {
            Ok(()) => {
                info!("deleted playlist record {}", path.display());
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(source) => Err(PlaylistError::Io { path, source }),
        }
    }
}

fn read_record(path: &Path) -> Result<Playlist, PlaylistError> {
    let text = fs::read_to_string(path).map_err(|source| PlaylistError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let record: PlaylistRecord =
        serde_json::from_str(&text).map_err(|source| PlaylistError::Json {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(Playlist::from_record(record))
}

/// File-name-safe form of a playlist name.
fn file_stem_for(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let cleaned = cleaned.trim_matches('.');
    if cleaned.is_empty() {
        "playlist".to_string()
    } else {
        cleaned.to_string()
    }
}
