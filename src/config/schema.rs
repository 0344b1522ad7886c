use std::path::PathBuf;

use serde::Deserialize;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/osu-browser/config.toml` or `~/.config/osu-browser/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `OSU_BROWSER__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub library: LibrarySettings,
    pub metadata: MetadataSettings,
    pub background: BackgroundSettings,
    pub playback: PlaybackSettings,
    pub playlists: PlaylistSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// Root folder holding one sub-folder per song package.
    /// `None` falls back to the game's usual install location.
    pub songs_dir: Option<PathBuf>,
    /// File extensions to treat as audio (case-insensitive, without dot).
    pub extensions: Vec<String>,
    /// Whether to follow symlinks during scanning.
    pub follow_links: bool,
    /// Whether to include hidden files/directories (dotfiles).
    pub include_hidden: bool,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            songs_dir: None,
            extensions: vec!["mp3".into()],
            follow_links: true,
            include_hidden: true,
        }
    }
}

impl LibrarySettings {
    /// The configured songs folder, or `~/AppData/Local/osu!/Songs`.
    pub fn resolved_songs_dir(&self) -> PathBuf {
        if let Some(dir) = &self.songs_dir {
            return dir.clone();
        }
        home_dir()
            .join("AppData")
            .join("Local")
            .join("osu!")
            .join("Songs")
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetadataSettings {
    /// Decode the whole file to learn its length when tags carry no duration.
    /// Slow and memory hungry on large libraries.
    pub allow_expensive_duration_probe: bool,
}

impl Default for MetadataSettings {
    fn default() -> Self {
        Self {
            allow_expensive_duration_probe: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BackgroundSettings {
    /// Extensions accepted for a background referenced by a map file.
    pub image_extensions: Vec<String>,
    /// Remember resolved backgrounds per folder (validated by modification time).
    pub cache: bool,
}

impl Default for BackgroundSettings {
    fn default() -> Self {
        Self {
            image_extensions: ["jpg", "jpeg", "png", "bmp", "gif"]
                .into_iter()
                .map(String::from)
                .collect(),
            cache: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// How often the audio thread refreshes the shared progress snapshot.
    pub poll_interval_ms: u64,
    /// Number of seconds to scrub when pressing `H` / `L`.
    pub scrub_seconds: u64,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: 500,
            scrub_seconds: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaylistSettings {
    /// Directory holding one `<name>.json` record per playlist.
    pub dir: Option<PathBuf>,
    /// Playlist created on first use of "add to playlist".
    pub default_name: String,
}

impl Default for PlaylistSettings {
    fn default() -> Self {
        Self {
            dir: None,
            default_name: "Favorites".to_string(),
        }
    }
}

impl PlaylistSettings {
    pub fn resolved_dir(&self) -> PathBuf {
        self.dir
            .clone()
            .unwrap_or_else(|| home_dir().join(".osu_playlists"))
    }
}

fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
}
