//! Application model: `App` and the pane focus.
//!
//! The `App` struct holds the scanned library, the filtered view and
//! selection, the playlists, and the background shown for the selection.

use std::path::{Path, PathBuf};

use crate::audio::{PlaybackHandle, PlaybackInfo};
use crate::library::{LibraryEntry, filter_indices};
use crate::metadata::{SharedMetadataCache, TrackMetadata, lock_cache};
use crate::playlist::PlaylistManager;

/// Which list receives navigation keys.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Focus {
    #[default]
    Library,
    Playlist,
}

/// Where the track currently playing was started from.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum PlaySource {
    #[default]
    Library,
    Playlist,
}

/// The main application model.
pub struct App {
    pub entries: Vec<LibraryEntry>,
    /// Index into `entries`.
    pub selected: usize,
    pub songs_dir: PathBuf,
    pub scanning: bool,

    pub filter_mode: bool,
    pub filter_query: String,
    visible: Vec<usize>,

    pub focus: Focus,
    pub playlists: PlaylistManager,
    pub playlist_selected: usize,
    pub play_source: PlaySource,

    /// Folder the background below belongs to, and the image found for it.
    pub background: Option<(PathBuf, Option<PathBuf>)>,
    /// One-line message shown under the lists.
    pub status: Option<String>,

    pub metadata: SharedMetadataCache,
    pub playback_handle: Option<PlaybackHandle>,
}

impl App {
    pub fn new(songs_dir: PathBuf, metadata: SharedMetadataCache) -> Self {
        Self {
            entries: Vec::new(),
            selected: 0,
            songs_dir,
            scanning: false,
            filter_mode: false,
            filter_query: String::new(),
            visible: Vec::new(),
            focus: Focus::Library,
            playlists: PlaylistManager::new(),
            playlist_selected: 0,
            play_source: PlaySource::Library,
            background: None,
            status: None,
            metadata,
            playback_handle: None,
        }
    }

    /// Attach a `PlaybackHandle` used to observe playback progress.
    pub fn set_playback_handle(&mut self, h: PlaybackHandle) {
        self.playback_handle = Some(h);
    }

    /// Latest playback snapshot, or an idle one when audio is not attached.
    pub fn playback(&self) -> PlaybackInfo {
        self.playback_handle
            .as_ref()
            .map(|h| h.lock().unwrap_or_else(|e| e.into_inner()).clone())
            .unwrap_or_default()
    }

    /// Replace the library, keeping the selection on the same file when it survived.
    pub fn set_entries(&mut self, entries: Vec<LibraryEntry>) {
        let previous = self.selected_entry().map(|e| e.path().to_path_buf());
        self.entries = entries;
        self.selected = previous
            .and_then(|p| self.entries.iter().position(|e| e.path() == p))
            .unwrap_or(0);
        self.refresh_view();
    }

    pub fn has_entries(&self) -> bool {
        !self.entries.is_empty()
    }

    /// Entry indices currently shown, in library order.
    pub fn display_indices(&self) -> &[usize] {
        &self.visible
    }

    /// Recompute the filtered view, e.g. after tags were resolved.
    pub fn refresh_view(&mut self) {
        self.visible = {
            let cache = lock_cache(&self.metadata);
            filter_indices(&self.entries, &cache, &self.filter_query)
        };
        self.ensure_selected_visible();
    }

    pub fn selected_entry(&self) -> Option<&LibraryEntry> {
        self.entries.get(self.selected)
    }

    /// Cached tags of the selected entry.
    pub fn selected_metadata(&self) -> Option<TrackMetadata> {
        let entry = self.selected_entry()?;
        lock_cache(&self.metadata).get(entry.path()).cloned()
    }

    /// Background image for the selected entry, once looked up.
    pub fn selected_background(&self) -> Option<&Path> {
        let folder = self.selected_entry()?.folder()?;
        match &self.background {
            Some((f, image)) if f == folder => image.as_deref(),
            _ => None,
        }
    }

    /// Folder whose background still has to be looked up for the selection.
    pub fn background_wanted(&self) -> Option<&Path> {
        let folder = self.selected_entry()?.folder()?;
        match &self.background {
            Some((f, _)) if f == folder => None,
            _ => Some(folder),
        }
    }

    pub fn set_background(&mut self, folder: PathBuf, image: Option<PathBuf>) {
        self.background = Some((folder, image));
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status = Some(msg.into());
    }

    /// Move selection to the next visible entry, wrapping around.
    pub fn next(&mut self) {
        if let Some(next) = self.step_in_view(1) {
            self.selected = next;
        }
    }

    /// Move selection to the previous visible entry, wrapping around.
    pub fn prev(&mut self) {
        if let Some(prev) = self.step_in_view(-1) {
            self.selected = prev;
        }
    }

    fn step_in_view(&self, delta: isize) -> Option<usize> {
        let len = self.visible.len();
        if len == 0 {
            return None;
        }
        let pos = match self.visible.iter().position(|&i| i == self.selected) {
            Some(p) => p,
            None => return self.visible.first().copied(),
        };
        let next = (pos as isize + delta).rem_euclid(len as isize) as usize;
        Some(self.visible[next])
    }

    /// Enter filter mode: typed characters go to the query.
    pub fn enter_filter_mode(&mut self) {
        self.filter_mode = true;
    }

    /// Leave filter mode, keeping the query applied.
    pub fn exit_filter_mode(&mut self) {
        self.filter_mode = false;
    }

    /// Clear the active filter and leave filter mode.
    pub fn clear_filter(&mut self) {
        self.filter_query.clear();
        self.filter_mode = false;
        self.refresh_view();
    }

    pub fn push_filter_char(&mut self, c: char) {
        self.filter_query.push(c);
        self.refresh_view();
    }

    pub fn pop_filter_char(&mut self) {
        self.filter_query.pop();
        self.refresh_view();
    }

    /// Keep `selected` inside the filtered view, otherwise move to its first entry.
    fn ensure_selected_visible(&mut self) {
        match self.visible.first() {
            None => self.selected = 0,
            Some(&first) => {
                if !self.visible.contains(&self.selected) {
                    self.selected = first;
                }
            }
        }
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Library => Focus::Playlist,
            Focus::Playlist => Focus::Library,
        };
        self.clamp_playlist_selection();
    }

    /// Select the playlist after the current one (by load order), wrapping around.
    pub fn cycle_playlist(&mut self) -> Option<String> {
        let all = self.playlists.playlists();
        if all.is_empty() {
            return None;
        }
        let next = match self.playlists.current_playlist() {
            Some(current) => {
                let pos = all
                    .iter()
                    .position(|p| p.name() == current.name())
                    .unwrap_or(0);
                (pos + 1) % all.len()
            }
            None => 0,
        };
        let name = all[next].name().to_string();
        self.playlists.set_current(Some(&name));
        self.playlist_selected = 0;
        Some(name)
    }

    pub fn playlist_next(&mut self) {
        let len = self.playlists.current_playlist().map_or(0, |p| p.len());
        if len > 0 {
            self.playlist_selected = (self.playlist_selected + 1) % len;
        }
    }

    pub fn playlist_prev(&mut self) {
        let len = self.playlists.current_playlist().map_or(0, |p| p.len());
        if len > 0 {
            self.playlist_selected = (self.playlist_selected + len - 1) % len;
        }
    }

    pub fn clamp_playlist_selection(&mut self) {
        let len = self.playlists.current_playlist().map_or(0, |p| p.len());
        if self.playlist_selected >= len {
            self.playlist_selected = len.saturating_sub(1);
        }
    }
}
