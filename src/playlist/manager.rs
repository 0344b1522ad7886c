use crate::library::LibraryEntry;

use super::model::Playlist;

/// In-memory playlists plus the active one and its cursor.
///
/// Names are unique: creating or adopting a playlist whose name is already
/// present reuses the existing instance.
#[derive(Debug, Default)]
pub struct PlaylistManager {
    playlists: Vec<Playlist>,
    current: Option<usize>,
    cursor: usize,
}

impl PlaylistManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn playlists(&self) -> &[Playlist] {
        &self.playlists
    }

    pub fn is_empty(&self) -> bool {
        self.playlists.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Playlist> {
        self.position(name).map(|i| &self.playlists[i])
    }

    /// Create `name` (or reuse the existing one) and make it current.
    pub fn create(&mut self, name: &str) -> &mut Playlist {
        let i = match self.position(name) {
            Some(i) => i,
            None => {
                self.playlists.push(Playlist::new(name));
                self.playlists.len() - 1
            }
        };
        self.current = Some(i);
        self.cursor = 0;
        &mut self.playlists[i]
    }

    /// Take ownership of a playlist read from storage.
    ///
    /// When one with the same name is already loaded its songs are replaced,
    /// so the most recently loaded state wins. The current selection is kept.
    pub fn adopt(&mut self, playlist: Playlist) -> &mut Playlist {
        match self.position(playlist.name()) {
            Some(i) => {
                self.playlists[i].replace_songs(playlist.into_songs());
                if self.current == Some(i) {
                    self.clamp_cursor();
                }
                &mut self.playlists[i]
            }
            None => {
                self.playlists.push(playlist);
                let last = self.playlists.len() - 1;
                &mut self.playlists[last]
            }
        }
    }

    /// Drop `name` from memory. Clears the selection when it was current.
    pub fn delete(&mut self, name: &str) -> Option<Playlist> {
        let i = self.position(name)?;
        let removed = self.playlists.remove(i);
        match self.current {
            Some(c) if c == i => {
                self.current = None;
                self.cursor = 0;
            }
            Some(c) if c > i => self.current = Some(c - 1),
            _ => {}
        }
        Some(removed)
    }

    /// Select `name` as the current playlist, or clear the selection with `None`.
    /// Resets the cursor. Returns `false` when no playlist has that name.
    pub fn set_current(&mut self, name: Option<&str>) -> bool {
        self.cursor = 0;
        match name {
            None => {
                self.current = None;
                true
            }
            Some(name) => match self.position(name) {
                Some(i) => {
                    self.current = Some(i);
                    true
                }
                None => false,
            },
        }
    }

    pub fn current_playlist(&self) -> Option<&Playlist> {
        self.current.map(|i| &self.playlists[i])
    }

    pub fn current_playlist_mut(&mut self) -> Option<&mut Playlist> {
        self.current.map(|i| &mut self.playlists[i])
    }

    /// Remove the song at `index` of the current playlist.
    ///
    /// The cursor keeps pointing at the same song when an earlier one goes,
    /// and stays inside the shortened playlist otherwise.
    pub fn remove_from_current(&mut self, index: usize) -> Option<LibraryEntry> {
        let removed = self.current_playlist_mut()?.remove(index)?;
        if index < self.cursor {
            self.cursor -= 1;
        }
        self.clamp_cursor();
        Some(removed)
    }

    /// Shuffle the current playlist and put the cursor on its new first song.
    pub fn shuffle_current(&mut self) -> bool {
        let Some(playlist) = self.current_playlist_mut() else {
            return false;
        };
        playlist.shuffle();
        self.cursor = 0;
        true
    }

    /// Empty the current playlist.
    pub fn clear_current(&mut self) -> bool {
        let Some(playlist) = self.current_playlist_mut() else {
            return false;
        };
        playlist.clear();
        self.cursor = 0;
        true
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Move the cursor to `index` of the current playlist, if it is in range.
    pub fn set_cursor(&mut self, index: usize) -> bool {
        let in_range = self.current_playlist().is_some_and(|p| index < p.len());
        if in_range {
            self.cursor = index;
        }
        in_range
    }

    /// Advance with wraparound. `None` without a current, non-empty playlist.
    pub fn next_song(&mut self) -> Option<&LibraryEntry> {
        let len = self.current_len()?;
        self.cursor = (self.cursor + 1) % len;
        self.current_song()
    }

    /// Step back with wraparound. `None` without a current, non-empty playlist.
    pub fn previous_song(&mut self) -> Option<&LibraryEntry> {
        let len = self.current_len()?;
        self.cursor = (self.cursor % len + len - 1) % len;
        self.current_song()
    }

    pub fn current_song(&self) -> Option<&LibraryEntry> {
        self.current_playlist()?.get(self.cursor)
    }

    fn current_len(&self) -> Option<usize> {
        self.current_playlist()
            .map(Playlist::len)
            .filter(|&len| len > 0)
    }

    fn clamp_cursor(&mut self) {
        let len = self.current_playlist().map_or(0, Playlist::len);
        if self.cursor >= len {
            self.cursor = len.saturating_sub(1);
        }
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.playlists.iter().position(|p| p.name() == name)
    }
}
