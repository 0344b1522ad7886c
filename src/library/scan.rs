use std::path::Path;

use log::{debug, info};
use walkdir::WalkDir;

use crate::config::LibrarySettings;

use super::model::LibraryEntry;

/// Result of walking a songs folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    Complete(Vec<LibraryEntry>),
    /// The root folder does not exist; not an error, just nothing to show.
    RootMissing,
    /// A newer scan superseded this one before it finished.
    Cancelled,
}

impl ScanOutcome {
    pub fn entries(&self) -> &[LibraryEntry] {
        match self {
            Self::Complete(entries) => entries,
            Self::RootMissing | Self::Cancelled => &[],
        }
    }

    pub fn into_entries(self) -> Vec<LibraryEntry> {
        match self {
            Self::Complete(entries) => entries,
            Self::RootMissing | Self::Cancelled => Vec::new(),
        }
    }
}

fn is_audio_file(path: &Path, settings: &LibrarySettings) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            settings
                .extensions
                .iter()
                .map(|e| e.trim().trim_start_matches('.'))
                .filter(|e| !e.is_empty())
                .any(|e| e.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Walk `root` recursively and return one entry per audio file.
#[cfg(test)]
pub fn scan(root: &Path, settings: &LibrarySettings) -> ScanOutcome {
    scan_until(root, settings, || false)
}

/// Walk `root` recursively, polling `cancelled` between directory entries and gives up
/// as soon as it returns `true`.
///
/// Entries are visited in file-name order so the same tree always yields the
/// same sequence.
pub fn scan_until(
    root: &Path,
    settings: &LibrarySettings,
    cancelled: impl Fn() -> bool,
) -> ScanOutcome {
    if !root.is_dir() {
        info!("songs directory not found: {}", root.display());
        return ScanOutcome::RootMissing;
    }

    let mut entries: Vec<LibraryEntry> = Vec::new();
    let walker = WalkDir::new(root)
        .follow_links(settings.follow_links)
        .sort_by_file_name();

    for entry in walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(Result::ok)
    {
        if cancelled() {
            debug!("scan of {} cancelled", root.display());
            return ScanOutcome::Cancelled;
        }

        let path = entry.path();
        if entry.file_type().is_file() && is_audio_file(path, settings) {
            entries.push(LibraryEntry::from_audio_file(path));
        }
    }

    info!("scanned {}: {} songs", root.display(), entries.len());
    ScanOutcome::Complete(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn is_audio_file_matches_configured_extensions_case_insensitive() {
        let settings = LibrarySettings::default();
        assert!(is_audio_file(Path::new("/tmp/a.mp3"), &settings));
        assert!(is_audio_file(Path::new("/tmp/a.MP3"), &settings));
        assert!(!is_audio_file(Path::new("/tmp/a.ogg"), &settings));
        assert!(!is_audio_file(Path::new("/tmp/a.osu"), &settings));
        assert!(!is_audio_file(Path::new("/tmp/a"), &settings));

        let settings = LibrarySettings {
            extensions: vec![".OGG".into()],
            ..LibrarySettings::default()
        };
        assert!(is_audio_file(Path::new("/tmp/a.ogg"), &settings));
    }

    #[test]
    fn scan_keeps_only_audio_files_of_a_package() {
        let dir = tempdir().unwrap();
        let pkg = dir.path().join("77 Pkg");
        fs::create_dir_all(&pkg).unwrap();
        fs::write(pkg.join("audio.mp3"), b"x").unwrap();
        fs::write(pkg.join("map.osu"), b"x").unwrap();
        fs::write(pkg.join("bg.jpg"), b"x").unwrap();

        let entries = scan(dir.path(), &LibrarySettings::default()).into_entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title(), "Pkg");
    }

    #[test]
    fn scan_skips_hidden_folders_when_configured() {
        let dir = tempdir().unwrap();
        let hidden = dir.path().join(".trash");
        fs::create_dir_all(&hidden).unwrap();
        fs::write(hidden.join("gone.mp3"), b"x").unwrap();
        let visible = dir.path().join("Visible");
        fs::create_dir_all(&visible).unwrap();
        fs::write(visible.join("song.mp3"), b"x").unwrap();

        let settings = LibrarySettings {
            include_hidden: false,
            ..LibrarySettings::default()
        };
        let entries = scan(dir.path(), &settings).into_entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title(), "Visible");
    }

    #[test]
    fn scan_until_stops_when_cancelled() {
        let dir = tempdir().unwrap();
        for name in ["a", "b", "c"] {
            let d = dir.path().join(name);
            fs::create_dir_all(&d).unwrap();
            fs::write(d.join("x.mp3"), b"x").unwrap();
        }

        let polls = Cell::new(0);
        let outcome = scan_until(dir.path(), &LibrarySettings::default(), || {
            polls.set(polls.get() + 1);
            polls.get() > 2
        });
        assert_eq!(outcome, ScanOutcome::Cancelled);
        assert!(outcome.entries().is_empty());
    }
}
