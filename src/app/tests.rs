use super::*;
use crate::library::LibraryEntry;
use crate::metadata::{MetadataCache, TrackMetadata};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

fn e(folder: &str) -> LibraryEntry {
    LibraryEntry::new(format!("/songs/{folder}/audio.mp3"), folder)
}

fn app_with(titles: &[&str]) -> App {
    let cache = Arc::new(Mutex::new(MetadataCache::default()));
    let mut app = App::new(PathBuf::from("/songs"), cache);
    app.set_entries(titles.iter().map(|t| e(t)).collect());
    app
}

#[test]
fn display_indices_respects_filter_query() {
    let mut app = app_with(&["Alpha", "Beta", "Gamma"]);
    assert_eq!(app.display_indices(), &[0, 1, 2]);

    app.push_filter_char('m');
    app.push_filter_char('m');
    assert_eq!(app.display_indices(), &[2]);
    assert_eq!(app.selected, 2);

    app.pop_filter_char();
    app.pop_filter_char();
    assert_eq!(app.display_indices(), &[0, 1, 2]);
}

#[test]
fn filter_matches_cached_artist() {
    let mut app = app_with(&["Alpha", "Beta"]);
    app.metadata.lock().unwrap().insert(
        Path::new("/songs/Beta/audio.mp3"),
        TrackMetadata {
            artist: Some("Camellia".into()),
            ..TrackMetadata::default()
        },
    );
    app.push_filter_char('c');
    app.push_filter_char('a');
    app.push_filter_char('m');
    assert_eq!(app.display_indices(), &[1]);

    app.clear_filter();
    assert!(!app.filter_mode);
    assert_eq!(app.display_indices().len(), 2);
}

#[test]
fn next_and_prev_wrap_inside_the_view() {
    let mut app = app_with(&["A", "B", "C"]);
    app.prev();
    assert_eq!(app.selected, 2);
    app.next();
    assert_eq!(app.selected, 0);
    app.next();
    assert_eq!(app.selected, 1);
}

#[test]
fn empty_view_keeps_selection_at_zero() {
    let mut app = app_with(&["A"]);
    app.push_filter_char('z');
    assert!(app.display_indices().is_empty());
    app.next();
    assert_eq!(app.selected, 0);
}

#[test]
fn rescan_keeps_selection_on_same_file() {
    let mut app = app_with(&["A", "B", "C"]);
    app.selected = 2;
    app.set_entries(vec![e("C"), e("D")]);
    assert_eq!(app.selected_entry().map(LibraryEntry::title), Some("C"));

    app.set_entries(vec![e("X")]);
    assert_eq!(app.selected, 0);
}

#[test]
fn background_is_tracked_per_folder() {
    let mut app = app_with(&["A", "B"]);
    assert_eq!(app.background_wanted(), Some(Path::new("/songs/A")));

    app.set_background(PathBuf::from("/songs/A"), Some(PathBuf::from("/songs/A/bg.jpg")));
    assert_eq!(app.background_wanted(), None);
    assert_eq!(app.selected_background(), Some(Path::new("/songs/A/bg.jpg")));

    app.next();
    assert_eq!(app.selected_background(), None);
    assert_eq!(app.background_wanted(), Some(Path::new("/songs/B")));
}

#[test]
fn cycle_playlist_walks_all_playlists() {
    let mut app = app_with(&[]);
    assert_eq!(app.cycle_playlist(), None);

    app.playlists.create("One");
    app.playlists.create("Two");
    app.playlists.set_current(None);

    assert_eq!(app.cycle_playlist().as_deref(), Some("One"));
    assert_eq!(app.cycle_playlist().as_deref(), Some("Two"));
    assert_eq!(app.cycle_playlist().as_deref(), Some("One"));
}

#[test]
fn playlist_selection_wraps_and_clamps() {
    let mut app = app_with(&["A", "B"]);
    let list = app.playlists.create("Mix");
    list.add(e("A"));
    list.add(e("B"));

    app.playlist_prev();
    assert_eq!(app.playlist_selected, 1);
    app.playlist_next();
    assert_eq!(app.playlist_selected, 0);

    app.playlist_selected = 1;
    app.playlists.current_playlist_mut().unwrap().remove(1);
    app.clamp_playlist_selection();
    assert_eq!(app.playlist_selected, 0);
}

#[test]
fn playback_without_audio_is_idle() {
    let app = app_with(&["A"]);
    assert_eq!(app.playback(), crate::audio::PlaybackInfo::default());
}
