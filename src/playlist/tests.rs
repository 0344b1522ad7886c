use std::fs;
use std::path::Path;

use tempfile::tempdir;

use super::model::PlaylistRecord;
use super::*;
use crate::error::PlaylistError;
use crate::library::LibraryEntry;

fn entry(path: &str, title: &str) -> LibraryEntry {
    LibraryEntry::new(path, title)
}

fn three_song_manager() -> PlaylistManager {
    let mut manager = PlaylistManager::new();
    let playlist = manager.create("Mix");
    playlist.add(entry("/a.mp3", "A"));
    playlist.add(entry("/b.mp3", "B"));
    playlist.add(entry("/c.mp3", "C"));
    manager
}

fn touch(dir: &Path, name: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, b"mp3").unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn playlist_rejects_duplicate_pairs() {
    let mut p = Playlist::new("x");
    assert!(p.add(entry("/a.mp3", "A")));
    assert!(!p.add(entry("/a.mp3", "A")));
    // Same file under another title is a different entry.
    assert!(p.add(entry("/a.mp3", "A (alt)")));
    assert_eq!(p.len(), 2);
}

#[test]
fn playlist_remove_get_and_clear() {
    let mut p = Playlist::new("x");
    p.add(entry("/a.mp3", "A"));
    p.add(entry("/b.mp3", "B"));

    assert_eq!(p.remove(5), None);
    assert_eq!(p.remove(0), Some(entry("/a.mp3", "A")));
    assert_eq!(p.get(0), Some(&entry("/b.mp3", "B")));
    assert_eq!(p.get(1), None);

    p.clear();
    assert!(p.is_empty());
}

#[test]
fn shuffle_keeps_the_same_songs() {
    let mut p = Playlist::new("x");
    for i in 0..20 {
        p.add(entry(&format!("/{i}.mp3"), &i.to_string()));
    }
    let before = p.songs().to_vec();
    p.shuffle();

    let mut after = p.songs().to_vec();
    let mut sorted_before = before.clone();
    after.sort_by(|a, b| a.path().cmp(b.path()));
    sorted_before.sort_by(|a, b| a.path().cmp(b.path()));
    assert_eq!(after, sorted_before);
}

#[test]
fn next_and_previous_wrap_around() {
    let mut m = three_song_manager();
    assert_eq!(m.current_song().map(LibraryEntry::title), Some("A"));

    assert_eq!(m.next_song().map(LibraryEntry::title), Some("B"));
    assert_eq!(m.next_song().map(LibraryEntry::title), Some("C"));
    assert_eq!(m.next_song().map(LibraryEntry::title), Some("A"));
    assert_eq!(m.cursor(), 0);

    assert_eq!(m.previous_song().map(LibraryEntry::title), Some("C"));
    assert_eq!(m.cursor(), 2);
    assert_eq!(m.current_song().map(LibraryEntry::title), Some("C"));
}

#[test]
fn navigation_on_empty_or_missing_playlist_is_none() {
    let mut m = PlaylistManager::new();
    assert_eq!(m.next_song(), None);
    assert_eq!(m.previous_song(), None);
    assert_eq!(m.current_song(), None);

    m.create("Empty");
    assert_eq!(m.next_song(), None);
    assert_eq!(m.previous_song(), None);
    assert_eq!(m.current_song(), None);
}

#[test]
fn set_cursor_only_accepts_valid_positions() {
    let mut m = three_song_manager();
    assert!(m.set_cursor(2));
    assert_eq!(m.current_song().map(LibraryEntry::title), Some("C"));
    assert!(!m.set_cursor(3));
    assert_eq!(m.cursor(), 2);
}

#[test]
fn creating_an_existing_name_reuses_it() {
    let mut m = three_song_manager();
    m.create("Other");
    let again = m.create("Mix");
    assert_eq!(again.len(), 3);
    assert_eq!(m.playlists().len(), 2);
    assert_eq!(m.current_playlist().map(Playlist::name), Some("Mix"));
}

#[test]
fn adopting_a_known_name_replaces_its_songs() {
    let mut m = three_song_manager();
    m.next_song();
    m.next_song();

    let mut loaded = Playlist::new("Mix");
    loaded.add(entry("/z.mp3", "Z"));
    m.adopt(loaded);

    assert_eq!(m.playlists().len(), 1);
    assert_eq!(m.get("Mix").unwrap().songs(), &[entry("/z.mp3", "Z")]);
    // Cursor pointed past the new end.
    assert_eq!(m.cursor(), 0);
    assert_eq!(m.current_song().map(LibraryEntry::title), Some("Z"));
}

#[test]
fn adopting_a_shorter_current_playlist_clamps_the_cursor() {
    let mut m = three_song_manager();
    assert!(m.set_cursor(2));

    let mut loaded = Playlist::new("Mix");
    loaded.add(entry("/a.mp3", "A"));
    loaded.add(entry("/b.mp3", "B"));
    m.adopt(loaded);

    assert_eq!(m.cursor(), 1);
    assert_eq!(m.current_song().map(LibraryEntry::title), Some("B"));
}

#[test]
fn removing_the_last_song_under_the_cursor_keeps_it_in_range() {
    let mut m = three_song_manager();
    assert!(m.set_cursor(2));

    assert_eq!(m.remove_from_current(2).map(|e| e.title().to_string()), Some("C".into()));
    assert_eq!(m.cursor(), 1);
    assert_eq!(m.current_song().map(LibraryEntry::title), Some("B"));
}

#[test]
fn removing_an_earlier_song_keeps_the_cursor_on_its_song() {
    let mut m = three_song_manager();
    assert!(m.set_cursor(1));

    m.remove_from_current(0);
    assert_eq!(m.cursor(), 0);
    assert_eq!(m.current_song().map(LibraryEntry::title), Some("B"));
    assert_eq!(m.next_song().map(LibraryEntry::title), Some("C"));
}

#[test]
fn removing_a_later_song_leaves_the_cursor_alone() {
    let mut m = three_song_manager();
    assert!(m.set_cursor(1));

    m.remove_from_current(2);
    assert_eq!(m.cursor(), 1);
    assert_eq!(m.current_song().map(LibraryEntry::title), Some("B"));
}

#[test]
fn removing_every_song_or_out_of_range_is_safe() {
    let mut m = three_song_manager();
    assert_eq!(m.remove_from_current(7), None);
    for _ in 0..3 {
        assert!(m.remove_from_current(0).is_some());
    }
    assert_eq!(m.cursor(), 0);
    assert_eq!(m.current_song(), None);
    assert_eq!(m.remove_from_current(0), None);

    let mut none = PlaylistManager::new();
    assert_eq!(none.remove_from_current(0), None);
}

#[test]
fn shuffling_the_current_playlist_resets_the_cursor() {
    let mut m = three_song_manager();
    assert!(m.set_cursor(2));

    assert!(m.shuffle_current());
    assert_eq!(m.cursor(), 0);
    assert_eq!(m.current_playlist().map(Playlist::len), Some(3));
    assert!(!PlaylistManager::new().shuffle_current());
}

#[test]
fn clearing_the_current_playlist_resets_the_cursor() {
    let mut m = three_song_manager();
    assert!(m.set_cursor(2));

    assert!(m.clear_current());
    assert_eq!(m.cursor(), 0);
    assert_eq!(m.current_playlist().map(Playlist::is_empty), Some(true));
    assert!(!PlaylistManager::new().clear_current());
}

#[test]
fn deleting_current_playlist_clears_selection() {
    let mut m = three_song_manager();
    m.create("Second");
    m.set_current(Some("Mix"));
    m.next_song();

    assert!(m.delete("Mix").is_some());
    assert!(m.current_playlist().is_none());
    assert_eq!(m.cursor(), 0);
    assert!(m.delete("Mix").is_none());
}

#[test]
fn deleting_another_playlist_keeps_selection() {
    let mut m = PlaylistManager::new();
    m.create("First");
    m.create("Second");
    m.delete("First");
    assert_eq!(m.current_playlist().map(Playlist::name), Some("Second"));
}

#[test]
fn set_current_unknown_name_is_rejected() {
    let mut m = three_song_manager();
    assert!(!m.set_current(Some("nope")));
    assert!(m.set_current(None));
    assert!(m.current_playlist().is_none());
}

#[test]
fn store_round_trips_existing_songs() {
    let songs = tempdir().unwrap();
    let dir = tempdir().unwrap();
    let store = PlaylistStore::new(dir.path().join("lists"));

    let a = touch(songs.path(), "a.mp3");
    let b = touch(songs.path(), "b.mp3");
    let mut playlist = Playlist::new("Favorites");
    playlist.add(entry(&a, "Alpha"));
    playlist.add(entry(&b, "Beta"));

    let path = store.save(&playlist).unwrap();
    assert_eq!(path, dir.path().join("lists").join("Favorites.json"));

    let text = fs::read_to_string(&path).unwrap();
    let record: PlaylistRecord = serde_json::from_str(&text).unwrap();
    assert_eq!(record.name, "Favorites");
    assert_eq!(record.songs[1].title, "Beta");

    assert_eq!(store.load("Favorites").unwrap(), playlist);
}

#[test]
fn loading_drops_songs_whose_file_was_deleted() {
    let songs = tempdir().unwrap();
    let dir = tempdir().unwrap();
    let store = PlaylistStore::new(dir.path());

    let kept = touch(songs.path(), "kept.mp3");
    let gone = touch(songs.path(), "gone.mp3");
    let mut playlist = Playlist::new("Mix");
    playlist.add(entry(&gone, "Gone"));
    playlist.add(entry(&kept, "Kept"));
    store.save(&playlist).unwrap();

    fs::remove_file(&gone).unwrap();
    let loaded = store.load("Mix").unwrap();
    assert_eq!(loaded.songs(), &[entry(&kept, "Kept")]);
}

#[test]
fn missing_and_malformed_records_are_errors() {
    let dir = tempdir().unwrap();
    let store = PlaylistStore::new(dir.path());
    assert!(matches!(
        store.load("nothing"),
        Err(PlaylistError::NotFound { .. })
    ));

    fs::write(dir.path().join("bad.json"), "{ not json").unwrap();
    assert!(matches!(store.load("bad"), Err(PlaylistError::Json { .. })));
}

#[test]
fn load_all_skips_bad_records_and_other_files() {
    let dir = tempdir().unwrap();
    let store = PlaylistStore::new(dir.path());
    store.save(&Playlist::new("B list")).unwrap();
    store.save(&Playlist::new("A list")).unwrap();
    fs::write(dir.path().join("broken.json"), "42").unwrap();
    fs::write(dir.path().join("notes.txt"), "hi").unwrap();

    let names: Vec<String> = store
        .load_all()
        .iter()
        .map(|p| p.name().to_string())
        .collect();
    assert_eq!(names, vec!["A list", "B list"]);

    assert!(PlaylistStore::new(dir.path().join("missing")).load_all().is_empty());
}

#[test]
fn record_without_songs_field_loads_empty() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("Bare.json"), r#"{"name": "Bare"}"#).unwrap();
    let loaded = PlaylistStore::new(dir.path()).load("Bare").unwrap();
    assert_eq!(loaded.name(), "Bare");
    assert!(loaded.is_empty());
}

#[test]
fn delete_removes_record_once() {
    let dir = tempdir().unwrap();
    let store = PlaylistStore::new(dir.path());
    store.save(&Playlist::new("Temp")).unwrap();

    assert!(store.delete("Temp").unwrap());
    assert!(!store.delete("Temp").unwrap());
    assert!(!dir.path().join("Temp.json").exists());
}

#[test]
fn reloading_into_manager_merges_by_name() {
    let songs = tempdir().unwrap();
    let dir = tempdir().unwrap();
    let store = PlaylistStore::new(dir.path());
    let a = touch(songs.path(), "a.mp3");
    let b = touch(songs.path(), "b.mp3");

    let mut m = PlaylistManager::new();
    m.create("Mix").add(entry(&a, "A"));
    store.save(m.get("Mix").unwrap()).unwrap();

    m.create("Mix").add(entry(&b, "B"));
    store.save(m.get("Mix").unwrap()).unwrap();

    for playlist in store.load_all() {
        m.adopt(playlist);
    }
    assert_eq!(m.playlists().len(), 1);
    assert_eq!(m.get("Mix").unwrap().len(), 2);
}
