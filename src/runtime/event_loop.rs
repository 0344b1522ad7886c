use std::path::PathBuf;
use std::sync::mpsc::Receiver;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use log::{info, warn};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::{App, Focus, PlaySource};
use crate::audio::{AudioCmd, AudioPlayer};
use crate::config;
use crate::library::{LibraryEntry, ScanOutcome};
use crate::playlist::PlaylistStore;
use crate::ui;

use super::workers::{ArtworkLoader, LibraryScanner, ScanEvent};

/// State tracked by the runtime event loop across iterations.
pub struct EventLoopState {
    scanner: LibraryScanner,
    scan_rx: Receiver<ScanEvent>,
    artwork: ArtworkLoader,
    artwork_rx: Receiver<(PathBuf, Option<PathBuf>)>,
    store: PlaylistStore,
    /// Folder whose background was last asked for.
    requested_background: Option<PathBuf>,
    /// Playback session whose completion was already handled.
    handled_completion: Option<u64>,
}

impl EventLoopState {
    pub fn new(
        scanner: LibraryScanner,
        scan_rx: Receiver<ScanEvent>,
        artwork: ArtworkLoader,
        artwork_rx: Receiver<(PathBuf, Option<PathBuf>)>,
        store: PlaylistStore,
    ) -> Self {
        Self {
            scanner,
            scan_rx,
            artwork,
            artwork_rx,
            store,
            requested_background: None,
            handled_completion: None,
        }
    }
}

/// Main terminal event loop: handles input, UI drawing and the results of
/// background work. Returns `Ok(())` when shutdown is requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    audio_player: &AudioPlayer,
    state: &mut EventLoopState,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        drain_scan_events(app, state);

        while let Ok((folder, image)) = state.artwork_rx.try_recv() {
            app.set_background(folder, image);
        }
        if let Some(folder) = app.background_wanted() {
            if state.requested_background.as_deref() != Some(folder) {
                state.requested_background = Some(folder.to_path_buf());
                state.artwork.request(folder.to_path_buf());
            }
        }

        advance_playlist_on_completion(app, audio_player, state);

        terminal.draw(|f| ui::draw(f, app, settings.playback.scrub_seconds))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, settings, app, audio_player, state) {
                    break;
                }
            }
        }
    }

    Ok(())
}

fn drain_scan_events(app: &mut App, state: &EventLoopState) {
    while let Ok(event) = state.scan_rx.try_recv() {
        match event {
            ScanEvent::Listed { generation, outcome } if state.scanner.is_current(generation) => {
                match &outcome {
                    ScanOutcome::Cancelled => continue,
                    ScanOutcome::Complete(entries) => {
                        app.set_status(format!("{} songs", entries.len()));
                    }
                    ScanOutcome::RootMissing => {
                        app.scanning = false;
                        app.set_status(format!(
                            "songs folder not found: {}",
                            app.songs_dir.display()
                        ));
                    }
                }
                app.set_entries(outcome.into_entries());
            }
            ScanEvent::Enriched { generation, .. } if state.scanner.is_current(generation) => {
                app.scanning = false;
                app.refresh_view();
            }
            _ => {}
        }
    }
}

/// When a track started from the playlist runs out, continue with the next one.
fn advance_playlist_on_completion(app: &mut App, audio_player: &AudioPlayer, state: &mut EventLoopState) {
    let info = audio_player.snapshot();
    if !info.completed || state.handled_completion == Some(info.session) {
        return;
    }
    state.handled_completion = Some(info.session);

    if app.play_source != PlaySource::Playlist {
        return;
    }
    if let Some(song) = app.playlists.next_song().cloned() {
        app.playlist_selected = app.playlists.cursor();
        play(app, audio_player, &song, PlaySource::Playlist);
    }
}

fn play(app: &mut App, audio_player: &AudioPlayer, entry: &LibraryEntry, source: PlaySource) {
    app.play_source = source;
    app.set_status(format!("playing {}", entry.title()));
    let _ = audio_player.send(AudioCmd::Play(entry.path().to_path_buf()));
}

fn handle_filter_key(key: KeyEvent, app: &mut App) {
    match key.code {
        KeyCode::Esc => app.clear_filter(),
        KeyCode::Enter => app.exit_filter_mode(),
        KeyCode::Backspace => app.pop_filter_char(),
        KeyCode::Down => app.next(),
        KeyCode::Up => app.prev(),
        KeyCode::Char(c) if !c.is_control() => app.push_filter_char(c),
        _ => {}
    }
}

/// Handle one key press. Returns `true` when the app should quit.
fn handle_key_event(
    key: KeyEvent,
    settings: &config::Settings,
    app: &mut App,
    audio_player: &AudioPlayer,
    state: &mut EventLoopState,
) -> bool {
    if app.filter_mode {
        handle_filter_key(key, app);
        return false;
    }

    let scrub = settings.playback.scrub_seconds.min(i64::MAX as u64) as i64;

    match key.code {
        KeyCode::Char('q') => {
            audio_player.quit();
            return true;
        }
        KeyCode::Char('/') => app.enter_filter_mode(),
        KeyCode::Esc => app.clear_filter(),
        KeyCode::Tab => app.toggle_focus(),
        KeyCode::Char('j') | KeyCode::Down => match app.focus {
            Focus::Library => app.next(),
            Focus::Playlist => app.playlist_next(),
        },
        KeyCode::Char('k') | KeyCode::Up => match app.focus {
            Focus::Library => app.prev(),
            Focus::Playlist => app.playlist_prev(),
        },
        KeyCode::Enter => match app.focus {
            Focus::Library => {
                if let Some(entry) = app.selected_entry().cloned() {
                    play(app, audio_player, &entry, PlaySource::Library);
                }
            }
            Focus::Playlist => {
                let index = app.playlist_selected;
                if app.playlists.set_cursor(index) {
                    if let Some(song) = app.playlists.current_song().cloned() {
                        play(app, audio_player, &song, PlaySource::Playlist);
                    }
                }
            }
        },
        KeyCode::Char(' ') => {
            let _ = audio_player.send(AudioCmd::TogglePause);
        }
        KeyCode::Char('s') => {
            let _ = audio_player.send(AudioCmd::Stop);
        }
        KeyCode::Char('L') => {
            let _ = audio_player.send(AudioCmd::SeekBy(scrub));
        }
        KeyCode::Char('H') => {
            let _ = audio_player.send(AudioCmd::SeekBy(-scrub));
        }
        KeyCode::Char('0') => {
            // Works even when the track length is unknown.
            let _ = audio_player.send(AudioCmd::SeekTo(Duration::ZERO));
        }
        KeyCode::Char(c @ '1'..='9') => {
            let tenth = c.to_digit(10).unwrap_or(0) as f32 / 10.0;
            let _ = audio_player.send(AudioCmd::SeekFraction(tenth));
        }
        KeyCode::Char('a') => add_selected_to_playlist(app, settings),
        KeyCode::Char('d') => {
            if app.focus == Focus::Playlist {
                let index = app.playlist_selected;
                if let Some(removed) = app.playlists.remove_from_current(index) {
                    app.set_status(format!("removed {}", removed.title()));
                }
                app.clamp_playlist_selection();
            }
        }
        KeyCode::Char('D') => delete_current_playlist(app, state),
        KeyCode::Char('n') => {
            if let Some(song) = app.playlists.next_song().cloned() {
                app.playlist_selected = app.playlists.cursor();
                play(app, audio_player, &song, PlaySource::Playlist);
            }
        }
        KeyCode::Char('p') => {
            if let Some(song) = app.playlists.previous_song().cloned() {
                app.playlist_selected = app.playlists.cursor();
                play(app, audio_player, &song, PlaySource::Playlist);
            }
        }
        KeyCode::Char('x') => {
            if app.playlists.shuffle_current() {
                app.playlist_selected = 0;
                app.set_status("playlist shuffled");
            }
        }
        KeyCode::Char('C') => {
            if app.playlists.clear_current() {
                app.playlist_selected = 0;
                app.set_status("playlist cleared");
            }
        }
        KeyCode::Char('u') => reload_current_playlist(app, state),
        KeyCode::Char('w') => save_current_playlist(app, state),
        KeyCode::Char('c') => {
            if let Some(name) = app.cycle_playlist() {
                app.set_status(format!("playlist: {name}"));
            }
        }
        KeyCode::Char('r') => {
            app.scanning = true;
            app.set_status("rescanning…");
            state.scanner.request(app.songs_dir.clone());
        }
        _ => {}
    }

    false
}

fn add_selected_to_playlist(app: &mut App, settings: &config::Settings) {
    let Some(entry) = app.selected_entry().cloned() else {
        return;
    };
    if app.playlists.current_playlist().is_none() {
        app.playlists.create(&settings.playlists.default_name);
    }
    let Some(playlist) = app.playlists.current_playlist_mut() else {
        return;
    };
    let msg = if playlist.add(entry.clone()) {
        format!("added {} to {}", entry.title(), playlist.name())
    } else {
        format!("{} is already in {}", entry.title(), playlist.name())
    };
    app.set_status(msg);
}

fn save_current_playlist(app: &mut App, state: &EventLoopState) {
    let Some(playlist) = app.playlists.current_playlist() else {
        app.set_status("no playlist selected");
        return;
    };
    let msg = match state.store.save(playlist) {
        Ok(path) => format!("saved {}", path.display()),
        Err(e) => {
            warn!("{e}");
            format!("save failed: {e}")
        }
    };
    app.set_status(msg);
}

/// Throw away unsaved changes to the current playlist by reading it back from disk.
fn reload_current_playlist(app: &mut App, state: &EventLoopState) {
    let Some(name) = app.playlists.current_playlist().map(|p| p.name().to_string()) else {
        return;
    };
    match state.store.load(&name) {
        Ok(playlist) => {
            app.playlists.adopt(playlist);
            app.clamp_playlist_selection();
            app.set_status(format!("reloaded {name}"));
        }
        Err(e) => {
            warn!("{e}");
            app.set_status(format!("reload failed: {e}"));
        }
    }
}

fn delete_current_playlist(app: &mut App, state: &EventLoopState) {
    let Some(name) = app.playlists.current_playlist().map(|p| p.name().to_string()) else {
        return;
    };
    app.playlists.delete(&name);
    app.playlist_selected = 0;
    match state.store.delete(&name) {
        Ok(_) => {
            info!("deleted playlist {name}");
            app.set_status(format!("deleted playlist {name}"));
        }
        Err(e) => {
            warn!("{e}");
            app.set_status(format!("delete failed: {e}"));
        }
    }
}
