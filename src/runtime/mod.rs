use std::env;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use log::info;
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::App;
use crate::audio::AudioPlayer;
use crate::metadata::MetadataCache;
use crate::playlist::PlaylistStore;

mod event_loop;
mod settings;
mod workers;

use workers::{ArtworkLoader, LibraryScanner};

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings = settings::load_settings();

    let songs_dir = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| settings.library.resolved_songs_dir());
    info!("songs folder: {}", songs_dir.display());

    let cache = Arc::new(Mutex::new(MetadataCache::default()));
    let audio_player = AudioPlayer::new(&settings, cache.clone());
    let mut app = App::new(songs_dir.clone(), cache.clone());
    app.set_playback_handle(audio_player.playback_handle());

    let store = PlaylistStore::new(settings.playlists.resolved_dir());
    info!("playlists folder: {}", store.dir().display());
    for playlist in store.load_all() {
        app.playlists.adopt(playlist);
    }

    let (scanner, scan_rx) = LibraryScanner::new(settings.library.clone(), cache);
    let (artwork, artwork_rx) = ArtworkLoader::spawn(&settings.background);
    app.scanning = true;
    scanner.request(songs_dir);

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result: Result<(), Box<dyn std::error::Error>> = (|| {
        let mut state = event_loop::EventLoopState::new(scanner, scan_rx, artwork, artwork_rx, store);
        event_loop::run(&mut terminal, &settings, &mut app, &audio_player, &mut state)
    })();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    run_result
}
