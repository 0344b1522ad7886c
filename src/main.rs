mod app;
mod audio;
mod background;
mod config;
mod error;
mod library;
mod metadata;
mod playlist;
mod runtime;
mod ui;

/// Log lines go to stderr and would tear through the TUI, so logging stays off
/// unless a level is named in `OSU_BROWSER_LOG` (redirect stderr to a file).
fn init_logging() {
    let Ok(level) = std::env::var("OSU_BROWSER_LOG") else {
        return;
    };
    let level = level.parse().unwrap_or(log::LevelFilter::Info);

    let mut clog = colog::default_builder();
    clog.filter(None, level);
    clog.init();

    std::panic::set_hook(Box::new(|panic_info| {
        let current_thread = std::thread::current();
        let thread_name = current_thread.name().unwrap_or("unnamed");
        log::error!("panic in thread '{}': {}", thread_name, panic_info);
    }));
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();
    runtime::run()
}
