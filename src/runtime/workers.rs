//! Background threads feeding the event loop.
//!
//! Library scans and tag reads can take a while on large song folders, and
//! background lookups read map files from disk; neither may block key handling.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use log::{debug, info};

use crate::background::BackgroundResolver;
use crate::config::{BackgroundSettings, LibrarySettings};
use crate::library::{ScanOutcome, scan_until};
use crate::metadata::{LoftyTagReader, SharedMetadataCache, lock_cache, resolve_metadata};

/// Progress of a scan request.
#[derive(Debug)]
pub enum ScanEvent {
    /// The folder walk ended.
    Listed { generation: u64, outcome: ScanOutcome },
    /// Tags have been read for every listed entry.
    Enriched { generation: u64, resolved: usize },
}

/// Runs library scans off the UI thread.
///
/// Every request gets a new generation number. A newer request supersedes
/// older ones: they stop walking, stop writing to the metadata cache and their
/// results are ignored.
pub struct LibraryScanner {
    latest: Arc<AtomicU64>,
    tx: Sender<ScanEvent>,
    settings: LibrarySettings,
    cache: SharedMetadataCache,
}

impl LibraryScanner {
    pub fn new(settings: LibrarySettings, cache: SharedMetadataCache) -> (Self, Receiver<ScanEvent>) {
        let (tx, rx) = mpsc::channel();
        let scanner = Self {
            latest: Arc::new(AtomicU64::new(0)),
            tx,
            settings,
            cache,
        };
        (scanner, rx)
    }

    /// Whether `generation` belongs to the most recent request.
    pub fn is_current(&self, generation: u64) -> bool {
        self.latest.load(Ordering::SeqCst) == generation
    }

    /// Start scanning `root`, superseding any scan in flight.
    pub fn request(&self, root: PathBuf) -> u64 {
        let generation = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        let latest = Arc::clone(&self.latest);
        let tx = self.tx.clone();
        let settings = self.settings.clone();
        let cache = Arc::clone(&self.cache);

        thread::spawn(move || {
            let superseded = || latest.load(Ordering::SeqCst) != generation;

            let outcome = scan_until(&root, &settings, superseded);
            let entries = outcome.entries().to_vec();
            if tx.send(ScanEvent::Listed { generation, outcome }).is_err() {
                return;
            }

            let mut resolved = 0;
            for entry in &entries {
                if superseded() {
                    debug!("tag reading for generation {generation} superseded");
                    return;
                }
                if lock_cache(&cache).is_resolved(entry.path()) {
                    continue;
                }
                let meta = resolve_metadata(entry.path(), &LoftyTagReader);
                lock_cache(&cache).insert(entry.path(), meta);
                resolved += 1;
            }

            info!("read tags of {resolved} new songs");
            let _ = tx.send(ScanEvent::Enriched {
                generation,
                resolved,
            });
        });

        generation
    }
}

/// Looks up background images one folder at a time.
///
/// Only the most recent pending request is served; selections skipped over
/// while scrolling are never resolved.
pub struct ArtworkLoader {
    tx: Sender<PathBuf>,
}

impl ArtworkLoader {
    pub fn spawn(settings: &BackgroundSettings) -> (Self, Receiver<(PathBuf, Option<PathBuf>)>) {
        let (req_tx, req_rx) = mpsc::channel::<PathBuf>();
        let (res_tx, res_rx) = mpsc::channel();
        let resolver = BackgroundResolver::new(settings);

        thread::spawn(move || {
            while let Ok(mut folder) = req_rx.recv() {
                while let Ok(newer) = req_rx.try_recv() {
                    folder = newer;
                }
                let image = resolver.resolve(&folder);
                debug!("background for {}: {:?}", folder.display(), image);
                if res_tx.send((folder, image)).is_err() {
                    break;
                }
            }
        });

        (Self { tx: req_tx }, res_rx)
    }

    pub fn request(&self, folder: PathBuf) {
        let _ = self.tx.send(folder);
    }
}
