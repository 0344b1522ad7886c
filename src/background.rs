//! Background artwork lookup for song package folders.
//!
//! A package folder holds one or more `.osu` map files. The first one (by
//! name) is read and its `[Events]` section searched for an image event:
//!
//! ```text
//! [Events]
//! //Background and Video events
//! Video,0,"intro.avi"
//! 0,0,"bg.jpg",0,0
//! [TimingPoints]
//! ```
//!
//! Every failure along the way (no map file, unreadable file, missing image)
//! yields `None`.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::SystemTime;

use log::debug;

use crate::config::BackgroundSettings;

/// Extension of map-description files.
pub const MAP_EXTENSION: &str = "osu";

const EVENTS_HEADER: &str = "[Events]";
const VIDEO_PREFIX: &str = "Video,";

/// The first `.osu` file in `folder`, by file name.
pub fn find_map_file(folder: &Path) -> Option<PathBuf> {
    let mut maps: Vec<PathBuf> = fs::read_dir(folder)
        .ok()?
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case(MAP_EXTENSION))
        })
        .collect();
    maps.sort();
    maps.into_iter().next()
}

/// File names referenced by event lines of the first `[Events]` section, in order.
///
/// Video events are skipped. Scanning stops at the next section header.
pub fn event_media_candidates(text: &str) -> Vec<&str> {
    let mut in_events = false;
    let mut out = Vec::new();

    for line in text.lines().map(str::trim) {
        if line.is_empty() {
            continue;
        }
        if !in_events {
            in_events = line.starts_with(EVENTS_HEADER);
            continue;
        }
        if line.starts_with('[') {
            break;
        }
        if line.starts_with(VIDEO_PREFIX) {
            continue;
        }
        if let Some(field) = line.split(',').nth(2) {
            let name = field.trim().trim_matches('"').trim();
            if !name.is_empty() {
                out.push(name);
            }
        }
    }

    out
}

/// Resolve the background image of `folder` using the given extensions (without dot).
pub fn resolve_background(folder: &Path, image_extensions: &[String]) -> Option<PathBuf> {
    let map = find_map_file(folder)?;
    background_from_map(folder, &map, image_extensions)
}

fn background_from_map(folder: &Path, map: &Path, image_extensions: &[String]) -> Option<PathBuf> {
    let bytes = match fs::read(map) {
        Ok(b) => b,
        Err(e) => {
            debug!("cannot read {}: {e}", map.display());
            return None;
        }
    };
    // Undecodable bytes are dropped rather than failing the whole file.
    let text = String::from_utf8_lossy(&bytes).replace(char::REPLACEMENT_CHARACTER, "");

    event_media_candidates(&text)
        .into_iter()
        .map(|name| folder.join(name))
        .find(|path| path.is_file() && has_image_extension(path, image_extensions))
}

fn has_image_extension(path: &Path, image_extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            image_extensions
                .iter()
                .any(|allowed| allowed.trim_start_matches('.').eq_ignore_ascii_case(ext))
        })
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Stamp {
    modified: Option<SystemTime>,
    len: u64,
}

impl Stamp {
    fn of(path: &Path) -> Option<Self> {
        let meta = fs::metadata(path).ok()?;
        Some(Self {
            modified: meta.modified().ok(),
            len: meta.len(),
        })
    }
}

#[derive(Debug, Clone)]
struct CachedBackground {
    folder: Option<Stamp>,
    map: Option<(PathBuf, Option<Stamp>)>,
    image: Option<PathBuf>,
}

/// Background lookup with an optional per-folder cache.
///
/// A cached answer is only reused while the folder listing and the chosen map
/// file are unchanged (same modification time and size).
#[derive(Debug)]
pub struct BackgroundResolver {
    image_extensions: Vec<String>,
    cache: Option<Mutex<HashMap<PathBuf, CachedBackground>>>,
}

impl BackgroundResolver {
    pub fn new(settings: &BackgroundSettings) -> Self {
        Self {
            image_extensions: settings.image_extensions.clone(),
            cache: settings.cache.then(|| Mutex::new(HashMap::new())),
        }
    }

    pub fn resolve(&self, folder: &Path) -> Option<PathBuf> {
        let Some(cache) = &self.cache else {
            return resolve_background(folder, &self.image_extensions);
        };

        let folder_stamp = Stamp::of(folder);
        {
            let cache = cache.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(hit) = cache.get(folder) {
                let map_unchanged = match &hit.map {
                    Some((map, stamp)) => Stamp::of(map) == *stamp,
                    None => true,
                };
                if hit.folder == folder_stamp && map_unchanged {
                    return hit.image.clone();
                }
            }
        }

        let map = find_map_file(folder);
        let image = map
            .as_deref()
            .and_then(|m| background_from_map(folder, m, &self.image_extensions));
        let entry = CachedBackground {
            folder: folder_stamp,
            map: map.map(|m| {
                let stamp = Stamp::of(&m);
                (m, stamp)
            }),
            image: image.clone(),
        };
        cache
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(folder.to_path_buf(), entry);
        image
    }
}
