use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use log::debug;

use crate::library::strip_leading_numeric_prefix;

use super::cache::{MetadataCache, TrackMetadata, lock_cache};
use super::tags::{ALBUM_FRAME, ARTIST_FRAME, TITLE_FRAME, TagReader};

/// Something that can learn a file's length by decoding it.
///
/// Implementations are expected to be slow; callers only reach for this after
/// the tags came up empty.
pub trait DurationProbe {
    fn probe_length(&mut self, path: &Path) -> Option<Duration>;
}

/// Resolve tag metadata for `path`.
///
/// Friendly tags first, then raw ID3v2 frames for whatever is still missing,
/// then the file name (numeric prefix stripped) for the title. Never fails; the
/// title is always set.
pub fn resolve_metadata(path: &Path, reader: &dyn TagReader) -> TrackMetadata {
    let mut meta = TrackMetadata::default();

    if let Some(tags) = reader.friendly(path) {
        meta.title = tags.title;
        meta.artist = tags.artist;
        meta.album = tags.album;
        meta.duration_secs = tags.length.map(|d| d.as_secs()).filter(|&s| s > 0);
    }

    if meta.title.is_none() || meta.artist.is_none() || meta.album.is_none() {
        if let Some(mut frames) = reader.raw_frames(path) {
            let mut take = |slot: &mut Option<String>, id: &str| {
                if slot.is_none() {
                    *slot = frames.remove(id).filter(|v| !v.trim().is_empty());
                }
            };
            take(&mut meta.title, TITLE_FRAME);
            take(&mut meta.artist, ARTIST_FRAME);
            take(&mut meta.album, ALBUM_FRAME);
        }
    }

    if meta.title.is_none() {
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("UNKNOWN");
        meta.title = Some(strip_leading_numeric_prefix(stem).to_string());
    }

    meta
}

/// Return the duration of `path` in whole seconds, or 0 when it cannot be learned.
///
/// Uses the cached value when present. Otherwise tries the tag stream info and,
/// when `probe` is given, a full decode. The first nonzero result is cached; a
/// total failure caches nothing. The cache lock is not held while reading files.
pub fn ensure_duration(
    path: &Path,
    cache: &Mutex<MetadataCache>,
    reader: &dyn TagReader,
    probe: Option<&mut dyn DurationProbe>,
) -> u64 {
    if let Some(known) = lock_cache(cache).duration(path) {
        return known;
    }

    let from_tags = reader
        .friendly(path)
        .and_then(|t| t.length)
        .map(|d| d.as_secs())
        .filter(|&s| s > 0);

    let secs = match from_tags {
        Some(secs) => Some(secs),
        None => probe.and_then(|p| {
            debug!("decoding {} to learn its length", path.display());
            p.probe_length(path)
                .map(|d| d.as_secs())
                .filter(|&s| s > 0)
        }),
    };

    match secs {
        Some(secs) => lock_cache(cache).record_duration(path, secs).unwrap_or(secs),
        None => 0,
    }
}
