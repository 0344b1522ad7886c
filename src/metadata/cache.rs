use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

/// Tag fields known for one audio file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackMetadata {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub duration_secs: Option<u64>,
}

/// Path-keyed metadata store.
///
/// A duration, once recorded for a path, is never cleared or replaced.
#[derive(Debug, Default)]
pub struct MetadataCache {
    entries: HashMap<PathBuf, TrackMetadata>,
}

pub type SharedMetadataCache = Arc<Mutex<MetadataCache>>;

/// Lock a shared cache, recovering the data if a writer panicked.
pub fn lock_cache(cache: &Mutex<MetadataCache>) -> MutexGuard<'_, MetadataCache> {
    cache.lock().unwrap_or_else(|e| e.into_inner())
}

impl MetadataCache {
    pub fn get(&self, path: &Path) -> Option<&TrackMetadata> {
        self.entries.get(path)
    }

    /// Store freshly resolved tags for `path`, keeping any duration already known.
    pub fn insert(&mut self, path: &Path, mut meta: TrackMetadata) {
        if let Some(known) = self.duration(path) {
            meta.duration_secs = Some(known);
        }
        if meta.duration_secs == Some(0) {
            meta.duration_secs = None;
        }
        self.entries.insert(path.to_path_buf(), meta);
    }

    /// The cached, nonzero duration for `path`.
    pub fn duration(&self, path: &Path) -> Option<u64> {
        self.entries
            .get(path)
            .and_then(|m| m.duration_secs)
            .filter(|&d| d > 0)
    }

    /// Record a duration unless one is already known. Returns the value now cached.
    pub fn record_duration(&mut self, path: &Path, secs: u64) -> Option<u64> {
        if let Some(known) = self.duration(path) {
            return Some(known);
        }
        if secs == 0 {
            return None;
        }
        self.entries.entry(path.to_path_buf()).or_default().duration_secs = Some(secs);
        Some(secs)
    }

    /// Whether tags have been read for `path`. A duration on its own does not count.
    pub fn is_resolved(&self, path: &Path) -> bool {
        self.entries.get(path).is_some_and(|m| m.title.is_some())
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
