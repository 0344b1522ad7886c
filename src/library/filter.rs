use crate::metadata::MetadataCache;

use super::model::LibraryEntry;

/// Indices of `entries` matching `query`.
///
/// A case-insensitive substring match against the folder title and, when
/// cached, the tag title and artist. An empty query matches everything.
pub fn filter_indices(entries: &[LibraryEntry], cache: &MetadataCache, query: &str) -> Vec<usize> {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return (0..entries.len()).collect();
    }

    entries
        .iter()
        .enumerate()
        .filter(|(_, entry)| {
            if entry.title().to_lowercase().contains(&q) {
                return true;
            }
            cache.get(entry.path()).is_some_and(|meta| {
                [meta.title.as_deref(), meta.artist.as_deref()]
                    .into_iter()
                    .flatten()
                    .any(|s| s.to_lowercase().contains(&q))
            })
        })
        .map(|(i, _)| i)
        .collect()
}
