//! Tag metadata for library entries.
//!
//! Lookups are best-effort: the resolver always produces a title (falling back
//! to the file name) and leaves the other fields empty when tags are missing or
//! unreadable. Results are kept in a [`MetadataCache`] keyed by file path.

mod cache;
mod id3;
mod resolve;
mod tags;

pub use cache::{MetadataCache, SharedMetadataCache, TrackMetadata, lock_cache};
pub use resolve::{DurationProbe, ensure_duration, resolve_metadata};
pub use tags::LoftyTagReader;
