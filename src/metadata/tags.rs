use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use lofty::file::{AudioFile, TaggedFileExt};
use lofty::tag::{ItemKey, Tag};
use log::debug;

use super::id3::read_text_frames;

/// ID3v2 frame id for the track title.
pub const TITLE_FRAME: &str = "TIT2";
/// ID3v2 frame id for the lead artist.
pub const ARTIST_FRAME: &str = "TPE1";
/// ID3v2 frame id for the album.
pub const ALBUM_FRAME: &str = "TALB";

/// The normalized, cross-format view of a file's tags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FriendlyTags {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    /// Stream length from the audio properties, if the container reports one.
    pub length: Option<Duration>,
}

/// Text frames keyed by their ID3v2 identifier (`TIT2`, `TPE1`, ...).
pub type RawFrames = HashMap<String, String>;

/// Read access to audio tags. `None` means the file could not be read at all.
pub trait TagReader: Send + Sync {
    fn friendly(&self, path: &Path) -> Option<FriendlyTags>;
    fn raw_frames(&self, path: &Path) -> Option<RawFrames>;
}

/// [`TagReader`] backed by `lofty` for the friendly view and a direct ID3v2
/// frame walk for the raw one.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoftyTagReader;

impl TagReader for LoftyTagReader {
    fn friendly(&self, path: &Path) -> Option<FriendlyTags> {
        let tagged = match lofty::read_from_path(path) {
            Ok(t) => t,
            Err(e) => {
                debug!("no tags for {}: {e}", path.display());
                return None;
            }
        };

        let length = Some(tagged.properties().duration()).filter(|d| !d.is_zero());
        let tag = tagged.primary_tag().or_else(|| tagged.first_tag());
        let text = |key: ItemKey| tag.and_then(|t| non_empty(t, key));

        Some(FriendlyTags {
            title: text(ItemKey::TrackTitle),
            artist: text(ItemKey::TrackArtist),
            album: text(ItemKey::AlbumTitle),
            length,
        })
    }

    fn raw_frames(&self, path: &Path) -> Option<RawFrames> {
        read_text_frames(path)
    }
}

fn non_empty(tag: &Tag, key: ItemKey) -> Option<String> {
    tag.get_string(key)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}
