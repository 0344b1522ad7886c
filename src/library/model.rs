use std::path::{Path, PathBuf};

use super::title::strip_leading_numeric_prefix;

/// One playable file and the title shown for it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LibraryEntry {
    path: PathBuf,
    title: String,
}

impl LibraryEntry {
    pub fn new(path: impl Into<PathBuf>, title: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            title: title.into(),
        }
    }

    /// Build an entry titled after the file's parent folder.
    pub fn from_audio_file(path: &Path) -> Self {
        let title = path
            .parent()
            .and_then(Path::file_name)
            .or_else(|| path.file_stem())
            .and_then(|s| s.to_str())
            .map(strip_leading_numeric_prefix)
            .unwrap_or("UNKNOWN")
            .to_string();
        Self::new(path, title)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// The song package folder this file lives in.
    pub fn folder(&self) -> Option<&Path> {
        self.path.parent()
    }
}
