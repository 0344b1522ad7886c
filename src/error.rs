//! Error types shared across the browser.
//!
//! Most lookups in this crate degrade to empty results instead of failing; the
//! enums here cover the places where a caller genuinely needs to know.

use std::path::PathBuf;

use thiserror::Error;

/// Failure of a single audio backend capability.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The backend does not implement this operation at all.
    #[error("{0} is not supported by this audio backend")]
    Unsupported(&'static str),
    #[error("audio output unavailable: {0}")]
    Device(String),
    /// Nothing has been loaded yet.
    #[error("no audio loaded")]
    NothingLoaded,
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode {path}: {reason}")]
    Decode { path: PathBuf, reason: String },
    #[error("seek failed: {0}")]
    Seek(String),
}

impl BackendError {
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported(_))
    }
}

#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("cannot {op} while {state}")]
    InvalidTransition {
        op: &'static str,
        state: &'static str,
    },
    #[error("failed to load {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: BackendError,
    },
    /// Every start/seek method was tried and none of them started playback.
    #[error("could not start playback of {path}: {source}")]
    StartFailed {
        path: PathBuf,
        #[source]
        source: BackendError,
    },
}

#[derive(Debug, Error)]
pub enum PlaylistError {
    #[error("playlist '{name}' not found at {path}")]
    NotFound { name: String, path: PathBuf },
    #[error("playlist I/O on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed playlist record {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Why the config could not be used.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to load config: {0}")]
    Load(#[from] ::config::ConfigError),
    #[error("invalid config: {key} {reason}")]
    Invalid {
        key: &'static str,
        reason: &'static str,
    },
}
