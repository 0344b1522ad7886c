//! The capability surface the playback engine expects from an audio output.
//!
//! Any single call may fail independently of the others. Backends return
//! [`BackendError::Unsupported`] for operations they cannot perform at all so
//! the engine can stop trying them.

use std::path::Path;
use std::time::Duration;

use crate::error::BackendError;

pub trait AudioBackend {
    /// Make `path` the current track without starting it.
    fn load(&mut self, path: &Path) -> Result<(), BackendError>;
    /// Start the loaded track from its beginning, or from a position set with
    /// [`AudioBackend::set_position`].
    fn play(&mut self) -> Result<(), BackendError>;
    /// Start the loaded track at `offset`.
    fn play_from(&mut self, offset: Duration) -> Result<(), BackendError>;
    fn pause(&mut self) -> Result<(), BackendError>;
    fn unpause(&mut self) -> Result<(), BackendError>;
    /// Move the play head of the loaded track.
    fn set_position(&mut self, position: Duration) -> Result<(), BackendError>;
    fn stop(&mut self) -> Result<(), BackendError>;
    /// Whether audio is still being produced. `false` after the track ran out.
    fn is_active(&self) -> bool;
    /// Position as the backend sees it. Known to reset after seeks on some backends.
    fn position(&self) -> Option<Duration>;
}

/// What the engine has learned about one optional backend operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Capability {
    #[default]
    Unknown,
    Supported,
    Unsupported,
}

impl Capability {
    /// Update from the result of trying the operation.
    ///
    /// Only an explicit `Unsupported` error marks the capability as missing;
    /// other failures may be transient and leave it untouched.
    pub fn record<T>(&mut self, result: &Result<T, BackendError>) {
        match result {
            Ok(_) => *self = Self::Supported,
            Err(e) if e.is_unsupported() => *self = Self::Unsupported,
            Err(_) => {}
        }
    }

    pub fn worth_trying(self) -> bool {
        self != Self::Unsupported
    }
}

/// Capability probes for the operations with known cross-backend gaps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub unpause: Capability,
    pub set_position: Capability,
    pub play_from: Capability,
}
