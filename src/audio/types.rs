//! Audio-related small types and handles.
//!
//! This module defines the commands accepted by the audio thread and the
//! playback snapshot it publishes for the UI.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug)]
pub enum AudioCmd {
    /// Stop whatever is loaded and start playing this file from the beginning.
    Play(PathBuf),
    /// Stop playback immediately.
    Stop,
    /// Pause when playing, resume when paused.
    TogglePause,
    /// Jump to an absolute position in the current track.
    SeekTo(Duration),
    /// Seek by the specified number of seconds (positive or negative).
    SeekBy(i64),
    /// Seek to a fraction (0.0..=1.0) of the current track's duration.
    SeekFraction(f32),
    /// Stop playback and end the audio thread.
    Quit,
}

/// Discrete playback state of the engine.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum PlaybackStatus {
    #[default]
    Idle,
    Playing,
    Paused,
}

impl PlaybackStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Playing => "playing",
            Self::Paused => "paused",
        }
    }
}

/// Runtime playback information shared with the UI.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaybackInfo {
    /// Increases every time a track is started, stopped or finishes.
    pub session: u64,
    pub status: PlaybackStatus,
    /// File being played, or the one that just finished.
    pub path: Option<PathBuf>,
    /// Position according to the manual clock.
    pub elapsed: Duration,
    pub duration: Option<Duration>,
    /// Set when the last track ran to its end.
    pub completed: bool,
    /// Last control failure worth showing to the user.
    pub error: Option<String>,
}

impl PlaybackInfo {
    pub fn remaining(&self) -> Option<Duration> {
        self.duration.map(|d| d.saturating_sub(self.elapsed))
    }

    /// Progress through the track in `0.0..=1.0`, or `None` when the length is unknown.
    pub fn fraction(&self) -> Option<f64> {
        let total = self.duration.filter(|d| !d.is_zero())?;
        Some((self.elapsed.as_secs_f64() / total.as_secs_f64()).min(1.0))
    }
}

pub type PlaybackHandle = Arc<Mutex<PlaybackInfo>>;
