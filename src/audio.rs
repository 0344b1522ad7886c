//! Audio playback.
//!
//! A dedicated thread owns the output device and a playback engine. The UI
//! talks to it through [`AudioCmd`] messages and reads the shared
//! [`PlaybackInfo`] snapshot the thread refreshes while a track plays.

mod backend;
mod clock;
mod engine;
mod player;
mod poller;
mod rodio_backend;
mod thread;
mod types;

pub use player::AudioPlayer;
pub use types::{AudioCmd, PlaybackHandle, PlaybackInfo, PlaybackStatus};
