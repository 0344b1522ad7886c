use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use crate::config::Settings;
use crate::error::BackendError;
use crate::metadata::{DurationProbe, SharedMetadataCache};

use super::backend::AudioBackend;
use super::rodio_backend::RodioBackend;
use super::thread::{ThreadSettings, spawn_audio_thread};
use super::types::{AudioCmd, PlaybackHandle, PlaybackInfo};

/// Handle to the audio thread.
pub struct AudioPlayer {
    tx: Sender<AudioCmd>,
    playback: PlaybackHandle,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl AudioPlayer {
    /// Start the audio thread on the default output device.
    pub fn new(settings: &Settings, cache: SharedMetadataCache) -> Self {
        Self::with_backend(RodioBackend::open_default, settings, cache)
    }

    /// Start the audio thread with a backend built by `open` on that thread.
    pub fn with_backend<B, F>(open: F, settings: &Settings, cache: SharedMetadataCache) -> Self
    where
        B: AudioBackend + DurationProbe,
        F: FnOnce() -> Result<B, BackendError> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<AudioCmd>();
        let playback: PlaybackHandle = Arc::new(Mutex::new(PlaybackInfo::default()));

        let join = spawn_audio_thread(
            open,
            rx,
            playback.clone(),
            cache,
            ThreadSettings {
                playback: settings.playback.clone(),
                metadata: settings.metadata.clone(),
            },
        );

        Self {
            tx,
            playback,
            join: Mutex::new(Some(join)),
        }
    }

    pub fn playback_handle(&self) -> PlaybackHandle {
        self.playback.clone()
    }

    /// Latest published playback snapshot.
    pub fn snapshot(&self) -> PlaybackInfo {
        self.playback
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn send(&self, cmd: AudioCmd) -> Result<(), mpsc::SendError<AudioCmd>> {
        self.tx.send(cmd)
    }

    /// Stop playback and wait for the audio thread to finish.
    pub fn quit(&self) {
        let _ = self.send(AudioCmd::Quit);

        if let Ok(mut j) = self.join.lock() {
            if let Some(h) = j.take() {
                let _ = h.join();
            }
        }
    }
}
