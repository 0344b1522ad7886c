use std::path::Path;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, error, info, warn};

use crate::config::{MetadataSettings, PlaybackSettings};
use crate::error::{BackendError, PlaybackError};
use crate::metadata::{DurationProbe, LoftyTagReader, SharedMetadataCache, ensure_duration};

use super::backend::AudioBackend;
use super::engine::PlaybackEngine;
use super::poller::ProgressPoller;
use super::types::{AudioCmd, PlaybackHandle, PlaybackInfo, PlaybackStatus};

/// Upper bound on how long the loop sleeps when no refresh is scheduled.
const IDLE_WAIT: Duration = Duration::from_millis(200);

pub(super) struct ThreadSettings {
    pub playback: PlaybackSettings,
    pub metadata: MetadataSettings,
}

/// Spawn the thread owning the audio backend.
///
/// The backend is created inside the thread by `open`, so it never has to
/// cross threads. If opening fails the error is published and every command
/// other than `Quit` is ignored.
pub(super) fn spawn_audio_thread<B, F>(
    open: F,
    rx: Receiver<AudioCmd>,
    playback: PlaybackHandle,
    cache: SharedMetadataCache,
    settings: ThreadSettings,
) -> JoinHandle<()>
where
    B: AudioBackend + DurationProbe,
    F: FnOnce() -> Result<B, BackendError> + Send + 'static,
{
    thread::spawn(move || {
        let backend = match open() {
            Ok(b) => b,
            Err(e) => {
                error!("audio disabled: {e}");
                publish(
                    &playback,
                    PlaybackInfo {
                        error: Some(e.to_string()),
                        ..PlaybackInfo::default()
                    },
                );
                drain_until_quit(&rx);
                return;
            }
        };

        let mut worker = AudioWorker {
            engine: PlaybackEngine::new(backend),
            poller: ProgressPoller::new(Duration::from_millis(settings.playback.poll_interval_ms)),
            playback,
            cache,
            allow_probe: settings.metadata.allow_expensive_duration_probe,
            last_error: None,
        };
        worker.run(&rx);
    })
}

fn drain_until_quit(rx: &Receiver<AudioCmd>) {
    while let Ok(cmd) = rx.recv() {
        if matches!(cmd, AudioCmd::Quit) {
            break;
        }
    }
}

fn publish(handle: &PlaybackHandle, info: PlaybackInfo) {
    let mut shared = handle.lock().unwrap_or_else(|e| e.into_inner());
    *shared = info;
}

struct AudioWorker<B> {
    engine: PlaybackEngine<B>,
    poller: ProgressPoller,
    playback: PlaybackHandle,
    cache: SharedMetadataCache,
    allow_probe: bool,
    last_error: Option<String>,
}

impl<B: AudioBackend + DurationProbe> AudioWorker<B> {
    fn run(&mut self, rx: &Receiver<AudioCmd>) {
        loop {
            let wait = self
                .poller
                .wait_hint(Instant::now())
                .map_or(IDLE_WAIT, |w| w.min(IDLE_WAIT));

            match rx.recv_timeout(wait) {
                Ok(AudioCmd::Quit) => {
                    self.engine.stop();
                    self.poller.cancel();
                    self.refresh();
                    break;
                }
                Ok(cmd) => {
                    self.handle(cmd);
                    self.refresh();
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    self.engine.stop();
                    break;
                }
            }

            if let Some(done) = self.engine.tick() {
                info!("finished {}", done.path.display());
                self.poller.cancel();
                self.refresh();
            }

            if self.poller.due(self.engine.session_id(), Instant::now()) {
                self.refresh();
            }
        }
        debug!("audio thread exiting, capabilities: {:?}", self.engine.capabilities());
    }

    fn handle(&mut self, cmd: AudioCmd) {
        match cmd {
            AudioCmd::Play(path) => self.play(&path),
            AudioCmd::Stop => {
                self.engine.stop();
                self.poller.cancel();
            }
            AudioCmd::TogglePause => {
                let result = match self.engine.status() {
                    PlaybackStatus::Playing => self.engine.pause(),
                    PlaybackStatus::Paused => self.engine.resume(),
                    PlaybackStatus::Idle => return,
                };
                self.report(result);
            }
            AudioCmd::SeekTo(target) => self.seek(target),
            AudioCmd::SeekBy(secs) => {
                if self.engine.status() == PlaybackStatus::Idle {
                    return;
                }
                let current = self.engine.elapsed();
                let delta = Duration::from_secs(secs.unsigned_abs());
                let target = if secs < 0 {
                    current.saturating_sub(delta)
                } else {
                    current + delta
                };
                self.seek(target);
            }
            AudioCmd::SeekFraction(fraction) => {
                let Some(total) = self.engine.duration() else {
                    debug!("fraction seek ignored, track length unknown");
                    return;
                };
                self.seek(total.mul_f32(fraction.clamp(0.0, 1.0)));
            }
            AudioCmd::Quit => {}
        }
    }

    fn play(&mut self, path: &Path) {
        self.poller.cancel();

        let known = ensure_duration(path, &self.cache, &LoftyTagReader, None);
        let known = Some(Duration::from_secs(known)).filter(|d| !d.is_zero());

        if let Err(e) = self.engine.play(path, known) {
            self.report::<()>(Err(e));
            return;
        }
        self.last_error = None;
        info!("playing {}", path.display());

        if known.is_none() && self.allow_probe {
            let secs = ensure_duration(
                path,
                &self.cache,
                &LoftyTagReader,
                Some(self.engine.backend_mut()),
            );
            if secs > 0 {
                self.engine.set_duration(Duration::from_secs(secs));
            }
        }

        self.poller.arm(self.engine.session_id(), Instant::now());
    }

    fn seek(&mut self, target: Duration) {
        let result = self.engine.seek(target).map(|method| {
            debug!("seeked to {target:?} using {method:?}");
        });
        let failed = result.is_err();
        self.report(result);
        if failed {
            self.poller.cancel();
        } else if !self.poller.is_armed() {
            self.poller.arm(self.engine.session_id(), Instant::now());
        }
    }

    fn report<T>(&mut self, result: Result<T, PlaybackError>) {
        if let Err(e) = result {
            warn!("{e}");
            self.last_error = Some(e.to_string());
        }
    }

    fn refresh(&self) {
        let mut info = self.engine.info();
        info.error = self.last_error.clone();
        publish(&self.playback, info);
    }
}
