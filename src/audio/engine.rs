//! Playback position engine.
//!
//! Backends disagree on whether pause/resume and absolute seeking work, and
//! several report a bogus position right after a seek. The engine therefore
//! keeps its own clock: each session stores an `anchor` instant and the track
//! `offset` that corresponds to it, and elapsed time is always derived from
//! that pair rather than from the backend.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use log::{debug, error, warn};

use crate::error::{BackendError, PlaybackError};

use super::backend::{AudioBackend, Capabilities};
use super::clock::{Clock, SystemClock};
use super::types::{PlaybackInfo, PlaybackStatus};

/// How a seek ended up reaching the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekMethod {
    /// `set_position` followed by `play`.
    SetPosition,
    /// `play_from(offset)`.
    StartOffset,
    /// Plain `play` from the start; only the manual clock reflects the target.
    Restart,
}

/// A track that ran to its end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finished {
    pub path: PathBuf,
    /// Final position shown for the track: its full length when known.
    pub position: Duration,
    pub duration: Option<Duration>,
}

#[derive(Debug)]
struct Session {
    path: PathBuf,
    duration: Option<Duration>,
    anchor: Instant,
    offset: Duration,
    paused_at: Option<Instant>,
}

impl Session {
    fn elapsed(&self, now: Instant) -> Duration {
        let until = self.paused_at.unwrap_or(now);
        self.offset + until.saturating_duration_since(self.anchor)
    }

    fn restart_clock(&mut self, now: Instant, offset: Duration) {
        self.anchor = now;
        self.offset = offset;
        self.paused_at = None;
    }
}

pub struct PlaybackEngine<B, C = SystemClock> {
    backend: B,
    clock: C,
    caps: Capabilities,
    session: Option<Session>,
    finished: Option<Finished>,
    generation: u64,
}

impl<B: AudioBackend> PlaybackEngine<B> {
    pub fn new(backend: B) -> Self {
        Self::with_clock(backend, SystemClock)
    }
}

impl<B: AudioBackend, C: Clock> PlaybackEngine<B, C> {
    pub fn with_clock(backend: B, clock: C) -> Self {
        Self {
            backend,
            clock,
            caps: Capabilities::default(),
            session: None,
            finished: None,
            generation: 0,
        }
    }

    #[cfg(test)]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn capabilities(&self) -> Capabilities {
        self.caps
    }

    /// Identifies the current track session; changes on play, stop and completion.
    pub fn session_id(&self) -> u64 {
        self.generation
    }

    pub fn status(&self) -> PlaybackStatus {
        match &self.session {
            None => PlaybackStatus::Idle,
            Some(s) if s.paused_at.is_some() => PlaybackStatus::Paused,
            Some(_) => PlaybackStatus::Playing,
        }
    }

    pub fn current_path(&self) -> Option<&Path> {
        self.session.as_ref().map(|s| s.path.as_path())
    }

    pub fn duration(&self) -> Option<Duration> {
        self.session.as_ref().and_then(|s| s.duration)
    }

    /// Attach a length learned after playback started.
    pub fn set_duration(&mut self, duration: Duration) {
        if let Some(s) = self.session.as_mut() {
            s.duration = Some(duration).filter(|d| !d.is_zero());
        }
    }

    /// Position according to the manual clock; zero when idle.
    pub fn elapsed(&self) -> Duration {
        let now = self.clock.now();
        self.session
            .as_ref()
            .map_or(Duration::ZERO, |s| s.elapsed(now))
    }

    /// Load `path` and start it from the beginning, replacing any current track.
    pub fn play(&mut self, path: &Path, duration: Option<Duration>) -> Result<(), PlaybackError> {
        self.halt_backend();
        self.session = None;
        self.finished = None;
        self.generation += 1;

        self.backend
            .load(path)
            .map_err(|source| PlaybackError::Load {
                path: path.to_path_buf(),
                source,
            })?;

        if let Err(source) = self.backend.play() {
            error!("could not start {}: {source}", path.display());
            return Err(PlaybackError::StartFailed {
                path: path.to_path_buf(),
                source,
            });
        }

        self.session = Some(Session {
            path: path.to_path_buf(),
            duration: duration.filter(|d| !d.is_zero()),
            anchor: self.clock.now(),
            offset: Duration::ZERO,
            paused_at: None,
        });
        Ok(())
    }

    /// Freeze the clock. The backend pause is attempted but not required.
    pub fn pause(&mut self) -> Result<(), PlaybackError> {
        self.require(PlaybackStatus::Playing, "pause")?;

        if let Err(e) = self.backend.pause() {
            debug!("backend pause failed, relying on manual clock: {e}");
        }
        let now = self.clock.now();
        if let Some(s) = self.session.as_mut() {
            s.paused_at = Some(now);
        }
        Ok(())
    }

    /// Continue from the frozen position.
    ///
    /// When the backend cannot unpause, playback is restarted at the frozen
    /// position through the seek fallbacks instead.
    pub fn resume(&mut self) -> Result<(), PlaybackError> {
        self.require(PlaybackStatus::Paused, "resume")?;

        let unpaused = if self.caps.unpause.worth_trying() {
            let result = self.backend.unpause();
            self.caps.unpause.record(&result);
            if let Err(e) = &result {
                debug!("backend unpause failed: {e}");
            }
            result.is_ok()
        } else {
            false
        };

        if unpaused {
            let now = self.clock.now();
            if let Some(s) = self.session.as_mut() {
                if let Some(paused_at) = s.paused_at.take() {
                    s.anchor += now.saturating_duration_since(paused_at);
                }
            }
            return Ok(());
        }

        let frozen = self.elapsed();
        self.seek(frozen).map(|_| ())
    }

    /// Stop playback and forget the current track.
    pub fn stop(&mut self) {
        self.halt_backend();
        self.session = None;
        self.finished = None;
        self.generation += 1;
    }

    /// Jump to `target`, clamped to the track length when known.
    ///
    /// Tries `set_position` + `play`, then `play_from`, then a plain restart.
    /// The manual clock is set to the target whichever of these worked. If none
    /// did, the engine goes idle and the error is returned.
    pub fn seek(&mut self, target: Duration) -> Result<SeekMethod, PlaybackError> {
        let (path, duration) = match &self.session {
            Some(s) => (s.path.clone(), s.duration),
            None => {
                return Err(PlaybackError::InvalidTransition {
                    op: "seek",
                    state: PlaybackStatus::Idle.label(),
                });
            }
        };
        let target = duration.map_or(target, |d| target.min(d));

        self.halt_backend();

        let method = match self.start_at(target) {
            Ok(method) => method,
            Err(source) => {
                error!("every seek method failed for {}: {source}", path.display());
                self.session = None;
                self.generation += 1;
                return Err(PlaybackError::StartFailed { path, source });
            }
        };

        debug!(
            "seek to {:?} via {method:?}; backend reports {:?}",
            target,
            self.backend.position()
        );
        let now = self.clock.now();
        if let Some(s) = self.session.as_mut() {
            s.restart_clock(now, target);
        }
        Ok(method)
    }

    /// Detect natural end of track. Returns the finished track once.
    ///
    /// The backend going inactive while paused is not treated as completion.
    pub fn tick(&mut self) -> Option<Finished> {
        if self.status() != PlaybackStatus::Playing || self.backend.is_active() {
            return None;
        }

        let now = self.clock.now();
        let session = self.session.take()?;
        let finished = Finished {
            position: session.duration.unwrap_or_else(|| session.elapsed(now)),
            duration: session.duration,
            path: session.path,
        };
        self.generation += 1;
        self.finished = Some(finished.clone());
        Some(finished)
    }

    /// Snapshot for display. After a natural completion the final position
    /// stays at the track length until the next play or stop.
    pub fn info(&self) -> PlaybackInfo {
        let now = self.clock.now();
        match (&self.session, &self.finished) {
            (Some(s), _) => PlaybackInfo {
                session: self.generation,
                status: self.status(),
                path: Some(s.path.clone()),
                elapsed: s.elapsed(now),
                duration: s.duration,
                completed: false,
                error: None,
            },
            (None, Some(f)) => PlaybackInfo {
                session: self.generation,
                status: PlaybackStatus::Idle,
                path: Some(f.path.clone()),
                elapsed: f.position,
                duration: f.duration,
                completed: true,
                error: None,
            },
            (None, None) => PlaybackInfo {
                session: self.generation,
                ..PlaybackInfo::default()
            },
        }
    }

    fn start_at(&mut self, target: Duration) -> Result<SeekMethod, BackendError> {
        if self.caps.set_position.worth_trying() {
            let set = self.backend.set_position(target);
            self.caps.set_position.record(&set);
            match set {
                Ok(()) => match self.backend.play() {
                    Ok(()) => return Ok(SeekMethod::SetPosition),
                    Err(e) => debug!("play after set_position failed: {e}"),
                },
                Err(e) => debug!("set_position unavailable: {e}"),
            }
        }

        if self.caps.play_from.worth_trying() {
            let started = self.backend.play_from(target);
            self.caps.play_from.record(&started);
            match started {
                Ok(()) => return Ok(SeekMethod::StartOffset),
                Err(e) => debug!("play_from unavailable: {e}"),
            }
        }

        warn!("no seek support, restarting track from the beginning");
        self.backend.play().map(|()| SeekMethod::Restart)
    }

    fn halt_backend(&mut self) {
        if let Err(e) = self.backend.stop() {
            debug!("backend stop failed: {e}");
        }
    }

    fn require(&self, wanted: PlaybackStatus, op: &'static str) -> Result<(), PlaybackError> {
        let state = self.status();
        if state == wanted {
            Ok(())
        } else {
            Err(PlaybackError::InvalidTransition {
                op,
                state: state.label(),
            })
        }
    }
}
