//! [`AudioBackend`] on top of `rodio`.
//!
//! A fresh `Sink` is built for every start so stopping never leaves a drained
//! sink behind. Absolute seeking goes through `Sink::try_seek`, which some
//! decoders refuse; starting at an offset falls back to `skip_duration`.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::debug;
use rodio::source::SeekError;
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};

use crate::error::BackendError;
use crate::metadata::DurationProbe;

use super::backend::AudioBackend;

pub struct RodioBackend {
    stream: OutputStream,
    sink: Option<Sink>,
    loaded: Option<PathBuf>,
}

impl RodioBackend {
    pub fn open_default() -> Result<Self, BackendError> {
        let mut stream = OutputStreamBuilder::open_default_stream()
            .map_err(|e| BackendError::Device(e.to_string()))?;
        // rodio logs to stderr when the stream is dropped, which garbles the TUI.
        stream.log_on_drop(false);
        Ok(Self {
            stream,
            sink: None,
            loaded: None,
        })
    }

    fn loaded(&self) -> Result<&Path, BackendError> {
        self.loaded.as_deref().ok_or(BackendError::NothingLoaded)
    }

    /// Paused sink for the loaded file, starting `skip` into it.
    fn build_sink(&self, skip: Duration) -> Result<Sink, BackendError> {
        let source = decode(self.loaded()?)?.skip_duration(skip);
        let sink = Sink::connect_new(self.stream.mixer());
        sink.append(source);
        sink.pause();
        Ok(sink)
    }

    fn replace_sink(&mut self, sink: Sink) {
        if let Some(old) = self.sink.replace(sink) {
            old.stop();
        }
    }
}

fn decode(path: &Path) -> Result<Decoder<BufReader<File>>, BackendError> {
    let file = File::open(path).map_err(|source| BackendError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    Decoder::new(BufReader::new(file)).map_err(|e| BackendError::Decode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

impl AudioBackend for RodioBackend {
    fn load(&mut self, path: &Path) -> Result<(), BackendError> {
        // Decode once up front so a broken file fails here and not mid-play.
        decode(path)?;
        self.stop()?;
        self.loaded = Some(path.to_path_buf());
        Ok(())
    }

    fn play(&mut self) -> Result<(), BackendError> {
        match &self.sink {
            Some(sink) if !sink.empty() => sink.play(),
            _ => {
                let sink = self.build_sink(Duration::ZERO)?;
                sink.play();
                self.replace_sink(sink);
            }
        }
        Ok(())
    }

    fn play_from(&mut self, offset: Duration) -> Result<(), BackendError> {
        let sink = self.build_sink(offset)?;
        sink.play();
        self.replace_sink(sink);
        Ok(())
    }

    fn pause(&mut self) -> Result<(), BackendError> {
        let sink = self.sink.as_ref().ok_or(BackendError::NothingLoaded)?;
        sink.pause();
        Ok(())
    }

    fn unpause(&mut self) -> Result<(), BackendError> {
        match &self.sink {
            Some(sink) if !sink.empty() => {
                sink.play();
                Ok(())
            }
            _ => Err(BackendError::NothingLoaded),
        }
    }

    fn set_position(&mut self, position: Duration) -> Result<(), BackendError> {
        if self.sink.as_ref().is_none_or(Sink::empty) {
            let sink = self.build_sink(Duration::ZERO)?;
            self.replace_sink(sink);
        }
        let sink = self.sink.as_ref().ok_or(BackendError::NothingLoaded)?;
        match sink.try_seek(position) {
            Ok(()) => Ok(()),
            Err(SeekError::NotSupported { .. }) => {
                Err(BackendError::Unsupported("absolute seek"))
            }
            Err(e) => Err(BackendError::Seek(e.to_string())),
        }
    }

    fn stop(&mut self) -> Result<(), BackendError> {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.sink.as_ref().is_some_and(|s| !s.empty())
    }

    fn position(&self) -> Option<Duration> {
        self.sink.as_ref().map(Sink::get_pos)
    }
}

impl DurationProbe for RodioBackend {
    /// Decode the whole file. Used only when tags carry no length.
    fn probe_length(&mut self, path: &Path) -> Option<Duration> {
        let decoder = match decode(path) {
            Ok(d) => d,
            Err(e) => {
                debug!("length probe failed: {e}");
                return None;
            }
        };
        if let Some(total) = decoder.total_duration() {
            return Some(total);
        }

        let channels = u64::from(decoder.channels());
        let rate = u64::from(decoder.sample_rate());
        if channels == 0 || rate == 0 {
            return None;
        }
        let samples = decoder.count() as u64;
        Some(Duration::from_secs_f64(
            samples as f64 / (channels * rate) as f64,
        ))
    }
}
