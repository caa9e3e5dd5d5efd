//! The audio output resource and its `rodio` implementation.
//!
//! The session owns exactly one `AudioOutput` and is the only component
//! allowed to drive it; queue and synchronizer go through the session. The
//! trait seam keeps the session state machine testable without a device.

use std::fs::File;
use std::io::{BufReader, Cursor};
use std::path::Path;
use std::time::Duration;

use lofty::prelude::*;
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};

use crate::synth;

use super::source::{ResolvedSource, SourceError};

pub trait AudioOutput {
    /// Replace the loaded source. The new source starts paused at position
    /// zero; whatever was loaded before keeps playing until the swap
    /// happens inside this call.
    fn load(&mut self, source: &ResolvedSource) -> Result<(), SourceError>;
    /// Start or resume the loaded source.
    fn play(&mut self);
    /// Pause, keeping the position.
    fn pause(&mut self);
    /// Drop the loaded source entirely.
    fn stop(&mut self);
    fn set_volume(&mut self, volume: f32);
    /// Seek the loaded source. Out-of-range positions are the output's
    /// business: it may clamp or reject them.
    fn seek_to(&mut self, position: Duration) -> Result<(), SourceError>;
    /// Live playback position, when the output can report one.
    fn position(&self) -> Option<Duration>;
    /// Total duration of the loaded source, when known.
    fn duration(&self) -> Option<Duration>;
    /// True once the loaded source has played through to its natural end.
    fn finished(&self) -> bool;
    /// Locator of the loaded source, for the reload-dedup check.
    fn loaded_locator(&self) -> Option<String>;
}

/// `rodio`-backed output: one `OutputStream` per process, one `Sink` per
/// loaded source.
pub struct RodioOutput {
    stream: OutputStream,
    sink: Option<Sink>,
    locator: Option<String>,
    duration: Option<Duration>,
    volume: f32,
}

impl RodioOutput {
    /// Open the default output device. Failure here disables playback for
    /// the whole session and is reported loudly by the caller.
    pub fn open() -> Result<Self, SourceError> {
        let mut stream = OutputStreamBuilder::open_default_stream()
            .map_err(|e| SourceError::DeviceUnavailable(e.to_string()))?;
        // rodio logs to stderr when OutputStream is dropped. That's useful in
        // debugging, but noisy inside an embedding application.
        stream.log_on_drop(false);
        Ok(Self {
            stream,
            sink: None,
            locator: None,
            duration: None,
            volume: 1.0,
        })
    }

    fn install(
        &mut self,
        source: impl Source + Send + 'static,
        locator: String,
        duration: Option<Duration>,
    ) {
        let sink = Sink::connect_new(self.stream.mixer());
        sink.append(source);
        sink.pause();
        sink.set_volume(self.volume);
        // The previous sink keeps playing right up to here; stopping it is
        // the moment the replacement takes over.
        if let Some(old) = self.sink.take() {
            old.stop();
        }
        self.sink = Some(sink);
        self.locator = Some(locator);
        self.duration = duration;
    }
}

impl AudioOutput for RodioOutput {
    fn load(&mut self, source: &ResolvedSource) -> Result<(), SourceError> {
        let locator = source.locator();
        match source {
            ResolvedSource::File(path) => {
                let file = File::open(path).map_err(|e| SourceError::Decode {
                    locator: locator.clone(),
                    reason: e.to_string(),
                })?;
                let decoder =
                    Decoder::new(BufReader::new(file)).map_err(|e| SourceError::Decode {
                        locator: locator.clone(),
                        reason: e.to_string(),
                    })?;
                let duration = decoder.total_duration().or_else(|| probe_duration(path));
                self.install(decoder, locator, duration);
            }
            ResolvedSource::Synth(clip) => {
                let decoder =
                    Decoder::new(Cursor::new(clip.data.clone())).map_err(|e| {
                        SourceError::Decode {
                            locator: locator.clone(),
                            reason: e.to_string(),
                        }
                    })?;
                self.install(decoder, locator, Some(synth::clip_duration()));
            }
        }
        Ok(())
    }

    fn play(&mut self) {
        if let Some(sink) = &self.sink {
            sink.play();
        }
    }

    fn pause(&mut self) {
        if let Some(sink) = &self.sink {
            sink.pause();
        }
    }

    fn stop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        self.locator = None;
        self.duration = None;
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
        if let Some(sink) = &self.sink {
            sink.set_volume(volume);
        }
    }

    fn seek_to(&mut self, position: Duration) -> Result<(), SourceError> {
        match &self.sink {
            Some(sink) => sink
                .try_seek(position)
                .map_err(|e| SourceError::Seek(e.to_string())),
            None => Ok(()),
        }
    }

    fn position(&self) -> Option<Duration> {
        self.sink.as_ref().map(Sink::get_pos)
    }

    fn duration(&self) -> Option<Duration> {
        self.duration
    }

    fn finished(&self) -> bool {
        self.locator.is_some() && self.sink.as_ref().is_some_and(Sink::empty)
    }

    fn loaded_locator(&self) -> Option<String> {
        self.locator.clone()
    }
}

/// Duration probe for formats whose decoders report no total duration
/// (mp3, notably).
fn probe_duration(path: &Path) -> Option<Duration> {
    lofty::read_from_path(path)
        .ok()
        .map(|tagged| tagged.properties().duration())
}
