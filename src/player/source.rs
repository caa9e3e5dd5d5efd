//! Source resolution: turn a listing's locator into something loadable.
//!
//! Resolution runs on short-lived loader threads so the session never
//! blocks on it. Every request carries the epoch captured when the load was
//! asked for; the session discards results whose epoch is no longer
//! current (see `Session::apply_source`).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use crate::catalog::Track;
use crate::synth::SynthClip;

use super::types::SharedSynth;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("no audio output device: {0}")]
    DeviceUnavailable(String),
    #[error("audio source not found: {0:?}")]
    Missing(PathBuf),
    #[error("cannot fetch remote source: {0}")]
    UnsupportedScheme(String),
    #[error("failed to decode audio source {locator}: {reason}")]
    Decode { locator: String, reason: String },
    #[error("seek rejected by output: {0}")]
    Seek(String),
}

/// A load intent: which track, and the epoch current when it was issued.
#[derive(Debug, Clone)]
pub struct LoadRequest {
    pub epoch: u64,
    pub track: Track,
}

/// A resolved, loadable audio source.
#[derive(Debug, Clone)]
pub enum ResolvedSource {
    /// A local audio file.
    File(PathBuf),
    /// A synthesized fallback clip.
    Synth(Arc<SynthClip>),
}

impl ResolvedSource {
    /// Stable identity used for the reload-dedup check: loading the same
    /// locator twice in a row must not rebuild the audible source.
    pub fn locator(&self) -> String {
        match self {
            Self::File(path) => path.to_string_lossy().into_owned(),
            Self::Synth(clip) => clip.locator.clone(),
        }
    }
}

/// Resolve `track.audio_source` into a loadable source.
///
/// Tracks without real audio synthesize a fallback clip directly. Locators
/// this engine cannot fetch (URL schemes) and dangling paths are reported
/// as errors; the session substitutes a fallback clip for those too, so the
/// distinction stays visible in the logs.
pub fn resolve_source(track: &Track, synth: &SharedSynth) -> Result<ResolvedSource, SourceError> {
    if !track.has_real_audio() {
        return Ok(ResolvedSource::Synth(synth_clip(track, synth)));
    }

    let locator = track.audio_source.trim();
    if locator.contains("://") {
        return Err(SourceError::UnsupportedScheme(locator.to_string()));
    }

    let path = Path::new(locator);
    if !path.is_file() {
        return Err(SourceError::Missing(path.to_path_buf()));
    }
    // Absolute paths keep the dedup check stable when the same file is
    // reached through different relative spellings.
    let path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    Ok(ResolvedSource::File(path))
}

/// Fallback clip for `track`; never fails.
pub(super) fn synth_clip(track: &Track, synth: &SharedSynth) -> Arc<SynthClip> {
    match synth.lock() {
        Ok(mut cache) => cache.clip_for(&track.id, &track.title),
        Err(poisoned) => poisoned.into_inner().clip_for(&track.id, &track.title),
    }
}
