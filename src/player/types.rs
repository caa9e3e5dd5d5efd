//! Small shared types for the playback engine: commands, observable state
//! and the handles used to publish it.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::catalog::Track;
use crate::synth::SynthCache;

use super::source::{ResolvedSource, SourceError};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LoopMode {
    /// Stop at the end of the queue.
    NoLoop,
    /// Wrap around to the first queued track.
    LoopAll,
    /// Restart the current track when it ends.
    LoopOne,
}

impl Default for LoopMode {
    fn default() -> Self {
        Self::NoLoop
    }
}

#[derive(Debug)]
pub enum PlayerCmd {
    /// Start playing the given track, enqueueing it if needed.
    Play(Track),
    /// `Some` behaves like `Play`; `None` stops and clears the session.
    SetCurrent(Option<Track>),
    /// Toggle pause/resume for the current track.
    Toggle,
    /// Skip to the next queued track.
    Next,
    /// Go back to the previous queued track.
    Prev,
    /// Set output volume; values are clamped to [0, 1].
    SetVolume(f32),
    /// Seek the current track to the given position.
    SeekTo(Duration),
    /// Scrub gate: while on, progress writes into the observable state are
    /// suspended so the drag handle does not fight the synchronizer.
    SetScrubbing(bool),
    /// Append a track to the queue; no-op if its id is already queued.
    Enqueue(Track),
    /// Remove the queue entry at the given index.
    Remove(usize),
    /// Empty the queue and stop playback.
    ClearQueue,
    /// Randomly permute the queue, keeping the current track current.
    Shuffle,
    /// Set the repeat behavior applied at natural track end.
    SetLoopMode(LoopMode),
    /// Outcome of an asynchronous source resolution (sent by loader threads).
    SourceReady {
        epoch: u64,
        outcome: Result<ResolvedSource, SourceError>,
    },
    /// Shut the playback thread down.
    Quit,
}

/// Observable session state shared with the UI.
#[derive(Debug, Clone)]
pub struct SessionInfo {
    /// Currently selected track, if any.
    pub track: Option<Track>,
    /// Whether playback is active. Set optimistically on play intent and
    /// reverted if the intent ultimately fails.
    pub playing: bool,
    /// Output volume in [0, 1].
    pub volume: f32,
    /// Playback position within the current track.
    pub position: Duration,
    /// Known duration of the current track; zero while unknown.
    pub duration: Duration,
}

impl Default for SessionInfo {
    fn default() -> Self {
        Self {
            track: None,
            playing: false,
            volume: 1.0,
            position: Duration::ZERO,
            duration: Duration::ZERO,
        }
    }
}

/// Queue contents shared with the UI.
#[derive(Debug, Clone, Default)]
pub struct QueueSnapshot {
    pub tracks: Vec<Track>,
    pub current: usize,
}

pub type SessionHandle = Arc<Mutex<SessionInfo>>;
pub type QueueHandle = Arc<Mutex<QueueSnapshot>>;
pub type SharedSynth = Arc<Mutex<SynthCache>>;
