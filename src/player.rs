//! The continuous playback engine: session, queue, synchronizer and output.
//!
//! One `Player` exists per application. The facade sends commands to a
//! dedicated playback thread that exclusively owns the audio output; the
//! observable session and queue state is shared back through
//! `Arc<Mutex<_>>` handles the UI polls to render transport controls.

mod handle;
mod output;
mod progress;
mod queue;
mod session;
mod source;
mod thread;
mod types;

pub use handle::Player;
pub use output::{AudioOutput, RodioOutput};
pub use source::{LoadRequest, ResolvedSource, SourceError, resolve_source};
pub use types::{
    LoopMode, PlayerCmd, QueueHandle, QueueSnapshot, SessionHandle, SessionInfo, SharedSynth,
};
