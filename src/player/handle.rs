//! The `Player` facade handed to the rest of the application.

use std::sync::mpsc::{self, SendError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::catalog::Track;
use crate::config::Settings;
use crate::synth::SynthCache;

use super::thread::spawn_session_thread;
use super::types::{
    LoopMode, PlayerCmd, QueueHandle, QueueSnapshot, SessionHandle, SessionInfo, SharedSynth,
};

/// The storefront's one playback engine instance.
///
/// Construct a single `Player` at application startup and inject it
/// wherever transport controls live. Nothing about the session is tied to
/// any one view, so playback survives route changes by construction.
pub struct Player {
    tx: Sender<PlayerCmd>,
    info: SessionHandle,
    queue: QueueHandle,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl Player {
    pub fn new(settings: &Settings) -> Self {
        let (tx, rx) = mpsc::channel::<PlayerCmd>();
        let info: SessionHandle = Arc::new(Mutex::new(SessionInfo::default()));
        let queue: QueueHandle = Arc::new(Mutex::new(QueueSnapshot::default()));
        let synth: SharedSynth = Arc::new(Mutex::new(SynthCache::new()));

        let join = spawn_session_thread(settings, rx, tx.clone(), info.clone(), queue.clone(), synth);

        Self {
            tx,
            info,
            queue,
            join: Mutex::new(Some(join)),
        }
    }

    /// Observable session state (now playing, position, volume).
    pub fn session_handle(&self) -> SessionHandle {
        self.info.clone()
    }

    /// Observable queue contents.
    pub fn queue_handle(&self) -> QueueHandle {
        self.queue.clone()
    }

    pub fn send(&self, cmd: PlayerCmd) -> Result<(), SendError<PlayerCmd>> {
        self.tx.send(cmd)
    }

    /// Start playing `track`. The observable state flips to "playing this
    /// track" here, before the source loads, so controls wired to a click
    /// react within the same interaction.
    pub fn play_track(&self, track: Track) {
        if let Ok(mut info) = self.info.lock() {
            info.track = Some(track.clone());
            info.playing = true;
            info.position = Duration::ZERO;
        }
        let _ = self.send(PlayerCmd::Play(track));
    }

    /// `Some` behaves like [`Player::play_track`]; `None` stops playback
    /// and clears the current track.
    pub fn set_current(&self, track: Option<Track>) {
        match track {
            Some(track) => self.play_track(track),
            None => {
                let _ = self.send(PlayerCmd::SetCurrent(None));
            }
        }
    }

    pub fn toggle_play_pause(&self) {
        let _ = self.send(PlayerCmd::Toggle);
    }

    pub fn next_track(&self) {
        let _ = self.send(PlayerCmd::Next);
    }

    pub fn previous_track(&self) {
        let _ = self.send(PlayerCmd::Prev);
    }

    pub fn set_volume(&self, volume: f32) {
        let _ = self.send(PlayerCmd::SetVolume(volume));
    }

    pub fn seek_to(&self, position: Duration) {
        let _ = self.send(PlayerCmd::SeekTo(position));
    }

    pub fn set_scrubbing(&self, scrubbing: bool) {
        let _ = self.send(PlayerCmd::SetScrubbing(scrubbing));
    }

    pub fn set_loop_mode(&self, mode: LoopMode) {
        let _ = self.send(PlayerCmd::SetLoopMode(mode));
    }

    pub fn add_to_queue(&self, track: Track) {
        let _ = self.send(PlayerCmd::Enqueue(track));
    }

    pub fn remove_from_queue(&self, index: usize) {
        let _ = self.send(PlayerCmd::Remove(index));
    }

    pub fn clear_queue(&self) {
        let _ = self.send(PlayerCmd::ClearQueue);
    }

    pub fn shuffle_queue(&self) {
        let _ = self.send(PlayerCmd::Shuffle);
    }

    /// Stop the playback thread and wait for it to wind down.
    pub fn shutdown(&self) {
        let _ = self.send(PlayerCmd::Quit);
        if let Ok(mut join) = self.join.lock() {
            if let Some(handle) = join.take() {
                let _ = handle.join();
            }
        }
    }
}
