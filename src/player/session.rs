//! The playback session state machine.
//!
//! All transport intent funnels through here: the session owns the output
//! resource, the queue and the progress clock, and publishes observable
//! state. Asynchronous load results are guarded by an epoch token bumped on
//! every load intent, so a stale resolution can never mutate state on
//! behalf of a newer track.

use std::time::Duration;

use crate::catalog::Track;
use crate::synth;

use super::output::AudioOutput;
use super::progress::ProgressClock;
use super::queue::TrackQueue;
use super::source::{LoadRequest, ResolvedSource, SourceError, synth_clip};
use super::types::{LoopMode, PlayerCmd, QueueHandle, SessionHandle, SessionInfo, SharedSynth};

pub(super) struct Session<O: AudioOutput> {
    output: O,
    queue: TrackQueue,
    clock: ProgressClock,
    synth: SharedSynth,
    info: SessionHandle,
    queue_view: QueueHandle,
    loop_mode: LoopMode,
    /// User intent: true while playback should stay inaudible.
    paused: bool,
    volume: f32,
    /// Operation token, bumped on every load intent and on clears. Stale
    /// resolutions carry an older value and are discarded.
    epoch: u64,
    /// True while a resolution for the current epoch is outstanding.
    loading: bool,
}

impl<O: AudioOutput> Session<O> {
    pub fn new(
        output: O,
        synth: SharedSynth,
        info: SessionHandle,
        queue_view: QueueHandle,
        volume: f32,
        loop_mode: LoopMode,
    ) -> Self {
        let volume = if volume.is_finite() {
            volume.clamp(0.0, 1.0)
        } else {
            1.0
        };
        let mut session = Self {
            output,
            queue: TrackQueue::new(),
            clock: ProgressClock::new(),
            synth,
            info,
            queue_view,
            loop_mode,
            paused: true,
            volume,
            epoch: 0,
            loading: false,
        };
        session.output.set_volume(volume);
        session.update_info(|info| info.volume = volume);
        session
    }

    /// Dispatch one command. `Some` means the caller must resolve the
    /// returned load request and feed the outcome back via `SourceReady`.
    pub fn handle(&mut self, cmd: PlayerCmd) -> Option<LoadRequest> {
        match cmd {
            PlayerCmd::Play(track) => self.play_track(track),
            PlayerCmd::SetCurrent(track) => self.set_current(track),
            PlayerCmd::Toggle => self.toggle(),
            PlayerCmd::Next => self.next(),
            PlayerCmd::Prev => self.previous(),
            PlayerCmd::SetVolume(volume) => {
                self.set_volume(volume);
                None
            }
            PlayerCmd::SeekTo(position) => {
                self.seek_to(position);
                None
            }
            PlayerCmd::SetScrubbing(on) => {
                self.clock.set_dragging(on);
                None
            }
            PlayerCmd::Enqueue(track) => {
                self.enqueue(track);
                None
            }
            PlayerCmd::Remove(index) => {
                self.remove_from_queue(index);
                None
            }
            PlayerCmd::ClearQueue => {
                self.clear_queue();
                None
            }
            PlayerCmd::Shuffle => {
                self.shuffle_queue();
                None
            }
            PlayerCmd::SetLoopMode(mode) => {
                self.loop_mode = mode;
                None
            }
            PlayerCmd::SourceReady { epoch, outcome } => {
                self.apply_source(epoch, outcome);
                None
            }
            PlayerCmd::Quit => {
                self.stop_clear();
                None
            }
        }
    }

    /// Select `track` and start playing it.
    ///
    /// Observable state flips to "playing this track" before the source
    /// resolves, so transport controls react within the interaction that
    /// asked for playback. The track is enqueued if its id is not already
    /// queued.
    pub fn play_track(&mut self, track: Track) -> Option<LoadRequest> {
        self.queue.enqueue(&track);
        self.queue.jump_to_id(&track.id);
        self.publish_queue();

        self.paused = false;
        self.clock.reset();
        let seeded = seed_duration(&track);
        self.update_info(|info| {
            info.track = Some(track.clone());
            info.playing = true;
            info.position = Duration::ZERO;
            info.duration = seeded;
        });

        self.request_load(track)
    }

    fn request_load(&mut self, track: Track) -> Option<LoadRequest> {
        self.epoch += 1;
        self.loading = true;
        Some(LoadRequest {
            epoch: self.epoch,
            track,
        })
    }

    /// Install an asynchronously resolved source, unless a newer intent
    /// superseded the request while it was in flight.
    pub fn apply_source(&mut self, epoch: u64, outcome: Result<ResolvedSource, SourceError>) {
        if epoch != self.epoch {
            tracing::debug!(epoch, current = self.epoch, "discarding stale source resolution");
            return;
        }
        self.loading = false;

        let Some(track) = self.current_track() else {
            return;
        };

        let source = match outcome {
            Ok(source) => source,
            Err(err) => {
                tracing::warn!(
                    operation = "resolve",
                    error = %err,
                    track = %track.id,
                    "source resolution failed, substituting tone"
                );
                ResolvedSource::Synth(synth_clip(&track, &self.synth))
            }
        };

        if !self.install(&source, &track) {
            return;
        }

        if self.paused {
            // A pause superseded this load; install the source but swallow
            // the play that was originally intended.
            self.update_info(|info| info.playing = false);
        } else {
            self.output.play();
            self.clock.start();
            self.update_info(|info| info.playing = true);
        }
    }

    /// Load `source` into the output, falling back to a synthesized clip on
    /// decode failure. Returns false only when nothing could be installed.
    fn install(&mut self, source: &ResolvedSource, track: &Track) -> bool {
        let locator = source.locator();
        let already_loaded = self
            .output
            .loaded_locator()
            .is_some_and(|loaded| loaded == locator);
        // Reloading an identical source is an audible glitch; skip it unless
        // the loaded copy already ran to its end and needs rebuilding.
        if already_loaded && !self.output.finished() {
            self.refresh_duration();
            return true;
        }

        let installed = match self.output.load(source) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(
                    operation = "load",
                    error = %err,
                    track = %track.id,
                    "source failed to load, substituting tone"
                );
                let fallback = ResolvedSource::Synth(synth_clip(track, &self.synth));
                match self.output.load(&fallback) {
                    Ok(()) => true,
                    Err(err) => {
                        tracing::warn!(
                            operation = "load",
                            error = %err,
                            track = %track.id,
                            "fallback clip failed to load"
                        );
                        false
                    }
                }
            }
        };

        if installed {
            self.output.set_volume(self.volume);
            self.refresh_duration();
            true
        } else {
            // Even the fallback failed: revert the optimistic flag.
            self.paused = true;
            self.clock.reset();
            self.update_info(|info| info.playing = false);
            false
        }
    }

    pub fn toggle(&mut self) -> Option<LoadRequest> {
        let Some(track) = self.current_track() else {
            return None;
        };

        if !self.paused {
            self.paused = true;
            self.output.pause();
            self.clock.pause();
            self.update_info(|info| info.playing = false);
            return None;
        }

        self.paused = false;
        self.update_info(|info| info.playing = true);
        if self.loading {
            // The pending load starts playback once it lands.
            return None;
        }
        if self.output.loaded_locator().is_some() && !self.output.finished() {
            self.output.play();
            self.clock.resume();
            None
        } else {
            // The resource lost its source (cleared, or fully played out);
            // resuming means loading it again.
            self.request_load(track)
        }
    }

    pub fn set_current(&mut self, track: Option<Track>) -> Option<LoadRequest> {
        match track {
            Some(track) => self.play_track(track),
            None => {
                self.stop_clear();
                None
            }
        }
    }

    /// Stop playback and clear the current track; in-flight loads go stale.
    fn stop_clear(&mut self) {
        self.epoch += 1;
        self.loading = false;
        self.paused = true;
        self.output.stop();
        self.clock.reset();
        self.update_info(|info| {
            info.track = None;
            info.playing = false;
            info.position = Duration::ZERO;
            info.duration = Duration::ZERO;
        });
    }

    pub fn next(&mut self) -> Option<LoadRequest> {
        let Some(track) = self.queue.next().cloned() else {
            return None;
        };
        self.play_track(track)
    }

    pub fn previous(&mut self) -> Option<LoadRequest> {
        let Some(track) = self.queue.previous().cloned() else {
            return None;
        };
        self.play_track(track)
    }

    pub fn set_volume(&mut self, volume: f32) {
        let volume = if volume.is_finite() {
            volume.clamp(0.0, 1.0)
        } else {
            self.volume
        };
        self.volume = volume;
        self.output.set_volume(volume);
        self.update_info(|info| info.volume = volume);
    }

    /// Seek the current track. Out-of-range positions are left to the
    /// output's own clamping behavior.
    pub fn seek_to(&mut self, position: Duration) {
        if let Err(err) = self.output.seek_to(position) {
            tracing::warn!(operation = "seek", error = %err, "seek rejected");
            return;
        }
        self.clock.seek(position);
        self.update_info(|info| info.position = position);
    }

    pub fn enqueue(&mut self, track: Track) {
        if self.queue.enqueue(&track) {
            self.publish_queue();
        }
    }

    pub fn remove_from_queue(&mut self, index: usize) {
        let was_current = index == self.queue.current_index();
        if self.queue.remove(index).is_none() {
            return;
        }

        if self.queue.is_empty() {
            self.stop_clear();
        } else if was_current {
            // The playing entry went away: promote its successor without
            // autoplaying it.
            let promoted = self.queue.current_track().cloned();
            self.epoch += 1;
            self.loading = false;
            self.paused = true;
            self.output.stop();
            self.clock.reset();
            if let Some(track) = promoted {
                let seeded = seed_duration(&track);
                self.update_info(|info| {
                    info.track = Some(track.clone());
                    info.playing = false;
                    info.position = Duration::ZERO;
                    info.duration = seeded;
                });
            }
        }
        self.publish_queue();
    }

    pub fn clear_queue(&mut self) {
        self.queue.clear();
        self.stop_clear();
        self.publish_queue();
    }

    pub fn shuffle_queue(&mut self) {
        self.shuffle_queue_with(&mut rand::rng());
    }

    pub fn shuffle_queue_with(&mut self, rng: &mut impl rand::Rng) {
        self.queue.shuffle(rng);
        self.publish_queue();
    }

    /// One synchronizer tick: mirror the live position while playing and
    /// advance when the loaded source reached its natural end. Inert while
    /// paused, loading, or without a current track.
    pub fn tick(&mut self) -> Option<LoadRequest> {
        if self.paused || self.loading || self.current_track().is_none() {
            return None;
        }

        if self.output.finished() {
            return self.handle_track_end();
        }

        if let Some(position) = self.clock.tick(self.output.position()) {
            self.update_info(|info| info.position = position);
        }
        self.refresh_duration();
        None
    }

    fn handle_track_end(&mut self) -> Option<LoadRequest> {
        match self.loop_mode {
            LoopMode::LoopOne => {
                let track = self.current_track()?;
                self.play_track(track)
            }
            LoopMode::LoopAll => self.next(),
            LoopMode::NoLoop => {
                if self.queue.len() > 1 && !self.queue.on_last() {
                    self.next()
                } else {
                    // End of the queue: stay on this track, stopped and
                    // rewound, so a later resume starts it over.
                    self.paused = true;
                    self.output.stop();
                    self.clock.reset();
                    self.update_info(|info| {
                        info.playing = false;
                        info.position = Duration::ZERO;
                    });
                    None
                }
            }
        }
    }

    fn refresh_duration(&mut self) {
        if let Some(duration) = self.output.duration() {
            if !duration.is_zero() {
                self.update_info(|info| info.duration = duration);
            }
        }
    }

    fn current_track(&self) -> Option<Track> {
        self.info.lock().ok().and_then(|info| info.track.clone())
    }

    fn publish_queue(&self) {
        if let Ok(mut view) = self.queue_view.lock() {
            view.tracks = self.queue.tracks().to_vec();
            view.current = self.queue.current_index();
        }
    }

    fn update_info(&self, apply: impl FnOnce(&mut SessionInfo)) {
        if let Ok(mut info) = self.info.lock() {
            apply(&mut info);
        }
    }
}

/// Duration shown before real metadata arrives: synthesized tracks always
/// report the fixed clip length, real sources use the listing hint.
fn seed_duration(track: &Track) -> Duration {
    if !track.has_real_audio() {
        return synth::clip_duration();
    }
    let seconds = track.hint_seconds();
    if seconds > 0.0 {
        Duration::from_secs_f64(seconds)
    } else {
        Duration::ZERO
    }
}
