//! Elapsed-time tracking for the session.
//!
//! The output resource's own position reading is authoritative whenever it
//! can report one; this clock (a start instant plus accumulated time,
//! banked across pause/resume) fills in when it cannot, and gates progress
//! writes while the user is scrubbing the seek control.

use std::time::{Duration, Instant};

#[derive(Debug, Default)]
pub(super) struct ProgressClock {
    started_at: Option<Instant>,
    accumulated: Duration,
    dragging: bool,
}

impl ProgressClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restart from zero and begin running.
    pub fn start(&mut self) {
        self.accumulated = Duration::ZERO;
        self.started_at = Some(Instant::now());
    }

    /// Freeze the clock, banking the elapsed time.
    pub fn pause(&mut self) {
        if let Some(started) = self.started_at.take() {
            self.accumulated += started.elapsed();
        }
    }

    /// Resume after `pause`; a running clock is left alone.
    pub fn resume(&mut self) {
        if self.started_at.is_none() {
            self.started_at = Some(Instant::now());
        }
    }

    /// Stop and forget any elapsed time.
    pub fn reset(&mut self) {
        self.started_at = None;
        self.accumulated = Duration::ZERO;
    }

    /// Rebase the clock at `position`, preserving the running/paused state.
    pub fn seek(&mut self, position: Duration) {
        let running = self.started_at.is_some();
        self.accumulated = position;
        self.started_at = running.then(Instant::now);
    }

    pub fn set_dragging(&mut self, dragging: bool) {
        self.dragging = dragging;
    }

    pub fn elapsed(&self) -> Duration {
        self.accumulated + self.started_at.map_or(Duration::ZERO, |s| s.elapsed())
    }

    /// Position to publish this tick: the output's live reading when it has
    /// one, the clock otherwise. `None` while a scrub drag is in progress.
    pub fn tick(&self, live: Option<Duration>) -> Option<Duration> {
        if self.dragging {
            return None;
        }
        Some(live.unwrap_or_else(|| self.elapsed()))
    }
}
