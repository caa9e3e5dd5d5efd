//! The dedicated playback thread and its loader helpers.
//!
//! The thread exclusively owns the audio output; commands arrive over an
//! mpsc channel, and the `recv_timeout` tick doubles as the progress
//! synchronizer and natural-end detector. Source resolution is pushed onto
//! short-lived loader threads so the previous track keeps playing until
//! the replacement is ready.

use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::thread::JoinHandle;
use std::time::Duration;

use crate::config::Settings;

use super::output::RodioOutput;
use super::session::Session;
use super::source::{LoadRequest, resolve_source};
use super::types::{PlayerCmd, QueueHandle, SessionHandle, SharedSynth};

pub(super) fn spawn_session_thread(
    settings: &Settings,
    rx: Receiver<PlayerCmd>,
    tx: Sender<PlayerCmd>,
    info: SessionHandle,
    queue_view: QueueHandle,
    synth: SharedSynth,
) -> JoinHandle<()> {
    let tick = Duration::from_millis(settings.engine.tick_ms.max(1));
    let volume = settings.playback.volume;
    let loop_mode = settings.playback.repeat.loop_mode();

    thread::spawn(move || {
        let output = match RodioOutput::open() {
            Ok(output) => output,
            Err(err) => {
                tracing::error!(error = %err, "audio output unavailable, playback disabled");
                return;
            }
        };

        let mut session = Session::new(output, synth.clone(), info, queue_view, volume, loop_mode);

        loop {
            match rx.recv_timeout(tick) {
                Ok(PlayerCmd::Quit) => {
                    session.handle(PlayerCmd::Quit);
                    break;
                }
                Ok(cmd) => {
                    if let Some(request) = session.handle(cmd) {
                        spawn_loader(request, tx.clone(), synth.clone());
                    }
                }
                Err(RecvTimeoutError::Timeout) => {
                    if let Some(request) = session.tick() {
                        spawn_loader(request, tx.clone(), synth.clone());
                    }
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    })
}

/// Resolve a load request off the playback thread and feed the outcome
/// back through the command channel, tagged with the request's epoch.
fn spawn_loader(request: LoadRequest, tx: Sender<PlayerCmd>, synth: SharedSynth) {
    thread::spawn(move || {
        let outcome = resolve_source(&request.track, &synth);
        let _ = tx.send(PlayerCmd::SourceReady {
            epoch: request.epoch,
            outcome,
        });
    });
}
