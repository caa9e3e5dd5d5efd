//! Continuous audio playback for a beat storefront.
//!
//! `segue` keeps one audio session alive for the lifetime of the
//! application, so browsing never interrupts the preview that is playing.
//! The crate exposes the playback session and its queue (`player`), the
//! track records and listing loader that feed it (`catalog`), the fallback
//! tone synthesizer for listings without preview audio (`synth`) and the
//! settings schema (`config`).

pub mod catalog;
pub mod config;
pub mod player;
pub mod synth;

pub use catalog::{Track, TrackKind};
pub use config::Settings;
pub use player::{LoopMode, Player, PlayerCmd, SessionInfo};
