//! Fallback tone synthesis for listings without usable preview audio.
//!
//! The storefront regularly carries listings whose `audio_source` is empty
//! or the placeholder sentinel. Rather than erroring out of the transport,
//! the session plays a short deterministic tone: the title picks a base
//! frequency, so different listings sound distinguishably different, and
//! the rendered WAV bytes are cached per `(id, title)` so replaying a
//! listing reuses the same clip.

use std::collections::HashMap;
use std::f32::consts::TAU;
use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use hound::{SampleFormat, WavSpec, WavWriter};

/// Sample rate of every synthesized clip.
pub const SAMPLE_RATE: u32 = 44_100;

/// Fixed length of a synthesized clip, in seconds. A fallback clip reports
/// this duration no matter what the listing hinted.
pub const CLIP_SECONDS: u32 = 30;

/// Duration every synthesized clip reports.
pub fn clip_duration() -> Duration {
    Duration::from_secs(u64::from(CLIP_SECONDS))
}

/// A rendered fallback clip: WAV bytes plus the locator the session uses
/// for its reload-dedup check.
#[derive(Debug)]
pub struct SynthClip {
    pub locator: String,
    pub data: Arc<[u8]>,
}

/// Cache of rendered clips keyed by `"{id}-{title}"`.
#[derive(Debug, Default)]
pub struct SynthCache {
    clips: HashMap<String, Arc<SynthClip>>,
}

impl SynthCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clip for the given track identity. Renders on first use and returns
    /// the cached clip afterwards. Never fails outward: a render error
    /// degrades to a minimal near-silent payload.
    pub fn clip_for(&mut self, id: &str, title: &str) -> Arc<SynthClip> {
        let key = format!("{id}-{title}");
        if let Some(clip) = self.clips.get(&key) {
            return clip.clone();
        }

        let data = match render_tone(title) {
            Ok(data) => data,
            Err(err) => {
                tracing::warn!(
                    operation = "synthesize",
                    error = %err,
                    key = %key,
                    "tone render failed, using silent payload"
                );
                silent_payload()
            }
        };
        let clip = Arc::new(SynthClip {
            locator: format!("synth:{key}"),
            data: data.into(),
        });
        self.clips.insert(key, clip.clone());
        clip
    }
}

/// Map a title onto a base frequency in the audible 220-660 Hz band.
fn base_frequency(title: &str) -> f32 {
    let hash = title
        .bytes()
        .fold(0u32, |h, b| h.wrapping_mul(31).wrapping_add(u32::from(b)));
    220.0 + (hash % 4400) as f32 / 10.0
}

fn wav_spec() -> WavSpec {
    WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    }
}

/// Render the tone for `title`: fundamental plus two quieter harmonics with
/// a slow amplitude modulation, 16-bit mono PCM in a WAV container.
fn render_tone(title: &str) -> Result<Vec<u8>, hound::Error> {
    let mut bytes = Vec::new();
    let mut writer = WavWriter::new(Cursor::new(&mut bytes), wav_spec())?;

    let base = base_frequency(title);
    let total = SAMPLE_RATE * CLIP_SECONDS;
    for n in 0..total {
        let t = n as f32 / SAMPLE_RATE as f32;
        let wave = (TAU * base * t).sin()
            + 0.4 * (TAU * base * 2.0 * t).sin()
            + 0.2 * (TAU * base * 3.0 * t).sin();
        // One modulation cycle every four seconds keeps it from sounding
        // like a bare test tone.
        let level = 0.55 + 0.35 * (TAU * 0.25 * t).sin();
        let sample = (wave / 1.6) * level * 0.5;
        writer.write_sample((sample * f32::from(i16::MAX)) as i16)?;
    }
    writer.finalize()?;
    Ok(bytes)
}

/// Minimal valid WAV payload (one second of silence), assembled by hand so
/// this path cannot fail.
fn silent_payload() -> Vec<u8> {
    let samples = SAMPLE_RATE;
    let data_len = samples * 2;
    let mut bytes = Vec::with_capacity(44 + data_len as usize);
    bytes.extend_from_slice(b"RIFF");
    bytes.extend_from_slice(&(36 + data_len).to_le_bytes());
    bytes.extend_from_slice(b"WAVE");
    bytes.extend_from_slice(b"fmt ");
    bytes.extend_from_slice(&16u32.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes()); // PCM
    bytes.extend_from_slice(&1u16.to_le_bytes()); // mono
    bytes.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
    bytes.extend_from_slice(&(SAMPLE_RATE * 2).to_le_bytes()); // byte rate
    bytes.extend_from_slice(&2u16.to_le_bytes()); // block align
    bytes.extend_from_slice(&16u16.to_le_bytes()); // bits per sample
    bytes.extend_from_slice(b"data");
    bytes.extend_from_slice(&data_len.to_le_bytes());
    bytes.resize(44 + data_len as usize, 0);
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u16_at(bytes: &[u8], offset: usize) -> u16 {
        u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
    }

    fn u32_at(bytes: &[u8], offset: usize) -> u32 {
        u32::from_le_bytes([
            bytes[offset],
            bytes[offset + 1],
            bytes[offset + 2],
            bytes[offset + 3],
        ])
    }

    #[test]
    fn repeated_requests_hit_the_cache() {
        let mut cache = SynthCache::new();
        let first = cache.clip_for("beat-001", "Night Drive");
        let second = cache.clip_for("beat-001", "Night Drive");

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.locator, "synth:beat-001-Night Drive");
    }

    #[test]
    fn distinct_identities_render_distinct_clips() {
        let mut cache = SynthCache::new();
        let a = cache.clip_for("beat-001", "A");
        let b = cache.clip_for("beat-002", "B");

        assert!(!Arc::ptr_eq(&a, &b));
        assert_ne!(a.locator, b.locator);
        assert_ne!(a.data, b.data);
    }

    #[test]
    fn base_frequency_stays_in_audible_band() {
        for title in ["A", "B", "Night Drive", "Cold Snap", "808 Slide", ""] {
            let f = base_frequency(title);
            assert!((220.0..660.0).contains(&f), "{title}: {f}");
        }
        assert_ne!(base_frequency("A"), base_frequency("B"));
    }

    #[test]
    fn clip_header_is_byte_exact() {
        let mut cache = SynthCache::new();
        let clip = cache.clip_for("beat-001", "Night Drive");
        let bytes = &clip.data;

        let expected_data_len = (SAMPLE_RATE * CLIP_SECONDS * 2) as usize;
        assert_eq!(bytes.len(), 44 + expected_data_len);

        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(u32_at(bytes, 4) as usize, bytes.len() - 8);
        assert_eq!(&bytes[8..12], b"WAVE");
        assert_eq!(&bytes[12..16], b"fmt ");
        assert_eq!(u32_at(bytes, 16), 16);
        assert_eq!(u16_at(bytes, 20), 1); // PCM
        assert_eq!(u16_at(bytes, 22), 1); // mono
        assert_eq!(u32_at(bytes, 24), SAMPLE_RATE);
        assert_eq!(u32_at(bytes, 28), SAMPLE_RATE * 2);
        assert_eq!(u16_at(bytes, 32), 2);
        assert_eq!(u16_at(bytes, 34), 16);
        assert_eq!(&bytes[36..40], b"data");
        assert_eq!(u32_at(bytes, 40) as usize, expected_data_len);
    }

    #[test]
    fn clip_parses_as_wav_with_expected_length() {
        let mut cache = SynthCache::new();
        let clip = cache.clip_for("beat-001", "Night Drive");

        let reader = hound::WavReader::new(Cursor::new(clip.data.clone())).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, SAMPLE_RATE);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(spec.sample_format, SampleFormat::Int);
        assert_eq!(reader.duration(), SAMPLE_RATE * CLIP_SECONDS);
    }

    #[test]
    fn silent_payload_is_valid_and_silent() {
        let bytes = silent_payload();
        let reader = hound::WavReader::new(Cursor::new(bytes)).unwrap();
        assert_eq!(reader.spec().channels, 1);
        assert_eq!(reader.spec().sample_rate, SAMPLE_RATE);
        assert_eq!(reader.duration(), SAMPLE_RATE);

        let peak = reader
            .into_samples::<i16>()
            .filter_map(Result::ok)
            .map(i16::unsigned_abs)
            .max()
            .unwrap_or(0);
        assert_eq!(peak, 0);
    }

    #[test]
    fn clip_reports_fixed_duration() {
        assert_eq!(clip_duration(), Duration::from_secs(30));
    }
}
