use serde::Deserialize;

/// Sentinel `audio_source` value the storefront stores for listings that
/// were created without uploaded preview audio.
pub const PLACEHOLDER_SOURCE: &str = "placeholder.mp3";

/// What a listing sells. Purely descriptive; playback treats all kinds the
/// same way.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrackKind {
    Beat,
    Track,
    SamplePack,
}

impl Default for TrackKind {
    fn default() -> Self {
        Self::Beat
    }
}

/// One playable listing.
///
/// Identity is `id` alone: "is this the current track" and "is this already
/// queued" both compare ids, never titles.
#[derive(Debug, Clone, Deserialize)]
pub struct Track {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub artist: String,
    /// Path-like locator of the preview audio. Empty or equal to
    /// [`PLACEHOLDER_SOURCE`] means "synthesize a fallback tone".
    #[serde(default)]
    pub audio_source: String,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub kind: TrackKind,
    /// External checkout URL the UI opens; irrelevant to playback.
    #[serde(default)]
    pub purchase_link: Option<String>,
    /// Duration supplied by the listing, shown until real metadata loads.
    #[serde(default)]
    pub duration_hint: Option<DurationHint>,
}

impl Track {
    /// True when `audio_source` points at actual audio rather than the
    /// placeholder sentinel or nothing at all.
    pub fn has_real_audio(&self) -> bool {
        let source = self.audio_source.trim();
        !source.is_empty() && source != PLACEHOLDER_SOURCE
    }

    /// "Artist - Title" line for transport displays.
    pub fn display(&self) -> String {
        let artist = self.artist.trim();
        if artist.is_empty() {
            self.title.clone()
        } else {
            format!("{} - {}", artist, self.title)
        }
    }

    /// Hinted duration in seconds; zero when absent or unparseable.
    pub fn hint_seconds(&self) -> f64 {
        self.duration_hint.as_ref().map_or(0.0, DurationHint::seconds)
    }
}

/// Listing-supplied duration: either a plain number of seconds or a
/// `"minutes:seconds"` display string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DurationHint {
    Seconds(f64),
    Text(String),
}

impl DurationHint {
    /// Seconds represented by this hint. Unparseable or non-finite input
    /// yields zero, which downstream treats as "unknown".
    pub fn seconds(&self) -> f64 {
        match self {
            Self::Seconds(s) if s.is_finite() && *s > 0.0 => *s,
            Self::Seconds(_) => 0.0,
            Self::Text(text) => parse_hint_text(text),
        }
    }
}

fn parse_hint_text(text: &str) -> f64 {
    let text = text.trim();
    if let Some((minutes, seconds)) = text.split_once(':') {
        match (minutes.parse::<u64>(), seconds.parse::<u64>()) {
            (Ok(m), Ok(s)) => (m * 60 + s) as f64,
            _ => 0.0,
        }
    } else {
        text.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && *v >= 0.0)
            .unwrap_or(0.0)
    }
}
