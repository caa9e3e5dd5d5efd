use std::fs;

use tempfile::tempdir;

use super::*;
use crate::config::CatalogSettings;

fn track(id: &str, title: &str) -> Track {
    Track {
        id: id.into(),
        title: title.into(),
        artist: String::new(),
        audio_source: String::new(),
        cover_image: None,
        kind: TrackKind::Beat,
        purchase_link: None,
        duration_hint: None,
    }
}

#[test]
fn duration_hint_parses_minutes_seconds() {
    assert_eq!(DurationHint::Text("3:30".into()).seconds(), 210.0);
    assert_eq!(DurationHint::Text(" 0:07 ".into()).seconds(), 7.0);
}

#[test]
fn duration_hint_parses_bare_seconds() {
    assert_eq!(DurationHint::Text("45".into()).seconds(), 45.0);
    assert_eq!(DurationHint::Seconds(187.5).seconds(), 187.5);
}

#[test]
fn duration_hint_rejects_garbage() {
    assert_eq!(DurationHint::Text("bogus".into()).seconds(), 0.0);
    assert_eq!(DurationHint::Text("3:xx".into()).seconds(), 0.0);
    assert_eq!(DurationHint::Text("-12".into()).seconds(), 0.0);
    assert_eq!(DurationHint::Seconds(f64::NAN).seconds(), 0.0);
    assert_eq!(DurationHint::Seconds(-4.0).seconds(), 0.0);
}

#[test]
fn has_real_audio_ignores_placeholder_and_blank_sources() {
    let mut t = track("a", "Alpha");
    assert!(!t.has_real_audio());

    t.audio_source = "   ".into();
    assert!(!t.has_real_audio());

    t.audio_source = PLACEHOLDER_SOURCE.into();
    assert!(!t.has_real_audio());

    t.audio_source = "/media/previews/a.mp3".into();
    assert!(t.has_real_audio());
}

#[test]
fn display_prefers_artist_dash_title() {
    let mut t = track("a", "Night Drive");
    assert_eq!(t.display(), "Night Drive");

    t.artist = "  Prod. Vega  ".into();
    assert_eq!(t.display(), "Prod. Vega - Night Drive");
}

#[test]
fn load_listings_parses_tracks_array() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("listings.toml");
    fs::write(
        &path,
        r#"
[[tracks]]
id = "beat-001"
title = "Night Drive"
artist = "Vega"
audio_source = "previews/beat-001.mp3"
kind = "beat"
duration_hint = "2:45"

[[tracks]]
id = "pack-001"
title = "Drum Pack Vol. 1"
kind = "sample-pack"
duration_hint = 95
purchase_link = "https://store.example.com/pack-001"
"#,
    )
    .unwrap();

    let tracks = load_listings(&path).unwrap();
    assert_eq!(tracks.len(), 2);

    assert_eq!(tracks[0].id, "beat-001");
    assert_eq!(tracks[0].kind, TrackKind::Beat);
    assert!(tracks[0].has_real_audio());
    assert_eq!(tracks[0].hint_seconds(), 165.0);

    assert_eq!(tracks[1].kind, TrackKind::SamplePack);
    assert!(!tracks[1].has_real_audio());
    assert_eq!(tracks[1].hint_seconds(), 95.0);
    assert_eq!(
        tracks[1].purchase_link.as_deref(),
        Some("https://store.example.com/pack-001")
    );
}

#[test]
fn load_listings_reports_missing_file_and_bad_toml() {
    let dir = tempdir().unwrap();

    let missing = load_listings(&dir.path().join("nope.toml"));
    assert!(matches!(missing, Err(CatalogError::Io { .. })));

    let bad = dir.path().join("bad.toml");
    fs::write(&bad, "[[tracks]\nid = ").unwrap();
    assert!(matches!(
        load_listings(&bad),
        Err(CatalogError::Parse { .. })
    ));
}

#[test]
fn attach_local_previews_matches_by_id_stem() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("beat-001.mp3"), b"not real audio").unwrap();
    fs::write(dir.path().join("beat-002.WAV"), b"not real audio").unwrap();
    fs::write(dir.path().join("beat-003.txt"), b"ignore me").unwrap();

    let mut tracks = vec![
        track("beat-001", "Night Drive"),
        track("beat-002", "Cold Snap"),
        track("beat-003", "No Preview"),
        track("beat-004", "Missing File"),
    ];
    // Already-sourced listings are left alone.
    tracks[1].audio_source = "https://cdn.example.com/beat-002.mp3".into();

    let settings = CatalogSettings::default();
    let attached = attach_local_previews(&mut tracks, dir.path(), &settings);

    assert_eq!(attached, 1);
    assert!(tracks[0].audio_source.ends_with("beat-001.mp3"));
    assert_eq!(tracks[1].audio_source, "https://cdn.example.com/beat-002.mp3");
    assert!(tracks[2].audio_source.is_empty());
    assert!(tracks[3].audio_source.is_empty());
}
