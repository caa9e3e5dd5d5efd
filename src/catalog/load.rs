use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use walkdir::WalkDir;

use crate::config::CatalogSettings;

use super::model::Track;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read listings file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse listings file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// On-disk shape of a listings export: a `[[tracks]]` array.
#[derive(Debug, Deserialize)]
struct Listings {
    #[serde(default)]
    tracks: Vec<Track>,
}

/// Load the marketplace listings from a TOML document.
pub fn load_listings(path: &Path) -> Result<Vec<Track>, CatalogError> {
    let raw = fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let listings: Listings = toml::from_str(&raw).map_err(|source| CatalogError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(listings.tracks)
}

fn is_audio_file(path: &Path, extensions: &[String]) -> bool {
    let wanted: Vec<String> = extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            wanted.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

/// Point sourceless listings at local preview files.
///
/// Scans `dir` for audio files and, for every track whose source is empty or
/// the placeholder sentinel, assigns the file whose stem matches the track
/// id. Returns how many listings were updated.
pub fn attach_local_previews(tracks: &mut [Track], dir: &Path, settings: &CatalogSettings) -> usize {
    let mut previews: HashMap<String, PathBuf> = HashMap::new();
    for entry in WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(Result::ok)
    {
        let path = entry.path();
        if path.is_file() && is_audio_file(path, &settings.extensions) {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                previews
                    .entry(stem.to_string())
                    .or_insert_with(|| path.to_path_buf());
            }
        }
    }

    let mut attached = 0;
    for track in tracks.iter_mut().filter(|t| !t.has_real_audio()) {
        if let Some(path) = previews.get(&track.id) {
            track.audio_source = path.to_string_lossy().into_owned();
            attached += 1;
        }
    }
    attached
}
