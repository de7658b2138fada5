//! JSON playlist files: a list of `{uri, title, artist, duration_ns,
//! album_art_b64?}` records.

use std::fs;
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::error::PersistError;
use crate::library::Track;

#[derive(Debug, Serialize)]
struct TrackRecord<'a> {
    uri: &'a str,
    title: &'a str,
    artist: &'a str,
    duration_ns: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    album_art_b64: Option<String>,
}

impl<'a> From<&'a Track> for TrackRecord<'a> {
    fn from(track: &'a Track) -> Self {
        Self {
            uri: track.uri(),
            title: track.title(),
            artist: track.artist(),
            duration_ns: track.duration_ns(),
            album_art_b64: track.artwork().map(|a| STANDARD.encode(a)),
        }
    }
}

fn string_field(record: &Map<String, Value>, key: &str) -> Option<String> {
    record.get(key).and_then(Value::as_str).map(str::to_string)
}

fn track_from_record(index: usize, record: &Map<String, Value>) -> Option<Track> {
    let Some(uri) = string_field(record, "uri").filter(|u| !u.is_empty()) else {
        warn!(index, "playlist entry has no uri; skipping");
        return None;
    };

    // Negative, fractional or missing durations all mean unknown.
    let duration_ns = record
        .get("duration_ns")
        .and_then(Value::as_u64)
        .unwrap_or(0);

    let artwork = match record.get("album_art_b64").and_then(Value::as_str) {
        Some(encoded) if !encoded.is_empty() => match STANDARD.decode(encoded) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                warn!(index, %uri, error = %e, "dropping undecodable artwork");
                None
            }
        },
        _ => None,
    };

    Some(
        Track::new(
            uri,
            string_field(record, "title"),
            string_field(record, "artist"),
            duration_ns,
        )
        .with_artwork(artwork),
    )
}

/// Read a playlist file. Entries that are not objects, or carry no URI, are
/// skipped with a warning; anything wrong with the file as a whole is an
/// error and the caller keeps its current playlist.
pub fn load_playlist(path: &Path) -> Result<Vec<Track>, PersistError> {
    if !path.exists() {
        return Err(PersistError::Missing {
            path: path.to_path_buf(),
        });
    }
    let text = fs::read_to_string(path).map_err(|source| PersistError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let root: Value = serde_json::from_str(&text)?;
    let Value::Array(entries) = root else {
        return Err(PersistError::NotAList);
    };

    let tracks: Vec<Track> = entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| match entry {
            Value::Object(record) => track_from_record(index, record),
            other => {
                warn!(index, entry = %other, "skipping non-object playlist entry");
                None
            }
        })
        .collect();

    info!(path = %path.display(), tracks = tracks.len(), "playlist loaded");
    Ok(tracks)
}

/// Write `tracks` as pretty-printed JSON, creating parent directories.
pub fn save_playlist<'a>(
    path: &Path,
    tracks: impl IntoIterator<Item = &'a Track>,
) -> Result<(), PersistError> {
    let records: Vec<TrackRecord<'_>> = tracks.into_iter().map(TrackRecord::from).collect();
    let json = serde_json::to_string_pretty(&records)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| PersistError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, json).map_err(|source| PersistError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    info!(path = %path.display(), tracks = records.len(), "playlist saved");
    Ok(())
}
