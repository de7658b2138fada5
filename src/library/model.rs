use std::path::PathBuf;
use std::sync::Arc;

use super::uri::{path_to_uri, uri_to_path};

pub const UNKNOWN_TITLE: &str = "Unknown Title";
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";
pub const NANOS_PER_SEC: u64 = 1_000_000_000;

/// A playable entry. Fields are fixed at construction; a track whose
/// metadata changes is replaced, never edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    uri: String,
    title: String,
    artist: String,
    duration_ns: u64,
    artwork: Option<Arc<[u8]>>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Track {
    /// Build a track. Missing or blank `title`/`artist` fall back to the
    /// "Unknown" sentinels; a `duration_ns` of 0 means unknown.
    pub fn new(
        uri: impl Into<String>,
        title: Option<String>,
        artist: Option<String>,
        duration_ns: u64,
    ) -> Self {
        Self {
            uri: uri.into(),
            title: non_empty(title).unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
            artist: non_empty(artist).unwrap_or_else(|| UNKNOWN_ARTIST.to_string()),
            duration_ns,
            artwork: None,
        }
    }

    /// Attach embedded artwork while the track is being built.
    pub fn with_artwork(mut self, artwork: Option<Vec<u8>>) -> Self {
        self.artwork = artwork.filter(|a| !a.is_empty()).map(Arc::from);
        self
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn artist(&self) -> &str {
        &self.artist
    }

    pub fn duration_ns(&self) -> u64 {
        self.duration_ns
    }

    pub fn artwork(&self) -> Option<&[u8]> {
        self.artwork.as_deref()
    }
}

/// One thing to resolve into a `Track`: a URI and, for local files, the path
/// the tag reader can open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryRequest {
    pub uri: String,
    pub path: Option<PathBuf>,
}

impl DiscoveryRequest {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            uri: path_to_uri(&path),
            path: Some(path),
        }
    }

    /// Accepts a URI or a bare filesystem path.
    pub fn from_uri(uri: &str) -> Self {
        if !uri.contains("://") {
            return Self::from_path(uri);
        }
        Self {
            uri: uri.to_string(),
            path: uri_to_path(uri),
        }
    }
}
