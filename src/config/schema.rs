use std::path::PathBuf;

use serde::Deserialize;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/segue/config.toml` or `~/.config/segue/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `SEGUE__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub playback: PlaybackSettings,
    pub discovery: DiscoverySettings,
    pub library: LibrarySettings,
    pub playlist: PlaylistSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Interval of the progress timer while playing (milliseconds).
    pub tick_interval_ms: u64,
    /// Delay before the progress timer restarts after a seek (milliseconds).
    pub seek_settle_ms: u64,
    /// "Previous" restarts the current track instead of moving the selection
    /// once playback is past this point (milliseconds).
    pub restart_threshold_ms: u64,
    /// Capacity of the bounded backend event channel.
    pub event_queue_capacity: usize,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
            seek_settle_ms: 100,
            restart_threshold_ms: 3000,
            event_queue_capacity: 64,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DiscoverySettings {
    /// Per-URI timeout of the container prober (milliseconds).
    pub probe_timeout_ms: u64,
    /// Probes allowed in flight before new requests are rejected as busy.
    pub max_in_flight: usize,
    /// Upper bound on bytes fetched for a remote stream.
    pub remote_fetch_limit_bytes: u64,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            probe_timeout_ms: 5000,
            max_in_flight: 8,
            remote_fetch_limit_bytes: 64 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrackDisplayField {
    Title,
    Artist,
    /// Final path segment of the URI without its extension.
    Filename,
    Uri,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// File extensions to treat as audio (case-insensitive, without dot).
    pub extensions: Vec<String>,
    /// Whether to follow symlinks during scanning.
    pub follow_links: bool,
    /// Whether to include hidden files/directories (dotfiles).
    pub include_hidden: bool,
    /// Whether to recurse into subdirectories.
    pub recursive: bool,
    /// Optional cap on directory recursion depth.
    pub max_depth: Option<usize>,

    /// Which fields to use to build a playlist row label.
    ///
    /// Example: ["artist", "title"] -> "Artist - Title"
    pub display_fields: Vec<TrackDisplayField>,
    /// Separator used to join `display_fields`.
    pub display_separator: String,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            extensions: ["mp3", "flac", "ogg", "opus", "m4a", "wav", "aac"]
                .iter()
                .map(|e| e.to_string())
                .collect(),
            follow_links: true,
            include_hidden: true,
            recursive: true,
            max_depth: None,
            display_fields: vec![TrackDisplayField::Artist, TrackDisplayField::Title],
            display_separator: " - ".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaylistSettings {
    /// Playlist file loaded at startup and saved at shutdown.
    /// Defaults to `playlist.json` next to the config file.
    pub path: Option<PathBuf>,
    /// Whether to save the playlist on shutdown.
    pub autosave: bool,
}

impl Default for PlaylistSettings {
    fn default() -> Self {
        Self {
            path: None,
            autosave: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `tracing` filter directive used when `RUST_LOG` is not set.
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}
