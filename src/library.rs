//! Track model, URI helpers and folder scanning.
//!
//! A `Track` is an immutable value; everything that discovers tracks (folder
//! scans, single-URI discovery, catalog imports) produces new values and
//! hands them to the controlling thread.

mod display;
mod model;
mod scan;
mod source;
mod uri;

pub use display::{display_from_fields, format_clock, format_progress, format_remaining};
pub use model::{DiscoveryRequest, NANOS_PER_SEC, Track, UNKNOWN_ARTIST, UNKNOWN_TITLE};
pub use scan::{ScanSummary, collect_audio_files, spawn_folder_scan};
pub use source::{FetchOptions, MediaSource};
pub use uri::{is_remote, path_to_uri, title_from_uri, uri_to_path};
