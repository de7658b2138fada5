use crate::config::TrackDisplayField;

use super::model::{NANOS_PER_SEC, Track};
use super::uri::title_from_uri;

/// Sentinel shown wherever a duration is unknown.
pub const UNKNOWN_CLOCK: &str = "--:--";

/// Format nanoseconds as `m:ss`. Zero renders as `--:--`.
pub fn format_clock(ns: u64) -> String {
    if ns == 0 {
        return UNKNOWN_CLOCK.to_string();
    }
    let secs = ns / NANOS_PER_SEC;
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// The `position / duration` label. Position zero is a real position here,
/// so only the duration side uses the unknown sentinel.
pub fn format_progress(position_ns: u64, duration_ns: u64) -> String {
    let pos = position_ns / NANOS_PER_SEC;
    format!("{}:{:02} / {}", pos / 60, pos % 60, format_clock(duration_ns))
}

/// Human summary of the playlist time left, or an empty string when there
/// is nothing (known) left to play.
pub fn format_remaining(ns: u64) -> String {
    let total_seconds = ns / NANOS_PER_SEC;
    let total_minutes = total_seconds / 60;
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;

    if hours > 0 {
        format!("{hours}h {minutes}m remaining")
    } else if minutes > 0 {
        format!("{minutes}m remaining")
    } else if total_seconds > 0 {
        "<1m remaining".to_string()
    } else {
        String::new()
    }
}

/// Build a row label for `track` according to the provided `fields` and separator.
///
/// Falls back to the title when no parts were produced.
pub fn display_from_fields(track: &Track, fields: &[TrackDisplayField], sep: &str) -> String {
    let mut parts: Vec<String> = Vec::new();

    for f in fields {
        match f {
            TrackDisplayField::Title => parts.push(track.title().to_string()),
            TrackDisplayField::Artist => parts.push(track.artist().to_string()),
            TrackDisplayField::Filename => {
                if let Some(stem) = title_from_uri(track.uri()) {
                    parts.push(stem);
                }
            }
            TrackDisplayField::Uri => parts.push(track.uri().to_string()),
        }
    }

    if parts.is_empty() {
        track.title().to_string()
    } else {
        parts.join(sep)
    }
}
