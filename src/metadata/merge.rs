use crate::library::{Track, title_from_uri};

use super::probe::ProbeReport;
use super::tags::TagReport;

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Merge tag-reader and prober results into a track.
///
/// Title and artist prefer the tag reader, then the prober; the title then
/// falls back to the URI's file name. Duration prefers a positive tag-reader
/// value, then whatever the prober measured. Artwork only ever comes from
/// the tag reader.
pub fn merge(uri: &str, tags: TagReport, probed: ProbeReport) -> Track {
    let title = present(tags.title)
        .or_else(|| present(probed.title))
        .or_else(|| title_from_uri(uri));
    let artist = present(tags.artist).or_else(|| present(probed.artist));
    let duration_ns = tags
        .duration_ns
        .filter(|d| *d > 0)
        .or(probed.duration_ns)
        .unwrap_or(0);

    Track::new(uri, title, artist, duration_ns).with_artwork(tags.artwork)
}
