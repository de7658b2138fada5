use std::path::Path;

use lofty::prelude::*;
use tracing::{debug, warn};

use super::artwork::{EmbeddedArt, first_artwork};

/// What the tag reader found in a local file. Every field is optional; a
/// read failure yields an empty report rather than an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagReport {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub duration_ns: Option<u64>,
    pub artwork: Option<Vec<u8>>,
}

pub trait TagReader: Send + Sync {
    fn read(&self, path: &Path) -> TagReport;
}

fn trimmed(value: Option<std::borrow::Cow<'_, str>>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Tag reader backed by `lofty`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoftyTagReader;

impl TagReader for LoftyTagReader {
    fn read(&self, path: &Path) -> TagReport {
        let tagged = match lofty::read_from_path(path) {
            Ok(tagged) => tagged,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "tag reader failed");
                return TagReport::default();
            }
        };

        let mut report = TagReport::default();

        let duration = tagged.properties().duration();
        if !duration.is_zero() {
            report.duration_ns = u64::try_from(duration.as_nanos()).ok();
        }

        if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
            report.title = trimmed(tag.title());
            report.artist = trimmed(tag.artist());
        }

        let arts: Vec<EmbeddedArt> = tagged
            .tags()
            .iter()
            .filter_map(EmbeddedArt::from_tag)
            .collect();
        report.artwork = first_artwork(arts);
        if report.artwork.is_none() {
            debug!(path = %path.display(), "no embedded artwork");
        }

        report
    }
}
