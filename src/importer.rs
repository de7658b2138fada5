//! Remote catalog import.
//!
//! The catalog scraper itself lives outside this crate; it is consumed
//! through `CatalogImporter`, which lists the streamable tracks of an album.

use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};

use tracing::{debug, info, warn};

use crate::dispatch::Dispatch;
use crate::error::ImportError;
use crate::library::{NANOS_PER_SEC, Track};

/// One importable entry as the catalog reports it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogItem {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub duration_seconds: Option<f64>,
    pub stream_uri: Option<String>,
}

pub type CatalogListing = Box<dyn Iterator<Item = CatalogItem> + Send>;

pub trait CatalogImporter: Send + Sync + 'static {
    /// A lazy, finite listing of the album's tracks.
    fn album_tracks(&self, album_id: &str) -> Result<CatalogListing, ImportError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub album_id: String,
    pub added: usize,
    pub skipped: usize,
}

fn duration_ns(seconds: Option<f64>) -> u64 {
    match seconds {
        Some(s) if s.is_finite() && s >= 0.0 => (s * NANOS_PER_SEC as f64) as u64,
        _ => 0,
    }
}

/// Decode the handful of HTML entities catalog pages put in titles.
fn unescape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let decoded = tail.find(';').and_then(|end| {
            let entity = &tail[1..end];
            let ch = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" | "#39" => Some('\''),
                _ => entity
                    .strip_prefix("#x")
                    .or_else(|| entity.strip_prefix("#X"))
                    .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                    .or_else(|| entity.strip_prefix('#').and_then(|d| d.parse().ok()))
                    .and_then(char::from_u32),
            };
            ch.map(|c| (c, end + 1))
        });

        match decoded {
            Some((c, consumed)) => {
                out.push(c);
                rest = &tail[consumed..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Convert a catalog item into a track; items without a stream are skipped.
pub fn track_from_item(item: CatalogItem) -> Option<Track> {
    let uri = item.stream_uri.filter(|u| !u.trim().is_empty())?;
    Some(Track::new(
        uri,
        item.title.as_deref().map(unescape_html),
        item.artist.as_deref().map(unescape_html),
        duration_ns(item.duration_seconds),
    ))
}

/// Run `importer` for `album_id` on a worker thread, dispatching each track
/// in listing order. A listing failure is dispatched as `ImportFailed`.
pub fn spawn_import(
    importer: Arc<dyn CatalogImporter>,
    album_id: String,
    tx: Sender<Dispatch>,
) -> JoinHandle<Result<ImportSummary, ImportError>> {
    thread::spawn(move || {
        info!(album = %album_id, "importing catalog album");
        let listing = match importer.album_tracks(&album_id) {
            Ok(listing) => listing,
            Err(e) => {
                warn!(album = %album_id, error = %e, "catalog import failed");
                let _ = tx.send(Dispatch::ImportFailed {
                    album: album_id,
                    error: e.clone(),
                });
                return Err(e);
            }
        };

        let mut summary = ImportSummary {
            album_id,
            added: 0,
            skipped: 0,
        };
        for item in listing {
            match track_from_item(item) {
                Some(track) => {
                    if tx.send(Dispatch::Append(track)).is_err() {
                        break;
                    }
                    summary.added += 1;
                }
                None => {
                    debug!(album = %summary.album_id, "catalog item has no stream uri");
                    summary.skipped += 1;
                }
            }
        }

        let _ = tx.send(Dispatch::ImportFinished(summary.clone()));
        Ok(summary)
    })
}
