use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::LibrarySettings;
use crate::dispatch::{Dispatch, DispatchTx};
use crate::metadata::Resolver;

use super::model::DiscoveryRequest;

/// Totals reported when a folder scan finishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanSummary {
    pub root: PathBuf,
    pub found: usize,
    pub added: usize,
}

fn is_audio_file(path: &Path, settings: &LibrarySettings) -> bool {
    let exts: Vec<String> = settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Walk `dir` and return the audio files it contains, in file-name order.
pub fn collect_audio_files(dir: &Path, settings: &LibrarySettings) -> Vec<PathBuf> {
    let mut walker = WalkDir::new(dir)
        .follow_links(settings.follow_links)
        .sort_by_file_name();

    // Non-recursive = only the root directory.
    let depth_cap = if settings.recursive {
        settings.max_depth
    } else {
        Some(1)
    };
    if let Some(d) = depth_cap {
        walker = walker.max_depth(d);
    }

    walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(error = %e, "skipping unreadable entry");
                None
            }
        })
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.is_file()
                && (settings.include_hidden || !is_hidden(path))
                && is_audio_file(path, settings)
        })
        .collect()
}

/// Scan `dir` on a background thread. Each file is resolved synchronously
/// and every track that resolves is dispatched as soon as it is ready, so
/// the playlist fills in scan order. A file that fails to resolve is logged
/// and skipped; the scan carries on.
pub fn spawn_folder_scan(
    dir: PathBuf,
    settings: LibrarySettings,
    resolver: Arc<Resolver>,
    tx: DispatchTx,
) -> JoinHandle<ScanSummary> {
    thread::spawn(move || {
        info!(root = %dir.display(), "scanning folder");
        let files = collect_audio_files(&dir, &settings);
        let mut added = 0;

        for path in &files {
            let request = DiscoveryRequest::from_path(path.clone());
            match resolver.resolve(&request) {
                Ok(track) => {
                    if tx.send(Dispatch::Append(track)).is_err() {
                        debug!("controlling thread gone; stopping scan");
                        break;
                    }
                    added += 1;
                }
                Err(error) => warn!(path = %path.display(), %error, "skipping file"),
            }
        }

        let summary = ScanSummary {
            root: dir,
            found: files.len(),
            added,
        };
        info!(
            root = %summary.root.display(),
            found = summary.found,
            added = summary.added,
            "folder scan finished"
        );
        let _ = tx.send(Dispatch::ScanFinished(summary.clone()));
        summary
    })
}
