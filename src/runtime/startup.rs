use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use crate::config::{LoggingSettings, Settings};
use crate::error::PersistError;
use crate::playlist::{PlaylistSequence, load_playlist};

/// Install the global subscriber. `RUST_LOG` wins over the configured
/// filter. Logs go to stderr so they stay out of the status output.
pub fn init_tracing(settings: &LoggingSettings) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_line_number(true)
        .with_file(true);

    // A second call (tests) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init();
}

/// The playlist restored from the configured file. A missing or unreadable
/// file starts empty.
pub fn initial_playlist(settings: &Settings) -> PlaylistSequence {
    let Some(path) = settings.playlist_path() else {
        return PlaylistSequence::new();
    };
    match load_playlist(&path) {
        Ok(tracks) => {
            info!(path = %path.display(), tracks = tracks.len(), "restored playlist");
            PlaylistSequence::from_tracks(tracks)
        }
        Err(PersistError::Missing { .. }) => PlaylistSequence::new(),
        Err(e) => {
            warn!(error = %e, "could not restore playlist; starting empty");
            PlaylistSequence::new()
        }
    }
}
