//! Messages and shared state between `RodioBackend` and the audio thread.

use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::BackendError;
use crate::playback::LoadId;

#[derive(Debug)]
pub(super) enum AudioCmd {
    /// Open and decode a URI into a fresh, paused sink.
    Load { uri: String, load: LoadId },
    Play,
    Pause,
    /// Drop the sink and go idle.
    Stop,
    /// Seek the current sink and report the outcome.
    Seek {
        position: Duration,
        reply: Sender<Result<(), BackendError>>,
    },
    Quit,
}

/// What the controlling thread may read without a round-trip.
#[derive(Debug, Default, Clone, Copy)]
pub(super) struct Snapshot {
    pub position: Option<Duration>,
    pub duration: Option<Duration>,
}

pub(super) type SnapshotHandle = Arc<Mutex<Snapshot>>;
