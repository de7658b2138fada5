use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::debug;

use crate::error::BackendError;
use crate::library::FetchOptions;
use crate::playback::{EventTx, LoadId, MediaBackend};

use super::thread::spawn_audio_thread;
use super::types::{AudioCmd, Snapshot, SnapshotHandle};

/// How long a seek may take before the controlling thread gives up on the
/// reply.
const SEEK_REPLY_TIMEOUT: Duration = Duration::from_secs(2);

pub struct RodioBackend {
    tx: Sender<AudioCmd>,
    snapshot: SnapshotHandle,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl RodioBackend {
    /// Open the default output device and start the audio thread. Events
    /// are delivered on `events`.
    pub fn new(events: EventTx, fetch: FetchOptions) -> Result<Self, BackendError> {
        let (tx, rx) = mpsc::channel::<AudioCmd>();
        let (ready_tx, ready_rx) = mpsc::channel();
        let snapshot: SnapshotHandle = Arc::new(Mutex::new(Snapshot::default()));

        let handle = spawn_audio_thread(rx, events, snapshot.clone(), fetch, ready_tx);
        ready_rx
            .recv()
            .map_err(|_| BackendError::Disconnected)
            .and_then(|opened| opened)?;

        Ok(Self {
            tx,
            snapshot,
            join: Mutex::new(Some(handle)),
        })
    }

    fn send(&self, cmd: AudioCmd) -> Result<(), BackendError> {
        self.tx.send(cmd).map_err(|_| BackendError::Disconnected)
    }

    fn read_snapshot(&self) -> Snapshot {
        self.snapshot.lock().map(|s| *s).unwrap_or_default()
    }

    /// Stop playback and wait for the audio thread to exit.
    pub fn shutdown(&self) {
        let _ = self.send(AudioCmd::Quit);

        if let Ok(mut j) = self.join.lock() {
            if let Some(h) = j.take() {
                let _ = h.join();
                debug!("audio thread joined");
            }
        }
    }
}

impl MediaBackend for RodioBackend {
    fn load(&mut self, uri: &str, load: LoadId) -> Result<(), BackendError> {
        self.send(AudioCmd::Load {
            uri: uri.to_string(),
            load,
        })
    }

    fn play(&mut self) -> Result<(), BackendError> {
        self.send(AudioCmd::Play)
    }

    fn pause(&mut self) -> Result<(), BackendError> {
        self.send(AudioCmd::Pause)
    }

    fn stop(&mut self) -> Result<(), BackendError> {
        self.send(AudioCmd::Stop)
    }

    /// rodio seeks the decoder and clears queued audio either way, so both
    /// modes behave the same here.
    fn seek(&mut self, position_ns: u64, _accurate: bool) -> Result<(), BackendError> {
        let (reply, rx) = mpsc::channel();
        self.send(AudioCmd::Seek {
            position: Duration::from_nanos(position_ns),
            reply,
        })?;
        rx.recv_timeout(SEEK_REPLY_TIMEOUT)
            .map_err(|_| BackendError::Disconnected)?
    }

    fn query_position(&self) -> Option<u64> {
        self.read_snapshot()
            .position
            .and_then(|p| u64::try_from(p.as_nanos()).ok())
    }

    fn query_duration(&self) -> Option<u64> {
        self.read_snapshot()
            .duration
            .and_then(|d| u64::try_from(d.as_nanos()).ok())
    }
}

impl Drop for RodioBackend {
    fn drop(&mut self) {
        self.shutdown();
    }
}
