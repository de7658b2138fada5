use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender, TrySendError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rodio::{OutputStream, OutputStreamBuilder, Sink};
use tracing::{debug, warn};

use crate::error::BackendError;
use crate::library::FetchOptions;
use crate::playback::{BackendEvent, BackendState, EventTx, LoadId};

use super::sink::create_sink;
use super::types::{AudioCmd, Snapshot, SnapshotHandle};

/// How often the thread refreshes the snapshot and checks for the end of
/// the stream when no command arrives.
const POLL: Duration = Duration::from_millis(50);

struct Deck {
    stream: OutputStream,
    sink: Option<Sink>,
    state: BackendState,
    uri: Option<String>,
    load: LoadId,
    end_reported: bool,
    fetch: FetchOptions,
    events: EventTx,
    snapshot: SnapshotHandle,
}

impl Deck {
    fn emit(&self, event: BackendEvent) {
        match self.events.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                warn!(?event, "backend event queue full; dropping event");
            }
            // The session is gone; nothing left to tell.
            Err(TrySendError::Disconnected(_)) => {}
        }
    }

    fn set_state(&mut self, new: BackendState) {
        let old = self.state;
        if old != new {
            self.state = new;
            self.emit(BackendEvent::StateChanged { old, new });
        }
    }

    fn publish(&self, snapshot: Snapshot) {
        if let Ok(mut s) = self.snapshot.lock() {
            *s = snapshot;
        }
    }

    fn unload(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        self.uri = None;
        self.end_reported = false;
        self.publish(Snapshot::default());
    }

    fn load(&mut self, uri: String, load: LoadId) {
        self.unload();
        self.set_state(BackendState::Null);
        self.load = load;

        match create_sink(&self.stream, &uri, self.fetch) {
            Ok((sink, duration)) => {
                debug!(%uri, ?duration, "loaded");
                self.sink = Some(sink);
                self.uri = Some(uri);
                self.publish(Snapshot {
                    position: Some(Duration::ZERO),
                    duration,
                });
                self.set_state(BackendState::Ready);
                if duration.is_some() {
                    self.emit(BackendEvent::DurationChanged);
                }
            }
            Err(e) => {
                warn!(%uri, error = %e, "load failed");
                self.emit(BackendEvent::Error {
                    load,
                    message: e.to_string(),
                });
            }
        }
    }

    fn seek(&mut self, position: Duration) -> Result<(), BackendError> {
        let sink = self.sink.as_ref().ok_or(BackendError::NotLoaded)?;
        sink.try_seek(position)
            .map_err(|e| BackendError::Seek(e.to_string()))?;
        // Seeking back from the very end revives a finished stream.
        self.end_reported = false;
        Ok(())
    }

    /// Returns true when the thread should exit.
    fn handle(&mut self, cmd: AudioCmd) -> bool {
        match cmd {
            AudioCmd::Load { uri, load } => self.load(uri, load),
            AudioCmd::Play => {
                if let Some(sink) = &self.sink {
                    sink.play();
                    self.set_state(BackendState::Playing);
                }
            }
            AudioCmd::Pause => {
                if let Some(sink) = &self.sink {
                    sink.pause();
                    self.set_state(BackendState::Paused);
                }
            }
            AudioCmd::Stop => {
                self.unload();
                self.set_state(BackendState::Null);
            }
            AudioCmd::Seek { position, reply } => {
                let _ = reply.send(self.seek(position));
            }
            AudioCmd::Quit => {
                self.unload();
                return true;
            }
        }
        false
    }

    fn refresh(&mut self) {
        let Some(sink) = &self.sink else {
            return;
        };
        let position = sink.get_pos();
        let finished = sink.empty();

        if let Ok(mut s) = self.snapshot.lock() {
            s.position = Some(position);
        }

        if finished && self.state == BackendState::Playing && !self.end_reported {
            self.end_reported = true;
            debug!(uri = ?self.uri, load = self.load, "stream drained");
            self.emit(BackendEvent::EndOfStream { load: self.load });
        }
    }
}

/// Start the audio thread. The result of opening the output device is
/// reported on `ready` before any command is processed.
pub(super) fn spawn_audio_thread(
    rx: Receiver<AudioCmd>,
    events: EventTx,
    snapshot: SnapshotHandle,
    fetch: FetchOptions,
    ready: Sender<Result<(), BackendError>>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut stream = match OutputStreamBuilder::open_default_stream() {
            Ok(stream) => stream,
            Err(e) => {
                let _ = ready.send(Err(BackendError::NoDevice(e.to_string())));
                return;
            }
        };
        // rodio logs to stderr when the stream is dropped; it would interleave
        // with the status output.
        stream.log_on_drop(false);
        let _ = ready.send(Ok(()));

        let mut deck = Deck {
            stream,
            sink: None,
            state: BackendState::Null,
            uri: None,
            load: 0,
            end_reported: false,
            fetch,
            events,
            snapshot,
        };

        loop {
            match rx.recv_timeout(POLL) {
                Ok(cmd) => {
                    if deck.handle(cmd) {
                        break;
                    }
                    while let Ok(cmd) = rx.try_recv() {
                        if deck.handle(cmd) {
                            return;
                        }
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    deck.unload();
                    break;
                }
            }
            deck.refresh();
        }
    })
}
