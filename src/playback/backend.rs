use std::sync::mpsc::{self, Receiver, SyncSender};

use crate::error::BackendError;

/// Coarse pipeline state as the backend reports it.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BackendState {
    /// Nothing loaded.
    Null,
    /// Loaded, not rolling.
    Ready,
    Paused,
    Playing,
}

/// Identifies one `MediaBackend::load` call. Events that end or break a
/// stream carry the id of the load they belong to, so the session can drop
/// ones that arrive after it has moved on to another track.
pub type LoadId = u64;

/// Something the backend noticed on its own thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendEvent {
    StateChanged { old: BackendState, new: BackendState },
    /// The duration became known or changed; query it to read the value.
    DurationChanged,
    /// Playback of `load` cannot continue.
    Error { load: LoadId, message: String },
    EndOfStream { load: LoadId },
}

pub type EventTx = SyncSender<BackendEvent>;
pub type EventRx = Receiver<BackendEvent>;

/// The bounded queue backend events travel on to the controlling thread.
pub fn event_channel(capacity: usize) -> (EventTx, EventRx) {
    mpsc::sync_channel(capacity.max(1))
}

/// What the session needs from an audio backend. Calls come only from the
/// controlling thread; events flow back on an `EventTx`.
pub trait MediaBackend {
    /// Replace whatever is loaded with `uri`. Does not start playback.
    /// Later `Error` and `EndOfStream` events for this stream carry `load`.
    fn load(&mut self, uri: &str, load: LoadId) -> Result<(), BackendError>;
    fn play(&mut self) -> Result<(), BackendError>;
    fn pause(&mut self) -> Result<(), BackendError>;
    /// Unload and go idle.
    fn stop(&mut self) -> Result<(), BackendError>;
    /// `accurate == false` requests a flush + key-unit seek: queued audio is
    /// dropped and playback resumes at the nearest decodable point.
    fn seek(&mut self, position_ns: u64, accurate: bool) -> Result<(), BackendError>;
    fn query_position(&self) -> Option<u64>;
    fn query_duration(&self) -> Option<u64>;
}
